//! Shared building blocks used by every document format.
//!
//! - [`xml`]: escaping helpers for hand-written XML
//! - [`unit`]: conversions between EMU, twips, points and millimetres
//! - [`color`]: RGB colors as they appear in OOXML attributes
//! - [`picture`]: picture format detection and pixel dimensions

pub mod color;
pub mod picture;
pub mod unit;
pub mod xml;

pub use color::Rgb;
pub use picture::ImageFormat;
