//! Office Open XML document engine.
//!
//! Each format module exposes a call-based object model that mirrors the way
//! documents are assembled (create a paragraph, add text, create a table,
//! set a cell value, add a chart) and serializes it into an OPC package.
//!
//! - [`docx`]: word processing documents, content controls and form filling
//! - [`xlsx`]: workbooks, cell styles, comments and sheet charts
//! - [`pptx`]: presentations with text shapes, pictures and charts
//! - [`charts`]: the DrawingML chart model shared by all three

pub mod charts;
pub(crate) mod docprops;
pub mod docx;
pub mod error;
pub mod opc;
pub mod pptx;
pub(crate) mod xmltext;
pub mod xlsx;

pub use error::{OoxmlError, Result};
