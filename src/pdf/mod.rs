//! PDF export of word processing documents.
//!
//! [`PdfExporter`] lays a [`Document`](crate::ooxml::docx::Document) out on
//! pages and writes it with `lopdf`, using the standard Type1 fonts so no
//! font files are embedded.
//!
//! # Examples
//!
//! ```rust,no_run
//! use docforge::ooxml::docx::Document;
//! use docforge::pdf::PdfExporter;
//!
//! let mut doc = Document::new();
//! doc.paragraph_mut(0)?.add_text("INVOICE").set_bold(true);
//! PdfExporter::new(&doc).save("result.pdf")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod exporter;
pub mod font;
pub mod layout;
mod writer;

pub use error::{PdfError, Result};
pub use exporter::PdfExporter;
pub use font::{FontFamily, StandardFont};
pub use layout::{DrawOp, Page, PageLayout, RasterImage, Stroke};
