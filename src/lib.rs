//! docforge - JSON-driven generation of office documents
//!
//! Each report reads a JSON payload (or an existing document) from a resources
//! directory and writes one Word, Excel, PowerPoint or PDF file through a
//! call-based builder API.
//!
//! # Features
//!
//! - **Word documents**: paragraphs, styles, numbered lists, tables, charts and form controls
//! - **Spreadsheets**: cell ranges, formulas with cached values, styles, notes and charts
//! - **Presentations**: text shapes, picture backgrounds, charts and color schemes
//! - **PDF**: Word documents exported with the standard fonts
//! - **Deterministic output**: the same input always produces the same bytes
//!
//! # Example - Building a report
//!
//! ```no_run
//! use docforge::config::RunConfig;
//! use docforge::reports::{ReportKind, run};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RunConfig::new()
//!     .with_resources_dir("resources")
//!     .with_output_dir("out");
//! let path = run(ReportKind::Invoice, &config)?;
//! println!("Written: {}", path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Using the builders directly
//!
//! ```no_run
//! use docforge::builders::{TextStyle, add_text};
//! use docforge::ooxml::docx::{Document, Paragraph};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = Document::new();
//! add_text(doc.push_paragraph(Paragraph::new()), "Hello", &TextStyle::sized(28).bold());
//! std::fs::write("hello.docx", doc.to_bytes()?)?;
//! # Ok(())
//! # }
//! ```

pub mod builders;
pub mod common;
pub mod config;
pub mod error;
pub mod input;
pub mod numfmt;
pub mod ooxml;
pub mod pdf;
pub mod reports;
pub mod session;

pub use error::{Error, Result};
pub use reports::{ReportKind, run, run_all};
pub use session::{DocumentKind, DocumentSession};
