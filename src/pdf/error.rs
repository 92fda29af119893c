/// Error types for PDF export.
use thiserror::Error;

use crate::ooxml::OoxmlError;

/// Result type for PDF export.
pub type Result<T> = std::result::Result<T, PdfError>;

#[derive(Error, Debug)]
pub enum PdfError {
    /// Error from the PDF object model
    #[error("PDF error: {0}")]
    Lopdf(#[from] lopdf::Error),

    /// Document lookups (styles, list definitions) that failed
    #[error("Document error: {0}")]
    Ooxml(#[from] OoxmlError),

    /// Embedded picture that could not be decoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Content that cannot be placed on a page
    #[error("Layout error: {0}")]
    Layout(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
