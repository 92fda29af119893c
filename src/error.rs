//! Unified error type of the report runner.
//!
//! Every layer keeps its own error enum; this one wraps them so a report can
//! use `?` across input loading, the document engine and file output.
use thiserror::Error;

use crate::config::ConfigError;
use crate::input::InputError;
use crate::ooxml::OoxmlError;
use crate::ooxml::opc::error::OpcError;
use crate::pdf::PdfError;
use crate::session::SessionError;

/// Main error type for docforge operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Report input could not be read or decoded
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Configuration file could not be read or decoded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Document object model error
    #[error(transparent)]
    Ooxml(#[from] OoxmlError),

    /// Package level error
    #[error(transparent)]
    Opc(#[from] OpcError),

    /// PDF export error
    #[error(transparent)]
    Pdf(#[from] PdfError),

    /// Session misuse or output failure
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No report is registered under this name
    #[error("Unknown report: {0}")]
    UnknownReport(String),
}

/// Result type for docforge operations.
pub type Result<T> = std::result::Result<T, Error>;
