//! Failures while reading or writing an OPC package (the zip container of
//! every OOXML document).
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpcError {
    #[error("no package at {}", .0.display())]
    PackageNotFound(PathBuf),

    /// Part names must be absolute, e.g. `/word/document.xml`
    #[error("invalid part name: {0}")]
    InvalidPackUri(String),

    #[error("part not found: {0}")]
    PartNotFound(String),

    #[error("part written twice: {0}")]
    DuplicatePart(String),

    #[error("relationship not found: {0}")]
    RelationshipNotFound(String),

    #[error("invalid relationship: {0}")]
    InvalidRelationship(String),

    /// Malformed `[Content_Types].xml` or `.rels` content
    #[error("malformed package XML: {0}")]
    XmlError(String),

    #[error("zip container: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("XML reader: {0}")]
    QuickXmlError(#[from] quick_xml::Error),

    #[error("part is not UTF-8: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),
}

impl From<quick_xml::events::attributes::AttrError> for OpcError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        OpcError::XmlError(format!("bad attribute: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, OpcError>;
