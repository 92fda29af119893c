/// Open Packaging Conventions (OPC) implementation.
///
/// Every OOXML document is a zip container of parts linked by relationships:
///
/// - [`PackURI`]: part names and relative references
/// - [`Relationships`]: ordered relationship collections with rId allocation
/// - [`OpcPackage`]: the in-memory package with its parts
/// - [`PackageWriter`] / [`PackageReader`]: zip serialization in both directions

pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod part;
pub mod pkgreader;
pub mod pkgwriter;
pub mod rel;

pub use error::{OpcError, Result};
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::Part;
pub use pkgreader::PackageReader;
pub use pkgwriter::PackageWriter;
pub use rel::{Relationship, Relationships};
