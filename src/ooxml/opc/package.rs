/// In-memory OPC package.
///
/// Writers assemble a package part by part and hand it to
/// [`PackageWriter`](super::pkgwriter::PackageWriter); editors load an existing
/// package with [`PackageReader`](super::pkgreader::PackageReader), patch a few
/// parts and save it again. Parts keep the order in which they were added.
use std::path::Path;

use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{PACKAGE_URI, PackURI};
use crate::ooxml::opc::part::Part;
use crate::ooxml::opc::pkgreader::PackageReader;
use crate::ooxml::opc::pkgwriter::PackageWriter;
use crate::ooxml::opc::rel::Relationships;

#[derive(Debug, Clone)]
pub struct OpcPackage {
    rels: Relationships,
    parts: Vec<Part>,
}

impl Default for OpcPackage {
    fn default() -> Self {
        Self::new()
    }
}

impl OpcPackage {
    /// Create a new empty OPC package.
    pub fn new() -> Self {
        Self {
            rels: Relationships::new(PACKAGE_URI.to_string()),
            parts: Vec::new(),
        }
    }

    /// Open an OPC package from a file (.docx, .xlsx, .pptx).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OpcError::PackageNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
    }

    /// Load an OPC package from the bytes of its zip container.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        PackageReader::from_bytes(bytes)?.into_package()
    }

    pub(crate) fn from_parts(rels: Relationships, parts: Vec<Part>) -> Self {
        Self { rels, parts }
    }

    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    #[inline]
    pub fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }

    /// Add a new part. Fails if a part with the same name exists.
    pub fn add_part(
        &mut self,
        partname: PackURI,
        content_type: &str,
        blob: Vec<u8>,
    ) -> Result<&mut Part> {
        if self.contains(partname.as_str()) {
            return Err(OpcError::DuplicatePart(partname.to_string()));
        }
        self.parts.push(Part::new(partname, content_type, blob));
        let last = self.parts.len() - 1;
        Ok(&mut self.parts[last])
    }

    pub fn contains(&self, partname: &str) -> bool {
        self.parts.iter().any(|p| p.partname().as_str() == partname)
    }

    pub fn part(&self, partname: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.partname().as_str() == partname)
    }

    pub fn part_mut(&mut self, partname: &str) -> Option<&mut Part> {
        self.parts
            .iter_mut()
            .find(|p| p.partname().as_str() == partname)
    }

    /// Like [`OpcPackage::part`] but reports a missing part as an error.
    pub fn require_part(&self, partname: &str) -> Result<&Part> {
        self.part(partname)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    pub fn require_part_mut(&mut self, partname: &str) -> Result<&mut Part> {
        self.part_mut(partname)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    #[inline]
    pub fn iter_parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter()
    }

    /// Part name of the main document (`officeDocument` relationship target).
    pub fn main_partname(&self) -> Result<PackURI> {
        self.rels
            .part_with_reltype(relationship_type::OFFICE_DOCUMENT)?
            .target_partname()
    }

    /// First free part name of the form `{prefix}{n}.{ext}`, counting from 1.
    pub fn next_partname(&self, prefix: &str, ext: &str) -> Result<PackURI> {
        let mut n = 1u32;
        loop {
            let candidate = format!("{}{}.{}", prefix, n, ext);
            if !self.contains(&candidate) {
                return PackURI::new(candidate).map_err(OpcError::InvalidPackUri);
            }
            n += 1;
        }
    }

    /// Serialize the package into zip bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        PackageWriter::to_bytes(self)
    }

    /// Serialize the package and write it to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        PackageWriter::write(path, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type as ct;

    fn sample() -> OpcPackage {
        let mut pkg = OpcPackage::new();
        pkg.rels_mut()
            .get_or_add(relationship_type::OFFICE_DOCUMENT, "word/document.xml");
        let doc = pkg
            .add_part(
                PackURI::new("/word/document.xml").unwrap(),
                ct::WML_DOCUMENT_MAIN,
                b"<w:document/>".to_vec(),
            )
            .unwrap();
        doc.rels_mut()
            .get_or_add(relationship_type::STYLES, "styles.xml");
        pkg.add_part(
            PackURI::new("/word/styles.xml").unwrap(),
            ct::WML_STYLES,
            b"<w:styles/>".to_vec(),
        )
        .unwrap();
        pkg
    }

    #[test]
    fn test_duplicate_part_rejected() {
        let mut pkg = sample();
        let err = pkg.add_part(
            PackURI::new("/word/styles.xml").unwrap(),
            ct::WML_STYLES,
            Vec::new(),
        );
        assert!(matches!(err, Err(OpcError::DuplicatePart(_))));
    }

    #[test]
    fn test_round_trip_through_zip() {
        let pkg = sample();
        let bytes = pkg.to_bytes().unwrap();
        let reopened = OpcPackage::from_bytes(bytes).unwrap();

        assert_eq!(reopened.main_partname().unwrap().as_str(), "/word/document.xml");
        let doc = reopened.require_part("/word/document.xml").unwrap();
        assert_eq!(doc.content_type(), ct::WML_DOCUMENT_MAIN);
        assert_eq!(doc.xml().unwrap(), "<w:document/>");
        let styles = doc
            .related_partname(doc.rels().iter().next().unwrap().r_id())
            .unwrap();
        assert_eq!(styles.as_str(), "/word/styles.xml");
        assert!(reopened.contains("/word/styles.xml"));
    }

    #[test]
    fn test_next_partname() {
        let mut pkg = sample();
        pkg.add_part(
            PackURI::new("/xl/comments1.xml").unwrap(),
            ct::SML_COMMENTS,
            Vec::new(),
        )
        .unwrap();
        assert_eq!(
            pkg.next_partname("/xl/comments", "xml").unwrap().as_str(),
            "/xl/comments2.xml"
        );
    }

    #[test]
    fn test_output_is_deterministic() {
        assert_eq!(sample().to_bytes().unwrap(), sample().to_bytes().unwrap());
    }
}
