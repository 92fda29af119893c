//! Package writer for OPC packages.
//!
//! Serializes an [`OpcPackage`] into a zip container: `[Content_Types].xml`
//! first, then the package relationships, then every part followed by its
//! own relationships part.

use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::path::Path;

use log::debug;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::common::xml::escape_xml;
use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::package::OpcPackage;
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};

pub struct PackageWriter;

impl PackageWriter {
    /// Write the package to a file.
    pub fn write<P: AsRef<Path>>(path: P, package: &OpcPackage) -> Result<()> {
        let bytes = Self::to_bytes(package)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Serialize the package into the bytes of a zip container.
    pub fn to_bytes(package: &OpcPackage) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        Self::write_content_types(&mut zip, package)?;
        Self::write_pkg_rels(&mut zip, package)?;
        Self::write_parts(&mut zip, package)?;

        Ok(zip.finish()?.into_inner())
    }

    fn options() -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default())
    }

    fn write_member(
        zip: &mut ZipWriter<Cursor<Vec<u8>>>,
        uri: &PackURI,
        blob: &[u8],
    ) -> Result<()> {
        debug!("writing package member {} ({} bytes)", uri, blob.len());
        zip.start_file(uri.membername(), Self::options())?;
        zip.write_all(blob)?;
        Ok(())
    }

    fn write_content_types(
        zip: &mut ZipWriter<Cursor<Vec<u8>>>,
        package: &OpcPackage,
    ) -> Result<()> {
        let cti = ContentTypesItem::from_package(package);
        let uri = PackURI::new(CONTENT_TYPES_URI).map_err(OpcError::InvalidPackUri)?;
        Self::write_member(zip, &uri, cti.to_xml().as_bytes())
    }

    fn write_pkg_rels(zip: &mut ZipWriter<Cursor<Vec<u8>>>, package: &OpcPackage) -> Result<()> {
        let package_uri = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        let rels_uri = package_uri.rels_uri().map_err(OpcError::InvalidPackUri)?;
        Self::write_member(zip, &rels_uri, package.rels().to_xml().as_bytes())
    }

    fn write_parts(zip: &mut ZipWriter<Cursor<Vec<u8>>>, package: &OpcPackage) -> Result<()> {
        for part in package.iter_parts() {
            Self::write_member(zip, part.partname(), part.blob())?;

            if !part.rels().is_empty() {
                let rels_uri = part
                    .partname()
                    .rels_uri()
                    .map_err(OpcError::InvalidPackUri)?;
                Self::write_member(zip, &rels_uri, part.rels().to_xml().as_bytes())?;
            }
        }
        Ok(())
    }
}

/// The `[Content_Types].xml` item: Default entries by extension and Override
/// entries by part name.
struct ContentTypesItem {
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
}

impl ContentTypesItem {
    fn new() -> Self {
        let mut defaults = BTreeMap::new();
        defaults.insert("rels".to_string(), ct::OPC_RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), ct::XML.to_string());

        Self {
            defaults,
            overrides: BTreeMap::new(),
        }
    }

    fn from_package(package: &OpcPackage) -> Self {
        let mut cti = Self::new();
        for part in package.iter_parts() {
            cti.add_content_type(part.partname(), part.content_type());
        }
        cti
    }

    fn add_content_type(&mut self, partname: &PackURI, content_type: &str) {
        let ext = partname.ext().to_ascii_lowercase();
        if Self::is_default_content_type(&ext, content_type) {
            self.defaults.insert(ext, content_type.to_string());
        } else {
            self.overrides
                .insert(partname.to_string(), content_type.to_string());
        }
    }

    fn is_default_content_type(ext: &str, content_type: &str) -> bool {
        matches!(
            (ext, content_type),
            ("rels", ct::OPC_RELATIONSHIPS)
                | ("xml", ct::XML)
                | ("png", ct::PNG)
                | ("jpg", ct::JPEG)
                | ("jpeg", ct::JPEG)
                | ("gif", ct::GIF)
                | ("bmp", ct::BMP)
                | ("vml", ct::OFC_VML_DRAWING)
        )
    }

    fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(512 + self.overrides.len() * 160);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );

        for (ext, content_type) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(content_type)
            ));
        }

        for (partname, content_type) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(partname),
                escape_xml(content_type)
            ));
        }

        xml.push_str("</Types>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types_xml() {
        let mut cti = ContentTypesItem::new();
        cti.add_content_type(&PackURI::new("/word/media/image1.png").unwrap(), ct::PNG);
        cti.add_content_type(
            &PackURI::new("/word/document.xml").unwrap(),
            ct::WML_DOCUMENT_MAIN,
        );
        cti.add_content_type(
            &PackURI::new("/xl/drawings/vmlDrawing1.vml").unwrap(),
            ct::OFC_VML_DRAWING,
        );

        let xml = cti.to_xml();

        assert!(xml.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
        assert!(xml.contains(r#"<Default Extension="vml""#));
        assert!(xml.contains(r#"<Override PartName="/word/document.xml""#));
        assert!(!xml.contains(r#"PartName="/word/media/image1.png""#));
    }
}
