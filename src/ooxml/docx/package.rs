/// Serialization of a [`Document`] into a `.docx` package.
use std::fmt::Write as FmtWrite;
use std::path::Path;

use log::debug;

use crate::ooxml::docprops::add_doc_props;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::opc::{OpcPackage, PackURI, Relationships};

use super::document::{BodyElement, Document};
use super::drawing::WriteContext;
use super::numbering::numbering_xml;
use super::styles::styles_xml;

const DOCUMENT_PARTNAME: &str = "/word/document.xml";

const SETTINGS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:defaultTabStop w:val="720"/><w:characterSpacingControl w:val="doNotCompress"/></w:settings>"#;

fn partname(uri: &str) -> Result<PackURI> {
    PackURI::new(uri).map_err(OoxmlError::InvalidFormat)
}

impl Document {
    /// Serialize the body into `word/document.xml`, registering media and
    /// chart parts in `ctx` as they are met.
    pub(crate) fn to_xml(&self, ctx: &mut WriteContext) -> Result<String> {
        let mut xml = String::with_capacity(8192);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#);
        xml.push_str("<w:body>");

        let text_width = self.section.text_width();
        for element in &self.body {
            match element {
                BodyElement::Paragraph(paragraph) => paragraph.to_xml(&mut xml, ctx)?,
                BodyElement::Table(table) => table.to_xml(&mut xml, ctx, text_width)?,
            }
        }
        // a table may not be the last thing before the section properties
        if matches!(self.body.last(), Some(BodyElement::Table(_))) {
            xml.push_str("<w:p/>");
        }

        let s = &self.section;
        write!(
            xml,
            r#"<w:sectPr><w:pgSz w:w="{}" w:h="{}"/><w:pgMar w:top="{}" w:right="{}" w:bottom="{}" w:left="{}" w:header="{}" w:footer="{}" w:gutter="0"/></w:sectPr>"#,
            s.page_width,
            s.page_height,
            s.margin_top,
            s.margin_right,
            s.margin_bottom,
            s.margin_left,
            s.header_distance,
            s.footer_distance
        )
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;

        xml.push_str("</w:body></w:document>");
        Ok(xml)
    }

    /// Build the OPC package for this document.
    pub fn to_package(&self) -> Result<OpcPackage> {
        let document_uri = partname(DOCUMENT_PARTNAME)?;
        let mut ctx = WriteContext::new(Relationships::new(document_uri.base_uri().to_string()));
        ctx.rels.get_or_add(rt::STYLES, "styles.xml");
        ctx.rels.get_or_add(rt::SETTINGS, "settings.xml");
        if !self.numberings.is_empty() {
            ctx.rels.get_or_add(rt::NUMBERING, "numbering.xml");
        }

        let body = self.to_xml(&mut ctx)?;
        let WriteContext { rels, media, charts, .. } = ctx;

        let mut package = OpcPackage::new();
        package
            .rels_mut()
            .get_or_add(rt::OFFICE_DOCUMENT, document_uri.membername());

        let part = package.add_part(document_uri, ct::WML_DOCUMENT_MAIN, body.into_bytes())?;
        *part.rels_mut() = rels;

        let styles = styles_xml(&self.defaults, &self.styles)?;
        package.add_part(partname("/word/styles.xml")?, ct::WML_STYLES, styles.into_bytes())?;
        package.add_part(
            partname("/word/settings.xml")?,
            ct::WML_SETTINGS,
            SETTINGS_XML.as_bytes().to_vec(),
        )?;
        if !self.numberings.is_empty() {
            let numbering = numbering_xml(&self.numberings)?;
            package.add_part(partname("/word/numbering.xml")?, ct::WML_NUMBERING, numbering.into_bytes())?;
        }

        for (uri, blob) in media {
            let content_type = match uri.ext() {
                "png" => ct::PNG,
                "gif" => ct::GIF,
                "bmp" => ct::BMP,
                _ => ct::JPEG,
            };
            package.add_part(uri, content_type, blob)?;
        }
        for (uri, blob) in charts {
            package.add_part(uri, ct::DML_CHART, blob)?;
        }

        add_doc_props(&mut package, None)?;
        debug!(
            "docx package assembled: {} body elements, {} list definitions",
            self.body.len(),
            self.numberings.len()
        );
        Ok(package)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.to_package()?.to_bytes()?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_package()?.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use super::*;
    use crate::ooxml::charts::{Chart, ChartKind};
    use crate::ooxml::docx::{NumberingKind, Paragraph, Table};

    fn read_member(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut text = String::new();
        file.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_minimal_document_package() {
        let doc = Document::new();
        let bytes = doc.to_bytes().unwrap();
        let content_types = read_member(&bytes, "[Content_Types].xml");
        assert!(content_types.contains(ct::WML_DOCUMENT_MAIN));
        let rels = read_member(&bytes, "word/_rels/document.xml.rels");
        assert!(rels.contains("styles.xml"));
        assert!(!rels.contains("numbering.xml"));
        let body = read_member(&bytes, "word/document.xml");
        assert!(body.contains(r#"<w:pgSz w:w="12240" w:h="15840"/>"#));
    }

    #[test]
    fn test_chart_numbering_and_trailing_table() {
        let mut doc = Document::new();
        let num_id = doc.create_numbering(NumberingKind::Numbered);
        doc.paragraph_mut(0).unwrap().add_text("item").set_bold(true);
        doc.paragraph_mut(0).unwrap().set_numbering(num_id, 0);
        let mut paragraph = Paragraph::new();
        let chart = Chart::from_arrays(ChartKind::Line, &["Revenue"], vec![vec![1.0, 2.0]], &["Jan", "Feb"]).unwrap();
        paragraph.add_chart(chart, 6_120_000, 3_240_000);
        doc.push_paragraph(paragraph);
        doc.push_table(Table::new(1, 1));

        let bytes = doc.to_bytes().unwrap();
        let body = read_member(&bytes, "word/document.xml");
        assert!(body.contains("</w:tbl><w:p/><w:sectPr>"));
        assert!(read_member(&bytes, "word/charts/chart1.xml").contains("<c:lineChart>"));
        assert!(read_member(&bytes, "word/numbering.xml").contains(r#"<w:num w:numId="1">"#));
    }

    #[test]
    fn test_output_is_deterministic() {
        let mut doc = Document::new();
        doc.paragraph_mut(0).unwrap().add_text("same");
        assert_eq!(doc.to_bytes().unwrap(), doc.to_bytes().unwrap());
    }
}
