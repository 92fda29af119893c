//! Rendering of word processing documents to PDF.

use std::fs;
use std::path::Path;

use log::info;

use crate::ooxml::docx::Document;

use super::error::Result;
use super::layout::{PageLayout, layout_document};
use super::writer::write_pdf;

/// Renders a [`Document`] to PDF.
///
/// The exporter borrows the document; the same model can be saved as
/// `.docx` and exported to PDF.
pub struct PdfExporter<'a> {
    document: &'a Document,
}

impl<'a> PdfExporter<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Pages and drawing operations without serializing them.
    pub fn layout(&self) -> Result<PageLayout> {
        layout_document(self.document)
    }

    pub fn render(&self) -> Result<Vec<u8>> {
        let layout = self.layout()?;
        write_pdf(&layout)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let layout = self.layout()?;
        let bytes = write_pdf(&layout)?;
        fs::write(path.as_ref(), &bytes)?;
        info!(
            "wrote {} ({} pages, {} bytes)",
            path.as_ref().display(),
            layout.pages.len(),
            bytes.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Rgb;
    use crate::ooxml::docx::{BorderStyle, Justification, Numbering, Paragraph, Table};

    fn invoice_like() -> Document {
        let mut doc = Document::new();
        doc.set_default_font_size(24).set_default_font_family("Times New Roman");
        doc.paragraph_mut(0)
            .unwrap()
            .set_justification(Justification::Center)
            .add_text("INVOICE")
            .set_bold(true)
            .set_font_size(28);
        let bullets = doc.add_numbering(Numbering::bullet());
        doc.push_paragraph(Paragraph::with_text("Bank: First National")).set_numbering(bullets, 0);
        let mut table = Table::new(3, 4);
        table.set_width_percent(100).set_borders(BorderStyle::Single, 4, Rgb::BLACK);
        for (col, header) in ["Description", "Quantity", "Unit Price", "Total"].iter().enumerate() {
            table.cell(0, col).unwrap().first_paragraph().add_text(header);
        }
        doc.push_table(table);
        doc
    }

    #[test]
    fn test_render_produces_pdf() {
        let doc = invoice_like();
        let bytes = PdfExporter::new(&doc).render().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        let reloaded = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(reloaded.get_pages().len(), 1);
    }

    #[test]
    fn test_layout_uses_times_for_times_new_roman() {
        let doc = invoice_like();
        let layout = PdfExporter::new(&doc).layout().unwrap();
        let fonts: Vec<&str> = layout.pages[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                crate::pdf::DrawOp::Text { font, .. } => Some(font.base_font()),
                _ => None,
            })
            .collect();
        assert_eq!(fonts[0], "Times-Bold");
        assert!(fonts.contains(&"Times-Roman"));
    }

    #[test]
    fn test_save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.pdf");
        PdfExporter::new(&invoice_like()).save(&path).unwrap();
        assert!(fs::read(&path).unwrap().starts_with(b"%PDF"));
    }
}
