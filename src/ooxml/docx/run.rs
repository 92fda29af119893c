/// Runs: contiguous text sharing one set of character properties.
use std::fmt::Write as FmtWrite;

use crate::common::Rgb;
use crate::common::xml::escape_xml;
use crate::ooxml::error::Result;

/// Character formatting shared by runs, paragraph marks and form fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunProperties {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    /// Font size in half-points (24 = 12pt)
    pub font_size: Option<u32>,
    pub font_family: Option<String>,
    pub color: Option<Rgb>,
    /// Highlight color name such as `yellow`
    pub highlight: Option<String>,
    /// Single-line border drawn around the text
    pub border: Option<Rgb>,
}

impl RunProperties {
    pub fn has_properties(&self) -> bool {
        self.bold.is_some()
            || self.italic.is_some()
            || self.underline.is_some()
            || self.font_size.is_some()
            || self.font_family.is_some()
            || self.color.is_some()
            || self.highlight.is_some()
            || self.border.is_some()
    }

    /// Overwrite every property that is set in `other`.
    pub fn apply(&mut self, other: &RunProperties) {
        if other.bold.is_some() {
            self.bold = other.bold;
        }
        if other.italic.is_some() {
            self.italic = other.italic;
        }
        if other.underline.is_some() {
            self.underline = other.underline;
        }
        if other.font_size.is_some() {
            self.font_size = other.font_size;
        }
        if other.font_family.is_some() {
            self.font_family.clone_from(&other.font_family);
        }
        if other.color.is_some() {
            self.color = other.color;
        }
        if other.highlight.is_some() {
            self.highlight.clone_from(&other.highlight);
        }
        if other.border.is_some() {
            self.border = other.border;
        }
    }

    /// Write `<w:rPr>` if any property is set.
    pub(crate) fn to_xml(&self, xml: &mut String) -> Result<()> {
        if !self.has_properties() {
            return Ok(());
        }
        xml.push_str("<w:rPr>");

        if let Some(ref font) = self.font_family {
            let font = escape_xml(font);
            write!(
                xml,
                r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:eastAsia="{0}" w:cs="{0}"/>"#,
                font
            )?;
        }
        if let Some(bold) = self.bold {
            xml.push_str(if bold { "<w:b/><w:bCs/>" } else { r#"<w:b w:val="0"/><w:bCs w:val="0"/>"# });
        }
        if let Some(italic) = self.italic {
            xml.push_str(if italic { "<w:i/><w:iCs/>" } else { r#"<w:i w:val="0"/><w:iCs w:val="0"/>"# });
        }
        if let Some(color) = self.color {
            write!(xml, r#"<w:color w:val="{}"/>"#, color.to_hex())?;
        }
        if let Some(size) = self.font_size {
            write!(xml, r#"<w:sz w:val="{0}"/><w:szCs w:val="{0}"/>"#, size)?;
        }
        if let Some(ref highlight) = self.highlight {
            write!(xml, r#"<w:highlight w:val="{}"/>"#, escape_xml(highlight))?;
        }
        if let Some(underline) = self.underline {
            write!(
                xml,
                r#"<w:u w:val="{}"/>"#,
                if underline { "single" } else { "none" }
            )?;
        }
        if let Some(border) = self.border {
            write!(
                xml,
                r#"<w:bdr w:val="single" w:sz="4" w:space="0" w:color="{}"/>"#,
                border.to_hex()
            )?;
        }

        xml.push_str("</w:rPr>");
        Ok(())
    }
}

/// Piece of run content.
#[derive(Debug, Clone, PartialEq)]
pub enum RunContent {
    Text(String),
    /// Line break (`<w:br/>`)
    Break,
    PageBreak,
    Tab,
}

/// A run of text with character formatting.
#[derive(Debug, Clone, Default)]
pub struct Run {
    pub(crate) content: Vec<RunContent>,
    pub(crate) properties: RunProperties,
}

impl Run {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run holding `text`; every `'\n'` becomes a line break.
    pub fn with_text(text: &str) -> Self {
        let mut run = Self::new();
        run.set_text(text);
        run
    }

    pub fn set_text(&mut self, text: &str) {
        self.content.clear();
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.content.push(RunContent::Break);
            }
            if !line.is_empty() {
                self.content.push(RunContent::Text(line.to_string()));
            }
        }
    }

    /// Plain text of the run, with breaks as `'\n'` and tabs as `'\t'`.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for item in &self.content {
            match item {
                RunContent::Text(s) => text.push_str(s),
                RunContent::Break => text.push('\n'),
                RunContent::Tab => text.push('\t'),
                RunContent::PageBreak => {},
            }
        }
        text
    }

    pub fn content(&self) -> &[RunContent] {
        &self.content
    }

    pub fn properties(&self) -> &RunProperties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut RunProperties {
        &mut self.properties
    }

    pub fn add_break(&mut self) -> &mut Self {
        self.content.push(RunContent::Break);
        self
    }

    pub fn add_page_break(&mut self) -> &mut Self {
        self.content.push(RunContent::PageBreak);
        self
    }

    pub fn add_tab(&mut self) -> &mut Self {
        self.content.push(RunContent::Tab);
        self
    }

    pub fn set_bold(&mut self, bold: bool) -> &mut Self {
        self.properties.bold = Some(bold);
        self
    }

    pub fn set_italic(&mut self, italic: bool) -> &mut Self {
        self.properties.italic = Some(italic);
        self
    }

    pub fn set_underline(&mut self, underline: bool) -> &mut Self {
        self.properties.underline = Some(underline);
        self
    }

    /// Set font size in half-points (e.g., 24 = 12pt).
    pub fn set_font_size(&mut self, size: u32) -> &mut Self {
        self.properties.font_size = Some(size);
        self
    }

    pub fn set_font_family(&mut self, font: &str) -> &mut Self {
        self.properties.font_family = Some(font.to_string());
        self
    }

    pub fn set_color(&mut self, color: Rgb) -> &mut Self {
        self.properties.color = Some(color);
        self
    }

    pub fn set_highlight(&mut self, color: &str) -> &mut Self {
        self.properties.highlight = Some(color.to_string());
        self
    }

    pub(crate) fn to_xml(&self, xml: &mut String) -> Result<()> {
        xml.push_str("<w:r>");
        self.properties.to_xml(xml)?;
        write_content(xml, &self.content)?;
        xml.push_str("</w:r>");
        Ok(())
    }
}

pub(crate) fn write_content(xml: &mut String, content: &[RunContent]) -> Result<()> {
    for item in content {
        match item {
            RunContent::Text(text) => {
                write!(xml, r#"<w:t xml:space="preserve">{}</w:t>"#, escape_xml(text))?;
            },
            RunContent::Break => xml.push_str("<w:br/>"),
            RunContent::PageBreak => xml.push_str(r#"<w:br w:type="page"/>"#),
            RunContent::Tab => xml.push_str("<w:tab/>"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newlines_become_breaks() {
        let run = Run::with_text("Position: CTO\nDepartment: IT");
        assert_eq!(
            run.content(),
            &[
                RunContent::Text("Position: CTO".into()),
                RunContent::Break,
                RunContent::Text("Department: IT".into()),
            ]
        );
        assert_eq!(run.text(), "Position: CTO\nDepartment: IT");
    }

    #[test]
    fn test_run_xml() {
        let mut run = Run::with_text("A & B");
        run.set_bold(true).set_font_size(44).set_color(Rgb::new(255, 0, 0));
        let mut xml = String::new();
        run.to_xml(&mut xml).unwrap();
        assert!(xml.contains("<w:b/>"));
        assert!(xml.contains(r#"<w:sz w:val="44"/>"#));
        assert!(xml.contains(r#"<w:color w:val="FF0000"/>"#));
        assert!(xml.contains("A &amp; B"));
    }

    #[test]
    fn test_apply_overrides_only_set_fields() {
        let mut base = RunProperties {
            bold: Some(true),
            font_size: Some(20),
            ..Default::default()
        };
        base.apply(&RunProperties {
            font_size: Some(30),
            ..Default::default()
        });
        assert_eq!(base.bold, Some(true));
        assert_eq!(base.font_size, Some(30));
    }

    #[test]
    fn test_empty_properties_write_nothing() {
        let mut xml = String::new();
        RunProperties::default().to_xml(&mut xml).unwrap();
        assert!(xml.is_empty());
    }
}
