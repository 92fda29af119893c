/// Style sheet (`word/styles.xml`): document defaults plus the built-in
/// paragraph and table styles the builders refer to.
use std::fmt::Write as FmtWrite;

use crate::common::Rgb;
use crate::common::xml::escape_xml;
use crate::ooxml::error::Result;

use super::paragraph::Justification;
use super::run::RunProperties;

/// Font size used when neither the run nor the defaults set one: 11pt.
pub const FALLBACK_FONT_SIZE: u32 = 22;

/// Font used when neither the run nor the defaults set one.
pub const FALLBACK_FONT_FAMILY: &str = "Arial";

/// Document-wide defaults, written to `w:docDefaults`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocDefaults {
    pub run: RunProperties,
    pub spacing_after: Option<u32>,
    pub spacing_line: Option<u32>,
    pub justification: Option<Justification>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKind {
    Paragraph,
    Table,
}

impl StyleKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Table => "table",
        }
    }
}

/// A named style.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub style_id: String,
    pub name: String,
    pub kind: StyleKind,
    pub based_on: Option<String>,
    pub run: RunProperties,
    pub spacing_before: Option<u32>,
    pub spacing_after: Option<u32>,
    pub keep_next: bool,
    pub outline_level: Option<u32>,
}

impl Style {
    fn paragraph(style_id: &str, name: &str) -> Self {
        Self {
            style_id: style_id.to_string(),
            name: name.to_string(),
            kind: StyleKind::Paragraph,
            based_on: None,
            run: RunProperties::default(),
            spacing_before: None,
            spacing_after: None,
            keep_next: false,
            outline_level: None,
        }
    }

    fn heading(level: u32, size: u32) -> Self {
        let mut style = Self::paragraph(&format!("Heading{}", level), &format!("heading {}", level));
        style.based_on = Some("Normal".to_string());
        style.run.bold = Some(true);
        style.run.font_size = Some(size);
        style.run.color = Some(Rgb::new(0x26, 0x26, 0x26));
        style.spacing_before = Some(240);
        style.spacing_after = Some(80);
        style.keep_next = true;
        style.outline_level = Some(level - 1);
        style
    }

    /// Whether `name` designates this style, by id or by UI name
    /// (`"Heading 3"`, `"heading 3"` and `"Heading3"` all match).
    pub fn matches(&self, name: &str) -> bool {
        self.style_id == name || self.name.eq_ignore_ascii_case(name)
    }

    fn to_xml(&self, xml: &mut String) -> Result<()> {
        write!(
            xml,
            r#"<w:style w:type="{}""#,
            self.kind.as_str()
        )?;
        if self.style_id == "Normal" || self.style_id == "TableNormal" {
            xml.push_str(r#" w:default="1""#);
        }
        write!(
            xml,
            r#" w:styleId="{}"><w:name w:val="{}"/>"#,
            escape_xml(&self.style_id),
            escape_xml(&self.name)
        )?;
        if let Some(ref based_on) = self.based_on {
            write!(xml, r#"<w:basedOn w:val="{}"/>"#, escape_xml(based_on))?;
        }
        xml.push_str("<w:qFormat/>");

        if self.kind == StyleKind::Paragraph
            && (self.keep_next || self.spacing_before.is_some() || self.spacing_after.is_some() || self.outline_level.is_some())
        {
            xml.push_str("<w:pPr>");
            if self.keep_next {
                xml.push_str("<w:keepNext/>");
            }
            if self.spacing_before.is_some() || self.spacing_after.is_some() {
                xml.push_str("<w:spacing");
                if let Some(before) = self.spacing_before {
                    write!(xml, r#" w:before="{}""#, before)?;
                }
                if let Some(after) = self.spacing_after {
                    write!(xml, r#" w:after="{}""#, after)?;
                }
                xml.push_str("/>");
            }
            if let Some(level) = self.outline_level {
                write!(xml, r#"<w:outlineLvl w:val="{}"/>"#, level)?;
            }
            xml.push_str("</w:pPr>");
        }
        self.run.to_xml(xml)?;

        if self.kind == StyleKind::Table {
            xml.push_str(r#"<w:tblPr><w:tblInd w:w="0" w:type="dxa"/>"#);
            if self.style_id == "TableGrid" {
                xml.push_str("<w:tblBorders>");
                for side in ["top", "left", "bottom", "right", "insideH", "insideV"] {
                    write!(xml, r#"<w:{} w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#, side)?;
                }
                xml.push_str("</w:tblBorders>");
            }
            xml.push_str(r#"<w:tblCellMar><w:left w:w="108" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar></w:tblPr>"#);
        }

        xml.push_str("</w:style>");
        Ok(())
    }
}

/// Built-in styles available in every new document.
pub fn builtin_styles() -> Vec<Style> {
    let mut table_normal = Style::paragraph("TableNormal", "Normal Table");
    table_normal.kind = StyleKind::Table;
    let mut table_grid = Style::paragraph("TableGrid", "Table Grid");
    table_grid.kind = StyleKind::Table;
    table_grid.based_on = Some("TableNormal".to_string());
    let mut list_paragraph = Style::paragraph("ListParagraph", "List Paragraph");
    list_paragraph.based_on = Some("Normal".to_string());

    vec![
        Style::paragraph("Normal", "Normal"),
        Style::heading(1, 40),
        Style::heading(2, 32),
        Style::heading(3, 28),
        list_paragraph,
        table_normal,
        table_grid,
    ]
}

pub(crate) fn styles_xml(defaults: &DocDefaults, styles: &[Style]) -> Result<String> {
    let mut xml = String::with_capacity(4096);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#);

    xml.push_str("<w:docDefaults><w:rPrDefault>");
    let mut run = RunProperties {
        font_family: Some(FALLBACK_FONT_FAMILY.to_string()),
        font_size: Some(FALLBACK_FONT_SIZE),
        ..Default::default()
    };
    run.apply(&defaults.run);
    run.to_xml(&mut xml)?;
    xml.push_str("</w:rPrDefault><w:pPrDefault><w:pPr>");
    write!(
        xml,
        r#"<w:spacing w:after="{}" w:line="{}" w:lineRule="auto"/>"#,
        defaults.spacing_after.unwrap_or(0),
        defaults.spacing_line.unwrap_or(240)
    )?;
    if let Some(justification) = defaults.justification {
        write!(xml, r#"<w:jc w:val="{}"/>"#, justification.as_str())?;
    }
    xml.push_str("</w:pPr></w:pPrDefault></w:docDefaults>");

    for style in styles {
        style.to_xml(&mut xml)?;
    }

    xml.push_str("</w:styles>");
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_lookup_by_name_or_id() {
        let styles = builtin_styles();
        let heading = styles.iter().find(|s| s.matches("Heading 3")).unwrap();
        assert_eq!(heading.style_id, "Heading3");
        assert!(styles.iter().any(|s| s.matches("Heading3")));
        assert!(!styles.iter().any(|s| s.matches("Heading 9")));
    }

    #[test]
    fn test_defaults_written() {
        let defaults = DocDefaults {
            run: RunProperties {
                font_size: Some(24),
                font_family: Some("Times New Roman".to_string()),
                ..Default::default()
            },
            spacing_after: Some(100),
            spacing_line: None,
            justification: Some(Justification::Both),
        };
        let xml = styles_xml(&defaults, &builtin_styles()).unwrap();
        assert!(xml.contains(r#"w:ascii="Times New Roman""#));
        assert!(xml.contains(r#"<w:sz w:val="24"/>"#));
        assert!(xml.contains(r#"<w:spacing w:after="100" w:line="240" w:lineRule="auto"/><w:jc w:val="both"/>"#));
        assert!(xml.contains(r#"w:styleId="TableGrid""#));
    }
}
