//! Cell formatting and the deduplicated `styles.xml` table.
//!
//! Cells carry a [`CellStyle`] by value. When the workbook is written every
//! distinct style becomes one `xf` record; fonts, fills and borders are
//! shared between records the same way.

use std::collections::HashMap;
use std::fmt::Write as FmtWrite;

use crate::common::Rgb;
use crate::common::xml::escape_xml;
use crate::ooxml::error::{OoxmlError, Result};

/// Border line styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineStyle {
    #[default]
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
    Hair,
}

impl LineStyle {
    /// Parse the builder-API line style names (`"Thin"`, `"Medium"`, ...).
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(match name.to_ascii_lowercase().as_str() {
            "thin" => Self::Thin,
            "medium" => Self::Medium,
            "thick" => Self::Thick,
            "dashed" => Self::Dashed,
            "dotted" => Self::Dotted,
            "double" => Self::Double,
            "hair" => Self::Hair,
            other => {
                return Err(OoxmlError::InvalidFormat(format!("unknown line style '{}'", other)));
            },
        })
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Thin => "thin",
            Self::Medium => "medium",
            Self::Thick => "thick",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
            Self::Double => "double",
            Self::Hair => "hair",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BorderLine {
    pub style: LineStyle,
    pub color: Rgb,
}

/// The four borders of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellBorders {
    pub left: Option<BorderLine>,
    pub right: Option<BorderLine>,
    pub top: Option<BorderLine>,
    pub bottom: Option<BorderLine>,
}

impl CellBorders {
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none() && self.top.is_none() && self.bottom.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
    Justify,
}

impl HorizontalAlign {
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(match name {
            "left" => Self::Left,
            "center" => Self::Center,
            "right" => Self::Right,
            "justify" => Self::Justify,
            other => {
                return Err(OoxmlError::InvalidFormat(format!(
                    "unknown horizontal alignment '{}'",
                    other
                )));
            },
        })
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "justify",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
}

impl VerticalAlign {
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(match name {
            "top" => Self::Top,
            "center" => Self::Center,
            "bottom" => Self::Bottom,
            other => {
                return Err(OoxmlError::InvalidFormat(format!(
                    "unknown vertical alignment '{}'",
                    other
                )));
            },
        })
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CellFont {
    pub bold: bool,
    pub italic: bool,
    pub color: Option<Rgb>,
    /// Size in points
    pub size: Option<u32>,
    pub name: Option<String>,
}

/// Formatting of one cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CellStyle {
    pub font: CellFont,
    pub fill: Option<Rgb>,
    pub borders: CellBorders,
    pub horizontal: Option<HorizontalAlign>,
    pub vertical: Option<VerticalAlign>,
    pub wrap_text: bool,
    pub number_format: Option<String>,
}

impl CellStyle {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

const DEFAULT_FONT_NAME: &str = "Calibri";
const DEFAULT_FONT_SIZE: u32 = 11;
/// Custom number formats start at this id; lower ids are built in.
const FIRST_CUSTOM_NUM_FMT: usize = 164;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct XfRecord {
    font: usize,
    fill: usize,
    border: usize,
    num_fmt: usize,
}

/// Collects the distinct fonts, fills, borders and formats of a workbook.
#[derive(Debug)]
pub(crate) struct StylesBuilder {
    fonts: Vec<CellFont>,
    fills: Vec<Option<Rgb>>,
    borders: Vec<CellBorders>,
    number_formats: Vec<String>,
    styles: Vec<CellStyle>,
    records: Vec<XfRecord>,
    style_map: HashMap<CellStyle, usize>,
}

impl Default for StylesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StylesBuilder {
    pub(crate) fn new() -> Self {
        Self {
            fonts: vec![CellFont::default()],
            // the first two fills are reserved: none and gray125
            fills: vec![None, None],
            borders: vec![CellBorders::default()],
            number_formats: Vec::new(),
            styles: vec![CellStyle::default()],
            records: vec![XfRecord {
                font: 0,
                fill: 0,
                border: 0,
                num_fmt: 0,
            }],
            style_map: HashMap::from([(CellStyle::default(), 0)]),
        }
    }

    /// Style index (`s` attribute) of `style`, registering it if new.
    pub(crate) fn add(&mut self, style: &CellStyle) -> usize {
        if let Some(&index) = self.style_map.get(style) {
            return index;
        }

        let font = position_or_push(&mut self.fonts, &style.font, 0);
        let fill = match style.fill {
            Some(_) => position_or_push(&mut self.fills, &style.fill, 2),
            None => 0,
        };
        let border = position_or_push(&mut self.borders, &style.borders, 0);
        let num_fmt = match style.number_format {
            Some(ref code) => {
                FIRST_CUSTOM_NUM_FMT + position_or_push(&mut self.number_formats, code, 0)
            },
            None => 0,
        };

        let index = self.records.len();
        self.records.push(XfRecord {
            font,
            fill,
            border,
            num_fmt,
        });
        self.styles.push(style.clone());
        self.style_map.insert(style.clone(), index);
        index
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(4096);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#);

        if !self.number_formats.is_empty() {
            write!(xml, r#"<numFmts count="{}">"#, self.number_formats.len())?;
            for (i, code) in self.number_formats.iter().enumerate() {
                write!(
                    xml,
                    r#"<numFmt numFmtId="{}" formatCode="{}"/>"#,
                    FIRST_CUSTOM_NUM_FMT + i,
                    escape_xml(code)
                )?;
            }
            xml.push_str("</numFmts>");
        }

        write!(xml, r#"<fonts count="{}">"#, self.fonts.len())?;
        for font in &self.fonts {
            write_font(&mut xml, font)?;
        }
        xml.push_str("</fonts>");

        write!(xml, r#"<fills count="{}">"#, self.fills.len())?;
        for (i, fill) in self.fills.iter().enumerate() {
            match (i, fill) {
                (1, _) => xml.push_str(r#"<fill><patternFill patternType="gray125"/></fill>"#),
                (_, Some(color)) => write!(
                    xml,
                    r#"<fill><patternFill patternType="solid"><fgColor rgb="{}"/><bgColor indexed="64"/></patternFill></fill>"#,
                    color.to_argb()
                )?,
                (_, None) => xml.push_str(r#"<fill><patternFill patternType="none"/></fill>"#),
            }
        }
        xml.push_str("</fills>");

        write!(xml, r#"<borders count="{}">"#, self.borders.len())?;
        for border in &self.borders {
            xml.push_str("<border>");
            write_border_side(&mut xml, "left", border.left.as_ref())?;
            write_border_side(&mut xml, "right", border.right.as_ref())?;
            write_border_side(&mut xml, "top", border.top.as_ref())?;
            write_border_side(&mut xml, "bottom", border.bottom.as_ref())?;
            xml.push_str("<diagonal/></border>");
        }
        xml.push_str("</borders>");

        xml.push_str(r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#);

        write!(xml, r#"<cellXfs count="{}">"#, self.records.len())?;
        for (record, style) in self.records.iter().zip(&self.styles) {
            write!(
                xml,
                r#"<xf numFmtId="{}" fontId="{}" fillId="{}" borderId="{}" xfId="0""#,
                record.num_fmt, record.font, record.fill, record.border
            )?;
            if record.font != 0 {
                xml.push_str(r#" applyFont="1""#);
            }
            if record.fill != 0 {
                xml.push_str(r#" applyFill="1""#);
            }
            if record.border != 0 {
                xml.push_str(r#" applyBorder="1""#);
            }
            if record.num_fmt != 0 {
                xml.push_str(r#" applyNumberFormat="1""#);
            }
            let has_alignment =
                style.horizontal.is_some() || style.vertical.is_some() || style.wrap_text;
            if has_alignment {
                xml.push_str(r#" applyAlignment="1"><alignment"#);
                if let Some(h) = style.horizontal {
                    write!(xml, r#" horizontal="{}""#, h.as_str())?;
                }
                if let Some(v) = style.vertical {
                    write!(xml, r#" vertical="{}""#, v.as_str())?;
                }
                if style.wrap_text {
                    xml.push_str(r#" wrapText="1""#);
                }
                xml.push_str("/></xf>");
            } else {
                xml.push_str("/>");
            }
        }
        xml.push_str("</cellXfs>");

        xml.push_str(r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#);
        xml.push_str("</styleSheet>");
        Ok(xml)
    }
}

fn position_or_push<T: PartialEq + Clone>(items: &mut Vec<T>, item: &T, skip: usize) -> usize {
    match items.iter().skip(skip).position(|x| x == item) {
        Some(i) => i + skip,
        None => {
            items.push(item.clone());
            items.len() - 1
        },
    }
}

fn write_font(xml: &mut String, font: &CellFont) -> Result<()> {
    xml.push_str("<font>");
    if font.bold {
        xml.push_str("<b/>");
    }
    if font.italic {
        xml.push_str("<i/>");
    }
    write!(xml, r#"<sz val="{}"/>"#, font.size.unwrap_or(DEFAULT_FONT_SIZE))?;
    match font.color {
        Some(color) => write!(xml, r#"<color rgb="{}"/>"#, color.to_argb())?,
        None => xml.push_str(r#"<color theme="1"/>"#),
    }
    let name = font.name.as_deref().unwrap_or(DEFAULT_FONT_NAME);
    write!(xml, r#"<name val="{}"/><family val="2"/>"#, escape_xml(name))?;
    if font.name.is_none() {
        xml.push_str(r#"<scheme val="minor"/>"#);
    }
    xml.push_str("</font>");
    Ok(())
}

fn write_border_side(xml: &mut String, side: &str, line: Option<&BorderLine>) -> Result<()> {
    match line {
        Some(line) => write!(
            xml,
            r#"<{side} style="{}"><color rgb="{}"/></{side}>"#,
            line.style.as_str(),
            line.color.to_argb()
        )?,
        None => write!(xml, "<{}/>", side)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let builder = StylesBuilder::new();
        assert_eq!(builder.len(), 1);
        let xml = builder.to_xml().unwrap();
        assert!(xml.contains(r#"<fills count="2">"#));
        assert!(xml.contains(r#"patternType="gray125""#));
    }

    #[test]
    fn test_styles_are_deduplicated() {
        let mut builder = StylesBuilder::new();
        let mut bold = CellStyle::default();
        bold.font.bold = true;
        let mut green = CellStyle::default();
        green.fill = Some(Rgb::new(0, 194, 87));

        assert_eq!(builder.add(&CellStyle::default()), 0);
        assert_eq!(builder.add(&bold), 1);
        assert_eq!(builder.add(&green), 2);
        assert_eq!(builder.add(&bold.clone()), 1);

        let mut bold_green = bold.clone();
        bold_green.fill = green.fill;
        assert_eq!(builder.add(&bold_green), 3);

        let xml = builder.to_xml().unwrap();
        // one bold font besides the default, one solid fill besides the reserved two
        assert!(xml.contains(r#"<fonts count="2">"#));
        assert!(xml.contains(r#"<fills count="3">"#));
        assert!(xml.contains(r#"<fgColor rgb="FF00C257"/>"#));
        assert!(xml.contains(r#"<xf numFmtId="0" fontId="1" fillId="2" borderId="0" xfId="0" applyFont="1" applyFill="1"/>"#));
    }

    #[test]
    fn test_alignment_and_borders() {
        let mut builder = StylesBuilder::new();
        let line = BorderLine {
            style: LineStyle::from_name("Thin").unwrap(),
            color: Rgb::BLACK,
        };
        let style = CellStyle {
            borders: CellBorders {
                top: Some(line),
                ..Default::default()
            },
            horizontal: Some(HorizontalAlign::Center),
            vertical: Some(VerticalAlign::Center),
            number_format: Some("0.0".to_string()),
            ..Default::default()
        };
        builder.add(&style);
        let xml = builder.to_xml().unwrap();
        assert!(xml.contains(r#"<top style="thin"><color rgb="FF000000"/></top>"#));
        assert!(xml.contains(r#"<alignment horizontal="center" vertical="center"/>"#));
        assert!(xml.contains(r#"<numFmt numFmtId="164" formatCode="0.0"/>"#));
    }
}
