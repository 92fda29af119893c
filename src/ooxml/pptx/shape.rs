/// Text shapes placed on slides.
use std::fmt::Write as FmtWrite;

use crate::common::Rgb;
use crate::common::unit::half_points_to_centipoints;
use crate::common::xml::escape_xml;
use crate::ooxml::docx::Justification;
use crate::ooxml::error::{OoxmlError, Result};

/// Position and size of an object on a slide, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Frame {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self { x, y, width, height }
    }

    pub(crate) fn write_xfrm(&self, xml: &mut String, tag: &str) -> Result<()> {
        write!(
            xml,
            r#"<{tag}><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></{tag}>"#,
            self.x,
            self.y,
            self.width,
            self.height,
            tag = tag
        )?;
        Ok(())
    }
}

/// Vertical placement of the text body inside its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    Top,
    #[default]
    Center,
    Bottom,
}

impl TextAnchor {
    fn as_str(self) -> &'static str {
        match self {
            TextAnchor::Top => "t",
            TextAnchor::Center => "ctr",
            TextAnchor::Bottom => "b",
        }
    }
}

/// A run of text with uniform formatting. A `'\n'` in the text becomes a
/// line break inside the paragraph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRun {
    text: String,
    /// Half-points, as everywhere in the builder API.
    size: Option<u32>,
    bold: bool,
    italic: bool,
    font: Option<String>,
    color: Option<Rgb>,
}

impl TextRun {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn add_text(&mut self, text: &str) -> &mut Self {
        self.text.push_str(text);
        self
    }

    pub fn set_font_size(&mut self, half_points: u32) -> &mut Self {
        self.size = Some(half_points);
        self
    }

    pub fn set_bold(&mut self, bold: bool) -> &mut Self {
        self.bold = bold;
        self
    }

    pub fn set_italic(&mut self, italic: bool) -> &mut Self {
        self.italic = italic;
        self
    }

    pub fn set_font_family(&mut self, font: &str) -> &mut Self {
        self.font = Some(font.to_string());
        self
    }

    pub fn set_color(&mut self, color: Rgb) -> &mut Self {
        self.color = Some(color);
        self
    }

    fn write_properties(&self, xml: &mut String, tag: &str) -> Result<()> {
        write!(xml, r#"<{} lang="en-US""#, tag)?;
        if let Some(size) = self.size {
            write!(xml, r#" sz="{}""#, half_points_to_centipoints(size))?;
        }
        if self.bold {
            xml.push_str(r#" b="1""#);
        }
        if self.italic {
            xml.push_str(r#" i="1""#);
        }
        xml.push_str(r#" dirty="0">"#);
        if let Some(color) = self.color {
            write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color.to_hex())?;
        }
        if let Some(ref font) = self.font {
            let font = escape_xml(font);
            write!(xml, r#"<a:latin typeface="{}"/><a:cs typeface="{}"/>"#, font, font)?;
        }
        write!(xml, "</{}>", tag)?;
        Ok(())
    }

    fn to_xml(&self, xml: &mut String) -> Result<()> {
        for (i, segment) in self.text.split('\n').enumerate() {
            if i > 0 {
                xml.push_str("<a:br>");
                self.write_properties(xml, "a:rPr")?;
                xml.push_str("</a:br>");
            }
            if segment.is_empty() {
                continue;
            }
            xml.push_str("<a:r>");
            self.write_properties(xml, "a:rPr")?;
            write!(xml, "<a:t>{}</a:t></a:r>", escape_xml(segment))?;
        }
        Ok(())
    }
}

/// One paragraph of a shape's text body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeParagraph {
    runs: Vec<TextRun>,
    justification: Option<Justification>,
    /// Twips.
    spacing_before: Option<u32>,
    spacing_after: Option<u32>,
    /// Percent of single spacing.
    line_spacing: Option<u32>,
}

impl ShapeParagraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(TextRun::text).collect()
    }

    /// Append a run holding `text` and return it for formatting.
    pub fn add_text(&mut self, text: &str) -> &mut TextRun {
        self.runs.push(TextRun {
            text: text.to_string(),
            ..TextRun::default()
        });
        let last = self.runs.len() - 1;
        &mut self.runs[last]
    }

    pub fn add_run(&mut self, run: TextRun) -> &mut TextRun {
        self.runs.push(run);
        let last = self.runs.len() - 1;
        &mut self.runs[last]
    }

    pub fn add_line_break(&mut self) -> &mut Self {
        match self.runs.last_mut() {
            Some(run) => {
                run.text.push('\n');
            },
            None => {
                self.add_text("\n");
            },
        }
        self
    }

    pub fn set_justification(&mut self, justification: Justification) -> &mut Self {
        self.justification = Some(justification);
        self
    }

    pub fn set_spacing_before(&mut self, twips: u32) -> &mut Self {
        self.spacing_before = Some(twips);
        self
    }

    pub fn set_spacing_after(&mut self, twips: u32) -> &mut Self {
        self.spacing_after = Some(twips);
        self
    }

    pub fn set_line_spacing(&mut self, percent: u32) -> &mut Self {
        self.line_spacing = Some(percent);
        self
    }

    fn to_xml(&self, xml: &mut String) -> Result<()> {
        xml.push_str("<a:p>");
        let has_properties = self.justification.is_some()
            || self.spacing_before.is_some()
            || self.spacing_after.is_some()
            || self.line_spacing.is_some();
        if has_properties {
            xml.push_str("<a:pPr");
            if let Some(justification) = self.justification {
                let algn = match justification {
                    Justification::Left => "l",
                    Justification::Center => "ctr",
                    Justification::Right => "r",
                    Justification::Both => "just",
                };
                write!(xml, r#" algn="{}""#, algn)?;
            }
            xml.push('>');
            if let Some(percent) = self.line_spacing {
                write!(xml, r#"<a:lnSpc><a:spcPct val="{}"/></a:lnSpc>"#, percent * 1000)?;
            }
            // spcPts is in hundredths of a point
            if let Some(twips) = self.spacing_before {
                write!(xml, r#"<a:spcBef><a:spcPts val="{}"/></a:spcBef>"#, twips * 5)?;
            }
            if let Some(twips) = self.spacing_after {
                write!(xml, r#"<a:spcAft><a:spcPts val="{}"/></a:spcAft>"#, twips * 5)?;
            }
            xml.push_str("</a:pPr>");
        }
        for run in &self.runs {
            run.to_xml(xml)?;
        }
        match self.runs.last() {
            Some(run) => run.write_properties(xml, "a:endParaRPr")?,
            None => xml.push_str(r#"<a:endParaRPr lang="en-US" dirty="0"/>"#),
        }
        xml.push_str("</a:p>");
        Ok(())
    }
}

/// A rectangle with a text body. New shapes have no fill, no outline and a
/// single empty paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub(crate) frame: Frame,
    fill: Option<Rgb>,
    outline: Option<Rgb>,
    anchor: TextAnchor,
    paragraphs: Vec<ShapeParagraph>,
}

impl Shape {
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            fill: None,
            outline: None,
            anchor: TextAnchor::default(),
            paragraphs: vec![ShapeParagraph::new()],
        }
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn set_position(&mut self, x: i64, y: i64) -> &mut Self {
        self.frame.x = x;
        self.frame.y = y;
        self
    }

    pub fn set_size(&mut self, width: i64, height: i64) -> &mut Self {
        self.frame.width = width;
        self.frame.height = height;
        self
    }

    pub fn set_fill(&mut self, color: Option<Rgb>) -> &mut Self {
        self.fill = color;
        self
    }

    pub fn set_outline(&mut self, color: Option<Rgb>) -> &mut Self {
        self.outline = color;
        self
    }

    pub fn set_text_anchor(&mut self, anchor: TextAnchor) -> &mut Self {
        self.anchor = anchor;
        self
    }

    pub fn paragraphs(&self) -> &[ShapeParagraph] {
        &self.paragraphs
    }

    pub fn paragraph_mut(&mut self, index: usize) -> Result<&mut ShapeParagraph> {
        let len = self.paragraphs.len();
        self.paragraphs.get_mut(index).ok_or(OoxmlError::IndexOutOfRange {
            what: "shape paragraph",
            index,
            len,
        })
    }

    /// Remove every paragraph, leaving the text body empty.
    pub fn clear(&mut self) -> &mut Self {
        self.paragraphs.clear();
        self
    }

    pub fn add_paragraph(&mut self) -> &mut ShapeParagraph {
        self.push_paragraph(ShapeParagraph::new())
    }

    pub fn push_paragraph(&mut self, paragraph: ShapeParagraph) -> &mut ShapeParagraph {
        self.paragraphs.push(paragraph);
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }

    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(ShapeParagraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub(crate) fn to_xml(&self, xml: &mut String, shape_id: u32) -> Result<()> {
        xml.push_str("<p:sp><p:nvSpPr>");
        write!(xml, r#"<p:cNvPr id="{}" name="Rectangle {}"/>"#, shape_id, shape_id - 1)?;
        xml.push_str("<p:cNvSpPr/><p:nvPr/></p:nvSpPr>");

        xml.push_str("<p:spPr>");
        self.frame.write_xfrm(xml, "a:xfrm")?;
        xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
        match self.fill {
            Some(color) => write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color.to_hex())?,
            None => xml.push_str("<a:noFill/>"),
        }
        match self.outline {
            Some(color) => write!(
                xml,
                r#"<a:ln w="12700"><a:solidFill><a:srgbClr val="{}"/></a:solidFill></a:ln>"#,
                color.to_hex()
            )?,
            None => xml.push_str("<a:ln><a:noFill/></a:ln>"),
        }
        xml.push_str("</p:spPr>");

        write!(
            xml,
            r#"<p:txBody><a:bodyPr wrap="square" rtlCol="0" anchor="{}"><a:normAutofit/></a:bodyPr><a:lstStyle/>"#,
            self.anchor.as_str()
        )?;
        if self.paragraphs.is_empty() {
            // a text body needs at least one paragraph
            xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
        }
        for paragraph in &self.paragraphs {
            paragraph.to_xml(xml)?;
        }
        xml.push_str("</p:txBody></p:sp>");
        Ok(())
    }
}
