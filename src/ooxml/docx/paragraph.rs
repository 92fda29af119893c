/// Paragraphs and paragraph-level formatting.
use std::fmt::Write as FmtWrite;

use crate::common::Rgb;
use crate::common::xml::escape_xml;
use crate::ooxml::charts::Chart;
use crate::ooxml::error::{OoxmlError, Result};

use super::drawing::{InlineChart, InlinePicture, WriteContext, write_inline_chart, write_inline_picture};
use super::form::ContentControl;
use super::run::{Run, RunProperties};

/// Horizontal alignment of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justification {
    #[default]
    Left,
    Center,
    Right,
    /// Justified on both margins
    Both,
}

impl Justification {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            "both" => Ok(Self::Both),
            other => Err(OoxmlError::InvalidFormat(format!("unknown justification '{}'", other))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Both => "both",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabAlignment {
    Left,
    Center,
    Right,
}

impl TabAlignment {
    fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabStop {
    /// Position in twips from the left margin
    pub position: u32,
    pub alignment: TabAlignment,
}

/// List membership of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingRef {
    pub num_id: u32,
    pub level: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ParagraphProperties {
    pub style: Option<String>,
    pub justification: Option<Justification>,
    /// Spacing in twips
    pub spacing_before: Option<u32>,
    pub spacing_after: Option<u32>,
    /// Line spacing in 240ths of a line
    pub spacing_line: Option<u32>,
    pub indent_first_line: Option<i32>,
    pub indent_left: Option<i32>,
    pub numbering: Option<NumberingRef>,
    pub keep_next: bool,
    pub tab_stops: Vec<TabStop>,
}

/// Inline content of a paragraph.
#[derive(Debug, Clone)]
pub enum ParagraphItem {
    Run(Run),
    Control(ContentControl),
    Chart(InlineChart),
    Picture(InlinePicture),
}

/// A paragraph of runs, form fields and inline drawings.
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    pub(crate) items: Vec<ParagraphItem>,
    pub(crate) properties: ParagraphProperties,
    /// Character formatting set on the paragraph as a whole
    pub(crate) run_defaults: RunProperties,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        let mut paragraph = Self::new();
        paragraph.add_text(text);
        paragraph
    }

    /// Append a run. A `'\n'` in `text` becomes a line break.
    pub fn add_text(&mut self, text: &str) -> &mut Run {
        let mut run = Run::with_text(text);
        run.properties = self.run_defaults.clone();
        self.push_run(run)
    }

    /// Append a prepared run; paragraph-wide formatting applies underneath it.
    pub fn add_run(&mut self, mut run: Run) -> &mut Run {
        let mut properties = self.run_defaults.clone();
        properties.apply(&run.properties);
        run.properties = properties;
        self.push_run(run)
    }

    pub fn add_line_break(&mut self) -> &mut Run {
        let mut run = Run::new();
        run.properties = self.run_defaults.clone();
        run.add_break();
        self.push_run(run)
    }

    pub fn add_page_break(&mut self) -> &mut Run {
        let mut run = Run::new();
        run.add_page_break();
        self.push_run(run)
    }

    pub fn add_tab(&mut self) -> &mut Run {
        let mut run = Run::new();
        run.properties = self.run_defaults.clone();
        run.add_tab();
        self.push_run(run)
    }

    fn push_run(&mut self, run: Run) -> &mut Run {
        self.items.push(ParagraphItem::Run(run));
        match self.items.last_mut() {
            Some(ParagraphItem::Run(run)) => run,
            _ => unreachable!("a run was just pushed"),
        }
    }

    /// Place a form field; paragraph-wide formatting applies to its text.
    pub fn add_content_control(&mut self, control: impl Into<ContentControl>) -> &mut ContentControl {
        let mut control = control.into();
        if let ContentControl::Text(ref mut form) = control {
            let mut properties = self.run_defaults.clone();
            properties.apply(&form.properties);
            form.properties = properties;
        }
        self.items.push(ParagraphItem::Control(control));
        match self.items.last_mut() {
            Some(ParagraphItem::Control(control)) => control,
            _ => unreachable!("a control was just pushed"),
        }
    }

    pub fn add_chart(&mut self, chart: Chart, width_emu: i64, height_emu: i64) -> &mut InlineChart {
        self.items
            .push(ParagraphItem::Chart(InlineChart::new(chart, width_emu, height_emu)));
        match self.items.last_mut() {
            Some(ParagraphItem::Chart(chart)) => chart,
            _ => unreachable!("a chart was just pushed"),
        }
    }

    pub fn add_picture(
        &mut self,
        data: Vec<u8>,
        width_emu: Option<i64>,
        height_emu: Option<i64>,
    ) -> Result<&mut InlinePicture> {
        let picture = InlinePicture::from_bytes(data, width_emu, height_emu)?;
        self.items.push(ParagraphItem::Picture(picture));
        match self.items.last_mut() {
            Some(ParagraphItem::Picture(picture)) => Ok(picture),
            _ => unreachable!("a picture was just pushed"),
        }
    }

    pub fn add_tab_stop(&mut self, position: u32, alignment: TabAlignment) -> &mut Self {
        self.properties.tab_stops.push(TabStop { position, alignment });
        self
    }

    pub fn set_justification(&mut self, justification: Justification) -> &mut Self {
        self.properties.justification = Some(justification);
        self
    }

    pub fn set_spacing_before(&mut self, twips: u32) -> &mut Self {
        self.properties.spacing_before = Some(twips);
        self
    }

    pub fn set_spacing_after(&mut self, twips: u32) -> &mut Self {
        self.properties.spacing_after = Some(twips);
        self
    }

    /// Line spacing in 240ths of a line (240 = single).
    pub fn set_spacing_line(&mut self, line: u32) -> &mut Self {
        self.properties.spacing_line = Some(line);
        self
    }

    pub fn set_indent_first_line(&mut self, twips: i32) -> &mut Self {
        self.properties.indent_first_line = Some(twips);
        self
    }

    pub fn set_indent_left(&mut self, twips: i32) -> &mut Self {
        self.properties.indent_left = Some(twips);
        self
    }

    pub fn set_style(&mut self, style_id: &str) -> &mut Self {
        self.properties.style = Some(style_id.to_string());
        self
    }

    pub fn set_numbering(&mut self, num_id: u32, level: u32) -> &mut Self {
        self.properties.numbering = Some(NumberingRef { num_id, level });
        self
    }

    pub fn set_keep_next(&mut self, keep: bool) -> &mut Self {
        self.properties.keep_next = keep;
        self
    }

    /// Apply character formatting to every run and text field, present and future.
    fn apply_to_runs(&mut self, change: RunProperties) {
        self.run_defaults.apply(&change);
        for item in &mut self.items {
            match item {
                ParagraphItem::Run(run) => run.properties.apply(&change),
                ParagraphItem::Control(ContentControl::Text(form)) => form.properties.apply(&change),
                _ => {},
            }
        }
    }

    pub fn set_bold(&mut self, bold: bool) -> &mut Self {
        self.apply_to_runs(RunProperties { bold: Some(bold), ..Default::default() });
        self
    }

    pub fn set_italic(&mut self, italic: bool) -> &mut Self {
        self.apply_to_runs(RunProperties { italic: Some(italic), ..Default::default() });
        self
    }

    /// Font size in half-points for the whole paragraph.
    pub fn set_font_size(&mut self, size: u32) -> &mut Self {
        self.apply_to_runs(RunProperties { font_size: Some(size), ..Default::default() });
        self
    }

    pub fn set_font_family(&mut self, font: &str) -> &mut Self {
        self.apply_to_runs(RunProperties {
            font_family: Some(font.to_string()),
            ..Default::default()
        });
        self
    }

    pub fn set_color(&mut self, color: Rgb) -> &mut Self {
        self.apply_to_runs(RunProperties { color: Some(color), ..Default::default() });
        self
    }

    pub fn properties(&self) -> &ParagraphProperties {
        &self.properties
    }

    pub fn run_defaults(&self) -> &RunProperties {
        &self.run_defaults
    }

    pub fn items(&self) -> &[ParagraphItem] {
        &self.items
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.items.iter().filter_map(|item| match item {
            ParagraphItem::Run(run) => Some(run),
            _ => None,
        })
    }

    pub fn content_controls_mut(&mut self) -> impl Iterator<Item = &mut ContentControl> {
        self.items.iter_mut().filter_map(|item| match item {
            ParagraphItem::Control(control) => Some(control),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Text of runs and text fields.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for item in &self.items {
            match item {
                ParagraphItem::Run(run) => text.push_str(&run.text()),
                ParagraphItem::Control(ContentControl::Text(form)) => text.push_str(form.display_text()),
                _ => {},
            }
        }
        text
    }

    pub(crate) fn to_xml(&self, xml: &mut String, ctx: &mut WriteContext) -> Result<()> {
        xml.push_str("<w:p>");
        self.write_properties(xml)?;

        for item in &self.items {
            match item {
                ParagraphItem::Run(run) => run.to_xml(xml)?,
                ParagraphItem::Control(ContentControl::Text(form)) => form.to_xml(xml, ctx)?,
                ParagraphItem::Control(ContentControl::Picture(form)) => form.to_xml(xml, ctx)?,
                ParagraphItem::Chart(inline) => {
                    let r_id = ctx.add_chart(&inline.chart)?;
                    let id = ctx.next_drawing_id();
                    xml.push_str("<w:r>");
                    write_inline_chart(xml, &r_id, inline.size_emu(), id)?;
                    xml.push_str("</w:r>");
                },
                ParagraphItem::Picture(picture) => {
                    let r_id = ctx.add_image(picture.data(), picture.format())?;
                    let id = ctx.next_drawing_id();
                    xml.push_str("<w:r>");
                    write_inline_picture(xml, &r_id, picture.size_emu(), id, &format!("Picture {}", id))?;
                    xml.push_str("</w:r>");
                },
            }
        }

        xml.push_str("</w:p>");
        Ok(())
    }

    fn write_properties(&self, xml: &mut String) -> Result<()> {
        let props = &self.properties;
        let has_spacing = props.spacing_before.is_some()
            || props.spacing_after.is_some()
            || props.spacing_line.is_some();
        let has_indent = props.indent_first_line.is_some() || props.indent_left.is_some();
        if props.style.is_none()
            && props.justification.is_none()
            && props.numbering.is_none()
            && props.tab_stops.is_empty()
            && !props.keep_next
            && !has_spacing
            && !has_indent
            && !self.run_defaults.has_properties()
        {
            return Ok(());
        }

        xml.push_str("<w:pPr>");
        if let Some(ref style) = props.style {
            write!(xml, r#"<w:pStyle w:val="{}"/>"#, escape_xml(style))?;
        }
        if props.keep_next {
            xml.push_str("<w:keepNext/>");
        }
        if let Some(numbering) = props.numbering {
            write!(
                xml,
                r#"<w:numPr><w:ilvl w:val="{}"/><w:numId w:val="{}"/></w:numPr>"#,
                numbering.level, numbering.num_id
            )?;
        }
        if !props.tab_stops.is_empty() {
            xml.push_str("<w:tabs>");
            for tab in &props.tab_stops {
                write!(
                    xml,
                    r#"<w:tab w:val="{}" w:pos="{}"/>"#,
                    tab.alignment.as_str(),
                    tab.position
                )?;
            }
            xml.push_str("</w:tabs>");
        }
        if has_spacing {
            xml.push_str("<w:spacing");
            if let Some(before) = props.spacing_before {
                write!(xml, r#" w:before="{}""#, before)?;
            }
            if let Some(after) = props.spacing_after {
                write!(xml, r#" w:after="{}""#, after)?;
            }
            if let Some(line) = props.spacing_line {
                write!(xml, r#" w:line="{}" w:lineRule="auto""#, line)?;
            }
            xml.push_str("/>");
        }
        if has_indent {
            xml.push_str("<w:ind");
            if let Some(left) = props.indent_left {
                write!(xml, r#" w:left="{}""#, left)?;
            }
            if let Some(first_line) = props.indent_first_line {
                if first_line >= 0 {
                    write!(xml, r#" w:firstLine="{}""#, first_line)?;
                } else {
                    write!(xml, r#" w:hanging="{}""#, -first_line)?;
                }
            }
            xml.push_str("/>");
        }
        if let Some(justification) = props.justification {
            write!(xml, r#"<w:jc w:val="{}"/>"#, justification.as_str())?;
        }
        self.run_defaults.to_xml(xml)?;
        xml.push_str("</w:pPr>");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::form::TextForm;
    use crate::ooxml::opc::Relationships;

    fn to_xml(paragraph: &Paragraph) -> String {
        let mut ctx = WriteContext::new(Relationships::new("/word".to_string()));
        let mut xml = String::new();
        paragraph.to_xml(&mut xml, &mut ctx).unwrap();
        xml
    }

    #[test]
    fn test_paragraph_wide_size_applies_to_existing_and_future_runs() {
        let mut paragraph = Paragraph::new();
        paragraph.add_text("Serial # ");
        paragraph.set_font_size(25).set_bold(true);
        paragraph.add_text("later");
        for run in paragraph.runs() {
            assert_eq!(run.properties().font_size, Some(25));
            assert_eq!(run.properties().bold, Some(true));
        }
    }

    #[test]
    fn test_paragraph_wide_size_reaches_text_forms() {
        let mut paragraph = Paragraph::new();
        paragraph.add_content_control(TextForm::new("Company Name"));
        paragraph.set_font_size(35);
        let xml = to_xml(&paragraph);
        assert_eq!(xml.matches(r#"<w:sz w:val="35"/>"#).count(), 3);
    }

    #[test]
    fn test_properties_order() {
        let mut paragraph = Paragraph::with_text("Title");
        paragraph
            .set_style("Heading3")
            .set_numbering(2, 0)
            .set_spacing_before(5000)
            .set_spacing_after(500)
            .set_indent_first_line(400)
            .set_justification(Justification::Center);
        let xml = to_xml(&paragraph);
        let style = xml.find("w:pStyle").unwrap();
        let num = xml.find("w:numPr").unwrap();
        let spacing = xml.find("w:spacing").unwrap();
        let indent = xml.find("w:ind ").unwrap();
        let jc = xml.find("w:jc").unwrap();
        assert!(style < num && num < spacing && spacing < indent && indent < jc);
        assert!(xml.contains(r#"<w:spacing w:before="5000" w:after="500"/>"#));
        assert!(xml.contains(r#"<w:ind w:firstLine="400"/>"#));
    }

    #[test]
    fn test_text_joins_runs_and_forms() {
        let mut paragraph = Paragraph::with_text("Date: ");
        let mut form = TextForm::new("Date");
        form.set_placeholder("DD.MM.YYYY");
        paragraph.add_content_control(form);
        assert_eq!(paragraph.text(), "Date: DD.MM.YYYY");
    }

    #[test]
    fn test_chart_gets_part() {
        let mut paragraph = Paragraph::new();
        paragraph.add_chart(Chart::new(crate::ooxml::charts::ChartKind::Pie), 100, 100);
        let xml = to_xml(&paragraph);
        assert!(xml.contains("<c:chart "));
        assert!(xml.contains(r#"<wp:extent cx="100" cy="100"/>"#));
    }

    #[test]
    fn test_justification_names() {
        assert_eq!(Justification::from_name("both").unwrap(), Justification::Both);
        assert!(Justification::from_name("middle").is_err());
    }
}
