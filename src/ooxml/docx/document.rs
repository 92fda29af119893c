/// The document body, page setup, defaults, styles and list definitions.
use crate::ooxml::error::{OoxmlError, Result};

use super::numbering::{Numbering, NumberingKind};
use super::paragraph::{Justification, Paragraph};
use super::styles::{DocDefaults, Style, builtin_styles};
use super::table::Table;

/// Letter paper, in twips.
pub const LETTER_WIDTH: u32 = 12_240;
pub const LETTER_HEIGHT: u32 = 15_840;

/// A block-level element of the body.
#[derive(Debug, Clone)]
pub enum BodyElement {
    Paragraph(Paragraph),
    Table(Table),
}

impl BodyElement {
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Self::Paragraph(p) => Some(p),
            Self::Table(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(t) => Some(t),
            Self::Paragraph(_) => None,
        }
    }
}

/// Page size and margins, in twips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub page_width: u32,
    pub page_height: u32,
    pub margin_left: u32,
    pub margin_top: u32,
    pub margin_right: u32,
    pub margin_bottom: u32,
    pub header_distance: u32,
    pub footer_distance: u32,
}

impl Default for Section {
    fn default() -> Self {
        Self {
            page_width: LETTER_WIDTH,
            page_height: LETTER_HEIGHT,
            margin_left: 1440,
            margin_top: 1440,
            margin_right: 1440,
            margin_bottom: 1440,
            header_distance: 720,
            footer_distance: 720,
        }
    }
}

impl Section {
    /// Width available to body text.
    pub fn text_width(&self) -> u32 {
        self.page_width
            .saturating_sub(self.margin_left + self.margin_right)
    }
}

/// A word processing document under construction.
///
/// A new document holds one empty paragraph, so element 0 always exists
/// until it is removed.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) body: Vec<BodyElement>,
    pub(crate) section: Section,
    pub(crate) defaults: DocDefaults,
    pub(crate) styles: Vec<Style>,
    pub(crate) numberings: Vec<Numbering>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            body: vec![BodyElement::Paragraph(Paragraph::new())],
            section: Section::default(),
            defaults: DocDefaults::default(),
            styles: builtin_styles(),
            numberings: Vec::new(),
        }
    }

    /// A detached paragraph, to be filled and then pushed.
    pub fn create_paragraph() -> Paragraph {
        Paragraph::new()
    }

    /// Append a paragraph and return it for further edits.
    pub fn push_paragraph(&mut self, paragraph: Paragraph) -> &mut Paragraph {
        self.body.push(BodyElement::Paragraph(paragraph));
        match self.body.last_mut() {
            Some(BodyElement::Paragraph(p)) => p,
            _ => unreachable!("a paragraph was just pushed"),
        }
    }

    pub fn push_table(&mut self, table: Table) -> &mut Table {
        self.body.push(BodyElement::Table(table));
        match self.body.last_mut() {
            Some(BodyElement::Table(t)) => t,
            _ => unreachable!("a table was just pushed"),
        }
    }

    pub fn elements(&self) -> &[BodyElement] {
        &self.body
    }

    pub fn elements_count(&self) -> usize {
        self.body.len()
    }

    pub fn element(&self, index: usize) -> Result<&BodyElement> {
        let len = self.body.len();
        self.body
            .get(index)
            .ok_or(OoxmlError::IndexOutOfRange { what: "element", index, len })
    }

    pub fn element_mut(&mut self, index: usize) -> Result<&mut BodyElement> {
        let len = self.body.len();
        self.body
            .get_mut(index)
            .ok_or(OoxmlError::IndexOutOfRange { what: "element", index, len })
    }

    /// The element at `index`, which must be a paragraph.
    pub fn paragraph_mut(&mut self, index: usize) -> Result<&mut Paragraph> {
        match self.element_mut(index)? {
            BodyElement::Paragraph(p) => Ok(p),
            BodyElement::Table(_) => Err(OoxmlError::InvalidFormat(format!(
                "element {} is a table, not a paragraph",
                index
            ))),
        }
    }

    /// The element at `index`, which must be a table.
    pub fn table_mut(&mut self, index: usize) -> Result<&mut Table> {
        match self.element_mut(index)? {
            BodyElement::Table(t) => Ok(t),
            BodyElement::Paragraph(_) => Err(OoxmlError::InvalidFormat(format!(
                "element {} is a paragraph, not a table",
                index
            ))),
        }
    }

    /// Remove the element at `index`; later elements shift down by one.
    pub fn remove_element(&mut self, index: usize) -> Result<BodyElement> {
        let len = self.body.len();
        if index >= len {
            return Err(OoxmlError::IndexOutOfRange { what: "element", index, len });
        }
        Ok(self.body.remove(index))
    }

    pub fn section(&self) -> &Section {
        &self.section
    }

    pub fn section_mut(&mut self) -> &mut Section {
        &mut self.section
    }

    /// Page margins in twips.
    pub fn set_page_margins(&mut self, left: u32, top: u32, right: u32, bottom: u32) -> &mut Self {
        self.section.margin_left = left;
        self.section.margin_top = top;
        self.section.margin_right = right;
        self.section.margin_bottom = bottom;
        self
    }

    pub fn set_page_size(&mut self, width: u32, height: u32) -> &mut Self {
        self.section.page_width = width;
        self.section.page_height = height;
        self
    }

    pub fn defaults(&self) -> &DocDefaults {
        &self.defaults
    }

    /// Default font size in half-points.
    pub fn set_default_font_size(&mut self, size: u32) -> &mut Self {
        self.defaults.run.font_size = Some(size);
        self
    }

    pub fn set_default_font_family(&mut self, font: &str) -> &mut Self {
        self.defaults.run.font_family = Some(font.to_string());
        self
    }

    /// Default spacing after paragraphs, in twips.
    pub fn set_default_spacing_after(&mut self, twips: u32) -> &mut Self {
        self.defaults.spacing_after = Some(twips);
        self
    }

    pub fn set_default_spacing_line(&mut self, line: u32) -> &mut Self {
        self.defaults.spacing_line = Some(line);
        self
    }

    pub fn set_default_justification(&mut self, justification: Justification) -> &mut Self {
        self.defaults.justification = Some(justification);
        self
    }

    pub fn styles(&self) -> &[Style] {
        &self.styles
    }

    /// Look a style up by id or by UI name such as `"Heading 3"`.
    pub fn style(&self, name: &str) -> Result<&Style> {
        self.styles
            .iter()
            .find(|style| style.matches(name))
            .ok_or_else(|| OoxmlError::InvalidFormat(format!("unknown style '{}'", name)))
    }

    /// Add a list definition and return the id paragraphs use to join it.
    pub fn add_numbering(&mut self, mut numbering: Numbering) -> u32 {
        let num_id = self.numberings.len() as u32 + 1;
        numbering.num_id = num_id;
        self.numberings.push(numbering);
        num_id
    }

    pub fn create_numbering(&mut self, kind: NumberingKind) -> u32 {
        self.add_numbering(Numbering::new(kind))
    }

    pub fn numberings(&self) -> &[Numbering] {
        &self.numberings
    }

    pub fn numbering(&self, num_id: u32) -> Result<&Numbering> {
        let len = self.numberings.len();
        self.numberings
            .iter()
            .find(|n| n.num_id == num_id)
            .ok_or(OoxmlError::IndexOutOfRange { what: "numbering", index: num_id as usize, len })
    }

    pub fn numbering_mut(&mut self, num_id: u32) -> Result<&mut Numbering> {
        let len = self.numberings.len();
        self.numberings
            .iter_mut()
            .find(|n| n.num_id == num_id)
            .ok_or(OoxmlError::IndexOutOfRange { what: "numbering", index: num_id as usize, len })
    }

    /// Texts of the top-level paragraphs, in order.
    pub fn paragraph_texts(&self) -> Vec<String> {
        self.body
            .iter()
            .filter_map(BodyElement::as_paragraph)
            .map(Paragraph::text)
            .collect()
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.iter().filter_map(BodyElement::as_table)
    }
}
