/// Styled runs and "Title: details" requisite lines.
use crate::common::Rgb;
use crate::ooxml::docx::{Justification, Paragraph};

/// Character formatting of a builder run. Unset fields inherit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextStyle {
    /// Half-points
    pub size: Option<u32>,
    pub bold: bool,
    pub italic: bool,
    pub font: Option<String>,
    pub color: Option<Rgb>,
    /// Applied to the whole paragraph
    pub justification: Option<Justification>,
}

impl TextStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sized(size: u32) -> Self {
        Self {
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_justification(mut self, justification: Justification) -> Self {
        self.justification = Some(justification);
        self
    }
}

/// Append `text` to `paragraph` in `style`. Each `'\n'` becomes a line break.
pub fn add_text<'p>(paragraph: &'p mut Paragraph, text: &str, style: &TextStyle) -> &'p mut Paragraph {
    if !text.is_empty() {
        let run = paragraph.add_text(text);
        if let Some(size) = style.size {
            run.set_font_size(size);
        }
        if style.bold {
            run.set_bold(true);
        }
        if style.italic {
            run.set_italic(true);
        }
        if let Some(font) = &style.font {
            run.set_font_family(font);
        }
        if let Some(color) = style.color {
            run.set_color(color);
        }
    }
    if let Some(justification) = style.justification {
        paragraph.set_justification(justification);
    }
    paragraph
}

/// Layout of a requisite line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequisiteStyle {
    /// Bold title when set, italic title otherwise
    pub title_bold: bool,
    /// Twips after the paragraph
    pub spacing_after: Option<u32>,
    /// List the line joins: numbering id and level
    pub numbering: Option<(u32, u32)>,
}

impl Default for RequisiteStyle {
    fn default() -> Self {
        Self {
            title_bold: true,
            spacing_after: Some(20),
            numbering: None,
        }
    }
}

impl RequisiteStyle {
    pub fn listed(num_id: u32, level: u32) -> Self {
        Self {
            numbering: Some((num_id, level)),
            ..Default::default()
        }
    }

    pub fn italic_title(mut self) -> Self {
        self.title_bold = false;
        self
    }

    pub fn without_spacing(mut self) -> Self {
        self.spacing_after = None;
        self
    }
}

/// Write `"{title}: "` followed by italic `details`.
pub fn add_requisite<'p>(
    paragraph: &'p mut Paragraph,
    title: &str,
    details: &str,
    style: RequisiteStyle,
) -> &'p mut Paragraph {
    let title_run = paragraph.add_text(&format!("{}: ", title));
    if style.title_bold {
        title_run.set_bold(true);
    } else {
        title_run.set_italic(true);
    }
    paragraph.add_text(details).set_italic(true);
    if let Some(twips) = style.spacing_after {
        paragraph.set_spacing_after(twips);
    }
    if let Some((num_id, level)) = style.numbering {
        paragraph.set_numbering(num_id, level);
    }
    paragraph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::{ParagraphItem, RunContent};

    fn runs(paragraph: &Paragraph) -> Vec<&crate::ooxml::docx::Run> {
        paragraph.runs().collect()
    }

    #[test]
    fn test_add_text_applies_style() {
        let mut paragraph = Paragraph::new();
        let style = TextStyle::sized(44).bold().with_justification(Justification::Center);
        add_text(&mut paragraph, "Annual Report for 2024", &style);
        let runs = runs(&paragraph);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].properties().font_size, Some(44));
        assert_eq!(runs[0].properties().bold, Some(true));
        assert_eq!(runs[0].properties().italic, None);
        assert_eq!(paragraph.properties().justification, Some(Justification::Center));
    }

    #[test]
    fn test_newline_becomes_break() {
        let mut paragraph = Paragraph::new();
        add_text(&mut paragraph, "Position: Engineer\nDepartment: R&D", &TextStyle::sized(24));
        assert_eq!(paragraph.text(), "Position: Engineer\nDepartment: R&D");
        let breaks = paragraph
            .items()
            .iter()
            .filter(|item| match item {
                ParagraphItem::Run(run) => run.content().iter().any(|c| matches!(c, RunContent::Break)),
                _ => false,
            })
            .count();
        assert_eq!(breaks, 1);
    }

    #[test]
    fn test_requisite() {
        let mut paragraph = Paragraph::new();
        add_requisite(&mut paragraph, "Phone", "+1 555 0100", RequisiteStyle::listed(3, 0).italic_title());
        let runs = runs(&paragraph);
        assert_eq!(runs[0].text(), "Phone: ");
        assert_eq!(runs[0].properties().italic, Some(true));
        assert_eq!(runs[0].properties().bold, None);
        assert_eq!(runs[1].properties().italic, Some(true));
        assert_eq!(paragraph.properties().spacing_after, Some(20));
        assert_eq!(paragraph.properties().numbering.map(|n| (n.num_id, n.level)), Some((3, 0)));
    }
}
