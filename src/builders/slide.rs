/// Styled text on presentation slides.
use crate::ooxml::pptx::ShapeParagraph;

use super::text::TextStyle;

/// Append `text` to a shape paragraph in `style`. A `'\n'` breaks the line
/// inside the paragraph.
pub fn add_shape_text<'p>(paragraph: &'p mut ShapeParagraph, text: &str, style: &TextStyle) -> &'p mut ShapeParagraph {
    if !text.is_empty() {
        let run = paragraph.add_text(text);
        if let Some(size) = style.size {
            run.set_font_size(size);
        }
        run.set_bold(style.bold).set_italic(style.italic);
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
