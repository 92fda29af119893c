/// Bullet and numbered lists.
use crate::ooxml::docx::{Document, NumberingKind, Paragraph};
use crate::ooxml::error::Result;

use super::text::{TextStyle, add_text};

/// New list definition in `document`; returns its numbering id.
pub fn create_numbering(document: &mut Document, kind: NumberingKind) -> u32 {
    document.create_numbering(kind)
}

/// Append one paragraph per item to list `num_id` at `level`.
///
/// Returns the number of paragraphs added; an empty `items` adds none.
pub fn add_list<S: AsRef<str>>(
    document: &mut Document,
    num_id: u32,
    items: &[S],
    level: u32,
    style: &TextStyle,
) -> Result<usize> {
    document.numbering(num_id)?;
    for item in items {
        let mut paragraph = Paragraph::new();
        paragraph.set_numbering(num_id, level);
        add_text(&mut paragraph, item.as_ref(), style);
        document.push_paragraph(paragraph);
    }
    Ok(items.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_list() {
        let mut doc = Document::new();
        let num_id = create_numbering(&mut doc, NumberingKind::Numbered);
        let added = add_list(&mut doc, num_id, &["Launched product", "Opened office"], 0, &TextStyle::sized(22)).unwrap();
        assert_eq!(added, 2);
        assert_eq!(doc.paragraph_texts(), vec!["", "Launched product", "Opened office"]);
        let listed = doc
            .elements()
            .iter()
            .filter_map(|e| e.as_paragraph())
            .filter(|p| p.properties().numbering.map(|n| n.num_id) == Some(num_id))
            .count();
        assert_eq!(listed, 2);
    }

    #[test]
    fn test_empty_list_adds_nothing() {
        let mut doc = Document::new();
        let num_id = create_numbering(&mut doc, NumberingKind::Bullet);
        let empty: [&str; 0] = [];
        assert_eq!(add_list(&mut doc, num_id, &empty, 0, &TextStyle::new()).unwrap(), 0);
        assert_eq!(doc.elements_count(), 1);
    }

    #[test]
    fn test_unknown_numbering() {
        let mut doc = Document::new();
        assert!(add_list(&mut doc, 42, &["x"], 0, &TextStyle::new()).is_err());
    }
}
