/// Cell notes: the `comments` part and the legacy VML drawing that shows
/// their indicators.
use std::fmt::Write as FmtWrite;

use crate::common::xml::escape_xml;
use crate::ooxml::error::Result;

use super::cell::cell_name;

/// A note attached to a zero-based cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellComment {
    pub row: u32,
    pub col: u32,
    pub text: String,
    /// Empty when the note has no author
    pub author: String,
}

pub(crate) fn comments_xml(comments: &[CellComment]) -> Result<String> {
    let mut xml = String::with_capacity(256 + comments.len() * 256);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<comments xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#);

    let mut authors: Vec<&str> = Vec::new();
    for comment in comments {
        if !authors.contains(&comment.author.as_str()) {
            authors.push(&comment.author);
        }
    }

    xml.push_str("<authors>");
    for author in &authors {
        write!(xml, "<author>{}</author>", escape_xml(author))?;
    }
    xml.push_str("</authors><commentList>");

    for comment in comments {
        let author_id = authors
            .iter()
            .position(|a| *a == comment.author)
            .unwrap_or(0);
        write!(
            xml,
            r#"<comment ref="{}" authorId="{}"><text>"#,
            cell_name(comment.row, comment.col),
            author_id
        )?;
        if !comment.author.is_empty() {
            xml.push_str(r#"<r><rPr><b/><sz val="9"/><color indexed="81"/><rFont val="Tahoma"/><charset val="1"/></rPr>"#);
            write!(xml, "<t>{}:</t></r>", escape_xml(&comment.author))?;
        }
        xml.push_str(r#"<r><rPr><sz val="9"/><color indexed="81"/><rFont val="Tahoma"/><charset val="1"/></rPr>"#);
        write!(
            xml,
            r#"<t xml:space="preserve">{}</t></r></text></comment>"#,
            escape_xml(&comment.text)
        )?;
    }

    xml.push_str("</commentList></comments>");
    Ok(xml)
}

/// VML shapes for the note boxes. `sheet_number` keeps shape ids unique
/// across the sheets of one workbook.
pub(crate) fn vml_drawing_xml(comments: &[CellComment], sheet_number: usize) -> Result<String> {
    let mut xml = String::with_capacity(1024 + comments.len() * 640);
    xml.push_str(r#"<xml xmlns:v="urn:schemas-microsoft-com:vml" xmlns:o="urn:schemas-microsoft-com:office:office" xmlns:x="urn:schemas-microsoft-com:office:excel">"#);
    write!(
        xml,
        r#"<o:shapelayout v:ext="edit"><o:idmap v:ext="edit" data="{}"/></o:shapelayout>"#,
        sheet_number
    )?;
    xml.push_str(r#"<v:shapetype id="_x0000_t202" coordsize="21600,21600" o:spt="202" path="m,l,21600r21600,l21600,xe"><v:stroke joinstyle="miter"/><v:path gradientshapeok="t" o:connecttype="rect"/></v:shapetype>"#);

    for (idx, comment) in comments.iter().enumerate() {
        // ids of block n start at n * 1024
        let shape_id = sheet_number * 1024 + idx + 1;
        let margin_left = 59.25 + f64::from(comment.col) * 48.0;
        let margin_top = 1.5 + f64::from(comment.row) * 15.0;
        write!(
            xml,
            r##"<v:shape id="_x0000_s{}" type="#_x0000_t202" style="position:absolute;margin-left:{:.2}pt;margin-top:{:.2}pt;width:108pt;height:59.25pt;z-index:{};visibility:hidden" fillcolor="#ffffe1" o:insetmode="auto">"##,
            shape_id,
            margin_left,
            margin_top,
            idx + 1
        )?;
        xml.push_str(r##"<v:fill color2="#ffffe1"/><v:shadow on="t" color="black" obscured="t"/><v:path o:connecttype="none"/><v:textbox style="mso-direction-alt:auto"><div style="text-align:left"></div></v:textbox>"##);
        write!(
            xml,
            r#"<x:ClientData ObjectType="Note"><x:MoveWithCells/><x:SizeWithCells/><x:Anchor>{}, 15, {}, 2, {}, 15, {}, 16</x:Anchor><x:AutoFill>False</x:AutoFill><x:Row>{}</x:Row><x:Column>{}</x:Column></x:ClientData></v:shape>"#,
            comment.col + 1,
            comment.row.saturating_sub(1),
            comment.col + 3,
            comment.row + 3,
            comment.row,
            comment.col
        )?;
    }

    xml.push_str("</xml>");
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(row: u32, col: u32, text: &str, author: &str) -> CellComment {
        CellComment {
            row,
            col,
            text: text.to_string(),
            author: author.to_string(),
        }
    }

    #[test]
    fn test_authors_are_listed_once() {
        let comments = [
            note(0, 0, "first", "QA"),
            note(4, 2, "Error: #DIV/0!", ""),
            note(1, 1, "second", "QA"),
        ];
        let xml = comments_xml(&comments).unwrap();
        assert!(xml.contains("<authors><author>QA</author><author></author></authors>"));
        assert!(xml.contains(r#"<comment ref="C5" authorId="1">"#));
        assert!(xml.contains(r#"<comment ref="B2" authorId="0">"#));
        assert!(xml.contains("<t>QA:</t>"));
        assert!(xml.contains("Error: #DIV/0!"));
    }

    #[test]
    fn test_vml_shapes() {
        let xml = vml_drawing_xml(&[note(4, 2, "x", "")], 1).unwrap();
        assert!(xml.contains(r#"id="_x0000_s1025""#));
        assert!(xml.contains("<x:Row>4</x:Row><x:Column>2</x:Column>"));
        assert!(xml.contains(r#"<o:idmap v:ext="edit" data="1"/>"#));
    }
}
