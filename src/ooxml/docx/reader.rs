/// Read-back of `.docx` packages: body paragraph texts, table cell texts
/// and content controls.
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::OpcPackage;
use crate::ooxml::xmltext::TextBuffer;

/// Kind of a content control found in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Text,
    Picture,
    Other,
}

/// A content control found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub key: String,
    pub kind: FormKind,
    /// Text shown in the control, placeholder text included
    pub text: String,
    pub showing_placeholder: bool,
    /// Help text shown when the field is focused
    pub tip: String,
    pub required: bool,
    pub comb: bool,
    pub max_characters: Option<u32>,
}

/// Text content of a document body.
#[derive(Debug, Clone, Default)]
pub struct BodyContent {
    /// Top-level paragraph texts, in document order
    pub paragraphs: Vec<String>,
    /// Tables in the order they close; each is rows of cell texts
    pub tables: Vec<Vec<Vec<String>>>,
    pub forms: Vec<FormField>,
}

/// Reads the main document part of a `.docx` package.
///
/// # Examples
///
/// ```rust,no_run
/// use docforge::ooxml::docx::DocxReader;
///
/// let reader = DocxReader::open("result.docx")?;
/// for table in reader.content()?.tables {
///     println!("{} rows", table.len());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct DocxReader {
    package: OpcPackage,
}

impl DocxReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            package: OpcPackage::open(path)?,
        })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Ok(Self {
            package: OpcPackage::from_bytes(bytes)?,
        })
    }

    pub fn package(&self) -> &OpcPackage {
        &self.package
    }

    /// Raw XML of the main document part.
    pub fn document_xml(&self) -> Result<&str> {
        let partname = self.package.main_partname()?;
        Ok(self.package.require_part(partname.as_str())?.xml()?)
    }

    pub fn content(&self) -> Result<BodyContent> {
        parse_body(self.document_xml()?.as_bytes())
    }

    pub fn paragraph_texts(&self) -> Result<Vec<String>> {
        Ok(self.content()?.paragraphs)
    }

    pub fn tables(&self) -> Result<Vec<Vec<Vec<String>>>> {
        Ok(self.content()?.tables)
    }

    pub fn forms(&self) -> Result<Vec<FormField>> {
        Ok(self.content()?.forms)
    }

    /// Find a content control by key.
    pub fn form(&self, key: &str) -> Result<FormField> {
        self.forms()?
            .into_iter()
            .find(|f| f.key == key)
            .ok_or_else(|| OoxmlError::PartNotFound(format!("content control '{}'", key)))
    }
}

#[derive(Debug, Default)]
struct TableState {
    rows: Vec<Vec<String>>,
    cell: Option<Vec<String>>,
}

#[derive(Debug)]
struct FormState {
    field: FormField,
    in_properties: bool,
}

impl FormState {
    fn new() -> Self {
        Self {
            field: FormField {
                key: String::new(),
                kind: FormKind::Other,
                text: String::new(),
                showing_placeholder: false,
                tip: String::new(),
                required: false,
                comb: false,
                max_characters: None,
            },
            in_properties: false,
        }
    }

    fn read_form_properties(&mut self, e: &BytesStart<'_>) {
        if let Some(tip) = attr(e, b"helpText") {
            self.field.tip = tip;
        }
        self.field.required = attr(e, b"required").is_some_and(|v| v == "1" || v == "true");
    }
}

fn attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn val_attr(e: &BytesStart<'_>) -> Option<String> {
    attr(e, b"val")
}

/// Walk `w:body` and collect paragraph, table and content control texts.
pub(crate) fn parse_body(xml: &[u8]) -> Result<BodyContent> {
    let mut reader = Reader::from_reader(xml);
    let mut content = BodyContent::default();

    let mut tables: Vec<TableState> = Vec::new();
    let mut forms: Vec<FormState> = Vec::new();
    let mut paragraph: Option<String> = None;
    let mut text = TextBuffer::default();
    let mut in_text = false;
    // a:t inside drawings and text boxes are not body text
    let mut drawing_depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"drawing" | b"pict" => drawing_depth += 1,
                b"tbl" => tables.push(TableState::default()),
                b"tr" => {
                    if let Some(table) = tables.last_mut() {
                        table.rows.push(Vec::new());
                    }
                },
                b"tc" => {
                    if let Some(table) = tables.last_mut() {
                        table.cell = Some(Vec::new());
                    }
                },
                b"p" if drawing_depth == 0 => paragraph = Some(String::new()),
                b"t" if drawing_depth == 0 => in_text = true,
                b"sdt" => forms.push(FormState::new()),
                b"sdtPr" => {
                    if let Some(form) = forms.last_mut() {
                        form.in_properties = true;
                    }
                },
                b"formPr" => {
                    if let Some(form) = forms.last_mut().filter(|f| f.in_properties) {
                        form.read_form_properties(&e);
                    }
                },
                _ => {},
            },
            Ok(Event::Empty(e)) => {
                let in_properties = forms.last().is_some_and(|f| f.in_properties);
                match e.local_name().as_ref() {
                    b"tab" if !in_properties && drawing_depth == 0 => {
                        if let Some(p) = paragraph.as_mut() {
                            p.push('\t');
                        }
                    },
                    b"br" | b"cr" if drawing_depth == 0 => {
                        if let Some(p) = paragraph.as_mut() {
                            p.push('\n');
                        }
                    },
                    b"p" if drawing_depth == 0 => push_paragraph(&mut content, &mut tables, String::new()),
                    b"tag" if in_properties => {
                        if let (Some(form), Some(key)) = (forms.last_mut(), val_attr(&e)) {
                            form.field.key = key;
                        }
                    },
                    b"alias" if in_properties => {
                        if let (Some(form), Some(alias)) = (forms.last_mut(), val_attr(&e))
                            && form.field.key.is_empty()
                        {
                            form.field.key = alias;
                        }
                    },
                    b"text" if in_properties => {
                        if let Some(form) = forms.last_mut() {
                            form.field.kind = FormKind::Text;
                        }
                    },
                    b"picture" if in_properties => {
                        if let Some(form) = forms.last_mut() {
                            form.field.kind = FormKind::Picture;
                        }
                    },
                    b"showingPlcHdr" if in_properties => {
                        if let Some(form) = forms.last_mut() {
                            form.field.showing_placeholder = true;
                        }
                    },
                    b"formPr" if in_properties => {
                        if let Some(form) = forms.last_mut() {
                            form.read_form_properties(&e);
                        }
                    },
                    b"comb" if in_properties => {
                        if let Some(form) = forms.last_mut() {
                            form.field.comb = true;
                        }
                    },
                    b"maxCharacters" if in_properties => {
                        if let Some(form) = forms.last_mut() {
                            form.field.max_characters = val_attr(&e).and_then(|v| v.parse().ok());
                        }
                    },
                    _ => {},
                }
            },
            Ok(Event::Text(t)) if in_text => text.push_text(&t),
            Ok(Event::GeneralRef(r)) if in_text => text.push_ref(&r),
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"drawing" | b"pict" => drawing_depth = drawing_depth.saturating_sub(1),
                b"t" if in_text => {
                    in_text = false;
                    let run_text = text.take();
                    if let Some(form) = forms.last_mut() {
                        form.field.text.push_str(&run_text);
                    }
                    if let Some(p) = paragraph.as_mut() {
                        p.push_str(&run_text);
                    }
                },
                b"p" if drawing_depth == 0 => {
                    if let Some(p) = paragraph.take() {
                        push_paragraph(&mut content, &mut tables, p);
                    }
                },
                b"tc" => {
                    if let Some(table) = tables.last_mut()
                        && let Some(cell) = table.cell.take()
                        && let Some(row) = table.rows.last_mut()
                    {
                        row.push(cell.join("\n"));
                    }
                },
                b"tbl" => {
                    if let Some(table) = tables.pop() {
                        content.tables.push(table.rows);
                    }
                },
                b"sdtPr" => {
                    if let Some(form) = forms.last_mut() {
                        form.in_properties = false;
                    }
                },
                b"sdt" => {
                    if let Some(form) = forms.pop() {
                        content.forms.push(form.field);
                    }
                },
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(OoxmlError::Xml(e.to_string())),
            _ => {},
        }
    }

    Ok(content)
}

fn push_paragraph(content: &mut BodyContent, tables: &mut [TableState], text: String) {
    match tables.last_mut() {
        Some(table) => {
            if let Some(cell) = table.cell.as_mut() {
                cell.push(text);
            }
        },
        None => content.paragraphs.push(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::{Document, Paragraph, Table, TextForm};

    #[test]
    fn test_paragraphs_and_tables_round_trip() {
        let mut doc = Document::new();
        doc.paragraph_mut(0).unwrap().add_text("Annual Report for 2024");
        let mut table = Table::new(2, 3);
        for (c, label) in ["Total revenue", "Total expenses", "Total net profit"].iter().enumerate() {
            table.cell(0, c).unwrap().first_paragraph().add_text(label);
        }
        table.cell(1, 0).unwrap().first_paragraph().add_text("$1,500");
        doc.push_table(table);
        doc.push_paragraph(Paragraph::with_text("a & b\tc"));

        let reader = DocxReader::from_bytes(doc.to_bytes().unwrap()).unwrap();
        let content = reader.content().unwrap();
        assert_eq!(content.paragraphs[0], "Annual Report for 2024");
        assert_eq!(content.paragraphs[1], "a & b\tc");
        assert_eq!(content.tables.len(), 1);
        assert_eq!(content.tables[0][0], vec!["Total revenue", "Total expenses", "Total net profit"]);
        assert_eq!(content.tables[0][1][0], "$1,500");
    }

    #[test]
    fn test_multi_paragraph_cell_text() {
        let xml = br#"<w:document xmlns:w="w"><w:body><w:tbl><w:tr><w:tc><w:p><w:r><w:t>one</w:t></w:r></w:p><w:p><w:r><w:t>two</w:t></w:r></w:p></w:tc></w:tr></w:tbl></w:body></w:document>"#;
        let content = parse_body(xml).unwrap();
        assert_eq!(content.tables[0][0][0], "one\ntwo");
        assert!(content.paragraphs.is_empty());
    }

    #[test]
    fn test_forms_are_listed() {
        let mut doc = Document::new();
        let mut form = TextForm::new("First name");
        form.set_placeholder("First name");
        doc.paragraph_mut(0).unwrap().add_content_control(form);
        let reader = DocxReader::from_bytes(doc.to_bytes().unwrap()).unwrap();
        let field = reader.form("First name").unwrap();
        assert_eq!(field.kind, FormKind::Text);
        assert!(field.showing_placeholder);
        assert_eq!(field.text, "First name");
        assert_eq!(field.max_characters, None);
        assert!(reader.form("Missing").is_err());
    }

    #[test]
    fn test_form_settings_read_back() {
        let mut doc = Document::new();
        let mut form = TextForm::new("Serial");
        form.set_tip("Printed on the back").set_required(true).set_comb(true).set_max_characters(8);
        doc.paragraph_mut(0).unwrap().add_content_control(form);
        let reader = DocxReader::from_bytes(doc.to_bytes().unwrap()).unwrap();
        let field = reader.form("Serial").unwrap();
        assert_eq!(field.tip, "Printed on the back");
        assert!(field.required);
        assert!(field.comb);
        assert_eq!(field.max_characters, Some(8));
    }
}
