//! Fillable forms (`.docx`): an employee pass card, a purchase order, and
//! the purchase order filled from JSON.
//!
//! The purchase order written by [`advanced_form`] is also the input of
//! `filling-form`, see [`super::fixtures`].
use std::collections::BTreeMap;
use std::path::PathBuf;

use log::{debug, info};
use serde::Deserialize;

use crate::builders::{TableStyle, TextStyle, add_text, create_table};
use crate::common::Rgb;
use crate::config::RunConfig;
use crate::error::Result;
use crate::input::{Validate, load_json};
use crate::ooxml::docx::{
    BorderStyle, Document, FormKind, Justification, Paragraph, PictureForm, ScaleFlag, Table, TableBorder, TextForm,
};
use crate::session::{DocumentKind, DocumentSession};

pub const INPUT: &str = "form_data.json";

/// Document filled by `filling-form`.
pub const FORM_DOCUMENT: &str = "form.docx";

const ORDER_ROWS: usize = 10;

/// Values for the controls of the purchase order, by control key.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormData {
    #[serde(default)]
    pub text: BTreeMap<String, String>,
    /// Image file names under the images directory
    #[serde(default)]
    pub pictures: BTreeMap<String, String>,
}

impl Validate for FormData {}

pub fn generate_basic(config: &RunConfig) -> Result<PathBuf> {
    let mut session = DocumentSession::create(DocumentKind::Word);
    build_basic(session.word_mut()?)?;
    super::finish(session, config)
}

pub fn generate_advanced(config: &RunConfig) -> Result<PathBuf> {
    let mut session = DocumentSession::create(DocumentKind::Word);
    *session.word_mut()? = advanced_form()?;
    super::finish(session, config)
}

pub fn generate_filled(config: &RunConfig) -> Result<PathBuf> {
    let data: FormData = load_json(config.data_file(INPUT))?;
    let mut session = DocumentSession::open(config.doc_file(FORM_DOCUMENT))?;
    let filler = session.form_mut()?;

    let mut filled = 0;
    for (key, kind) in filler.keys()? {
        match kind {
            FormKind::Text => {
                if let Some(value) = data.text.get(&key) {
                    filler.set_text(&key, value);
                    filled += 1;
                }
            },
            FormKind::Picture => {
                if let Some(name) = data.pictures.get(&key) {
                    filler.set_picture(&key, super::load_image(config, name))?;
                    filled += 1;
                }
            },
            FormKind::Other => debug!("skipping control '{}'", key),
        }
    }
    info!("{} form controls filled", filled);
    super::finish(session, config)
}

/// Employee pass card: a heading, a photo frame and a first name field.
pub fn build_basic(doc: &mut Document) -> Result<()> {
    let heading = doc.style("Heading 3")?.style_id.clone();
    doc.paragraph_mut(0)?
        .set_style(&heading)
        .add_text("Employee pass card");

    let mut photo = PictureForm::new("Photo");
    photo
        .set_tip("Upload your photo")
        .set_placeholder("Photo")
        .set_required(false)
        .set_scale(ScaleFlag::TooBig)
        .set_lock_aspect_ratio(true)
        .set_respect_borders(false)
        .set_picture_position(50, 50);
    doc.push_paragraph(Paragraph::new()).add_content_control(photo);

    let mut first_name = TextForm::new("First name");
    first_name
        .set_tip("Enter your first name")
        .set_placeholder("First name")
        .set_comb(true)
        .set_max_characters(13)
        .set_cell_width(3);
    doc.push_paragraph(Paragraph::new()).add_content_control(first_name);
    Ok(())
}

/// A comb text field limited to `limit` characters.
fn comb_form(key: &str, tip: &str, placeholder: &str, limit: u32) -> TextForm {
    let mut form = TextForm::new(key);
    form.set_tip(tip)
        .set_placeholder(placeholder)
        .set_comb(true)
        .set_max_characters(limit)
        .set_cell_width(1);
    form
}

/// Place `form` at the end of `paragraph`, whose text is then set in `size`.
fn place_text_form(paragraph: &mut Paragraph, form: TextForm, size: u32) {
    paragraph.add_content_control(form);
    paragraph
        .set_font_size(size)
        .set_justification(Justification::Left);
}

fn form_table(doc: &mut Document, rows: usize, cols: usize, border: u8) -> Result<&mut Table> {
    let style = TableStyle {
        border: Some(TableBorder {
            style: BorderStyle::Single,
            size: 4,
            color: Rgb::grey(border),
        }),
        ..Default::default()
    };
    Ok(create_table(doc, rows, cols, &style)?)
}

/// The purchase order form.
pub fn advanced_form() -> Result<Document> {
    let mut doc = Document::new();

    let header = form_table(&mut doc, 1, 2, 255)?;
    add_text(
        header.cell(0, 0)?.first_paragraph(),
        "PURCHASE ORDER",
        &TextStyle::sized(36).bold(),
    );
    let serial_cell = header.cell(0, 1)?.first_paragraph();
    add_text(serial_cell, "Serial # ", &TextStyle::sized(25).bold());
    let mut serial = comb_form("Serial", "Enter serial number", "Serial", 6);
    serial.set_border_color(Rgb::grey(255));
    place_text_form(serial_cell, serial, 25);

    let mut logo = PictureForm::new("Photo");
    logo.set_tip("Upload company logo")
        .set_placeholder("Photo")
        .set_scale(ScaleFlag::TooBig)
        .set_lock_aspect_ratio(false)
        .set_respect_borders(false)
        .set_picture_position(0, 0);
    doc.push_paragraph(Paragraph::new()).add_content_control(logo);

    let company = comb_form("Company Name", "Enter company name", "Company Name", 20);
    place_text_form(doc.push_paragraph(Paragraph::new()), company, 35);

    let date_line = doc.push_paragraph(Paragraph::new());
    add_text(date_line, "Date: ", &TextStyle::sized(25).bold());
    let mut date = comb_form("Date", "Date", "DD.MM.YYYY", 10);
    date.set_border_color(Rgb::grey(255));
    place_text_form(date_line, date, 25);

    add_text(
        doc.push_paragraph(Paragraph::new()),
        "To:",
        &TextStyle::sized(35).bold(),
    );

    let recipient_table = form_table(&mut doc, 1, 1, 200)?;
    let recipient = comb_form("Recipient", "Recipient", "Recipient", 25);
    place_text_form(recipient_table.cell(0, 0)?.first_paragraph(), recipient, 32);

    let order = form_table(&mut doc, ORDER_ROWS, 2, 200)?;
    order.row(0)?.set_background_color(Rgb::grey(245));
    order.cell(0, 0)?.set_width_percent(30);
    let heading = TextStyle::sized(30).bold();
    add_text(order.cell(0, 0)?.first_paragraph(), "Qty.", &heading);
    add_text(order.cell(0, 1)?.first_paragraph(), "Description", &heading);
    for row in 1..ORDER_ROWS {
        let qty = comb_form(&format!("Qty{}", row), &format!("Qty{}", row), " ", 9);
        place_text_form(order.cell(row, 0)?.first_paragraph(), qty, 30);
        let key = format!("Description{}", row);
        let description = comb_form(&key, &key, " ", 22);
        place_text_form(order.cell(row, 1)?.first_paragraph(), description, 30);
    }

    // the empty paragraph every new document starts with
    doc.remove_element(0)?;
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::{ContentControl, DocxReader, ParagraphItem};
    use crate::reports::testing::{overwrite_data, sandbox};

    fn controls(paragraph: &Paragraph) -> Vec<&ContentControl> {
        paragraph
            .items()
            .iter()
            .filter_map(|item| match item {
                ParagraphItem::Control(control) => Some(control),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_basic_form_layout() {
        let mut doc = Document::new();
        build_basic(&mut doc).unwrap();
        let elements = doc.elements();
        assert_eq!(elements.len(), 3);

        let heading = elements[0].as_paragraph().unwrap();
        assert_eq!(heading.properties().style.as_deref(), Some("Heading3"));
        assert_eq!(heading.text(), "Employee pass card");

        match controls(elements[1].as_paragraph().unwrap())[..] {
            [ContentControl::Picture(photo)] => {
                assert_eq!(photo.key, "Photo");
                assert_eq!(photo.scale, ScaleFlag::TooBig);
                assert!(photo.lock_aspect_ratio);
            },
            ref other => panic!("expected the photo frame, got {:?}", other),
        }
        match controls(elements[2].as_paragraph().unwrap())[..] {
            [ContentControl::Text(name)] => {
                assert!(name.comb);
                assert_eq!(name.max_characters, Some(13));
                assert_eq!(name.cell_width, Some(3));
            },
            ref other => panic!("expected the first name field, got {:?}", other),
        }
    }

    #[test]
    fn test_advanced_form_starts_with_header_table() {
        let doc = advanced_form().unwrap();
        let header = doc.elements()[0].as_table().unwrap();
        assert_eq!(header.cell_texts()[0][0], "PURCHASE ORDER");
        assert_eq!(header.borders().unwrap().color, Rgb::grey(255));

        let order = doc.elements().last().and_then(|e| e.as_table()).unwrap();
        assert_eq!(order.row_count(), ORDER_ROWS);
        assert_eq!(order.cell_texts()[0], vec!["Qty.", "Description"]);
        assert_eq!(order.rows()[0].cells()[0].width_percent(), Some(30));
    }

    #[test]
    fn test_advanced_form_keys() {
        let bytes = advanced_form().unwrap().to_bytes().unwrap();
        let forms = DocxReader::from_bytes(bytes).unwrap().forms().unwrap();
        let keys: Vec<&str> = forms.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(&keys[..6], ["Serial", "Photo", "Company Name", "Date", "Recipient", "Qty1"]);
        assert_eq!(keys.last(), Some(&"Description9"));
        assert_eq!(keys.len(), 5 + 2 * (ORDER_ROWS - 1));
        assert!(forms.iter().all(|f| f.showing_placeholder));
        assert_eq!(forms[1].kind, FormKind::Picture);
    }

    #[test]
    fn test_generate_filled() {
        let (_dir, config) = sandbox();
        overwrite_data(
            &config,
            INPUT,
            r#"{"text": {"Company Name": "Ontario Traders", "Qty1": "12", "Unknown": "x"},
                "pictures": {"Photo": "logo.png"}}"#,
        );
        let output = generate_filled(&config).unwrap();
        let reader = DocxReader::open(&output).unwrap();
        let company = reader.form("Company Name").unwrap();
        assert_eq!(company.text, "Ontario Traders");
        assert!(!company.showing_placeholder);
        assert_eq!(reader.form("Qty1").unwrap().text, "12");
        assert!(reader.form("Qty2").unwrap().showing_placeholder);
        assert!(!reader.form("Photo").unwrap().showing_placeholder);
    }

    #[test]
    fn test_filled_values_respect_field_limits() {
        let (_dir, config) = sandbox();
        overwrite_data(
            &config,
            INPUT,
            r#"{"text": {"Serial": "SN-0042-XYZ", "Company Name": "Blue Harbor Logistics Group"}}"#,
        );
        let reader = DocxReader::open(generate_filled(&config).unwrap()).unwrap();
        assert_eq!(reader.form("Serial").unwrap().text, "SN-004");
        assert_eq!(reader.form("Company Name").unwrap().text, "Blue Harbor Logistic");
    }

    #[test]
    fn test_filled_without_form_document() {
        let (_dir, config) = sandbox();
        std::fs::remove_file(config.doc_file(FORM_DOCUMENT)).unwrap();
        assert!(generate_filled(&config).is_err());
        assert!(!config.output_file("docx").exists());
    }

    #[test]
    fn test_generate_basic_and_advanced() {
        let (_dir, config) = sandbox();
        let basic = generate_basic(&config).unwrap();
        let keys: Vec<String> = DocxReader::open(&basic)
            .unwrap()
            .forms()
            .unwrap()
            .into_iter()
            .map(|f| f.key)
            .collect();
        assert_eq!(keys, ["Photo", "First name"]);
        let first_name = DocxReader::open(&basic).unwrap().form("First name").unwrap();
        assert_eq!(first_name.tip, "Enter your first name");
        assert!(first_name.comb);
        assert_eq!(first_name.max_characters, Some(13));

        let advanced = generate_advanced(&config).unwrap();
        let tables = DocxReader::open(&advanced).unwrap().tables().unwrap();
        assert_eq!(tables.len(), 3);
    }
}
