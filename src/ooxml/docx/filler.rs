/// Fills the content controls of an existing `.docx` package.
///
/// The main document part is streamed through quick-xml and written back
/// event by event; only the controls whose key has a value are touched.
/// Every other part of the package is kept verbatim.
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use log::{debug, warn};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::common::ImageFormat;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::{OpcPackage, PackURI};

use super::reader::{FormKind, parse_body};

#[derive(Debug)]
pub struct FormFiller {
    package: OpcPackage,
    document: PackURI,
    texts: HashMap<String, String>,
    pictures: Vec<(String, Vec<u8>, ImageFormat)>,
}

enum Replacement {
    Keep,
    Text(String),
    Picture(String),
}

struct ControlState {
    replacement: Replacement,
    in_properties: bool,
    in_content: bool,
    in_text: bool,
    text_written: bool,
}

impl FormFiller {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_package(OpcPackage::open(path)?)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_package(OpcPackage::from_bytes(bytes)?)
    }

    fn from_package(package: OpcPackage) -> Result<Self> {
        let document = package.main_partname()?;
        Ok(Self {
            package,
            document,
            texts: HashMap::new(),
            pictures: Vec::new(),
        })
    }

    /// Keys of the content controls in the document, in document order.
    pub fn keys(&self) -> Result<Vec<(String, FormKind)>> {
        let xml = self.package.require_part(self.document.as_str())?.xml()?;
        Ok(parse_body(xml.as_bytes())?
            .forms
            .into_iter()
            .map(|f| (f.key, f.kind))
            .collect())
    }

    pub fn set_text(&mut self, key: &str, value: &str) -> &mut Self {
        self.texts.insert(key.to_string(), value.to_string());
        self
    }

    /// Queue a picture for the picture control `key`.
    pub fn set_picture(&mut self, key: &str, data: Vec<u8>) -> Result<&mut Self> {
        let format = ImageFormat::detect_from_bytes(&data).ok_or_else(|| {
            OoxmlError::UnsupportedImage(format!("picture for control '{}'", key))
        })?;
        self.pictures.retain(|(k, _, _)| k != key);
        self.pictures.push((key.to_string(), data, format));
        Ok(self)
    }

    /// Apply the queued values to the document part.
    pub fn apply(&mut self) -> Result<()> {
        let xml = self
            .package
            .require_part(self.document.as_str())?
            .xml()?
            .to_string();
        let forms = parse_body(xml.as_bytes())?.forms;

        let mut texts = std::mem::take(&mut self.texts);
        for (key, value) in texts.iter_mut() {
            let Some(field) = forms.iter().find(|f| &f.key == key && f.kind == FormKind::Text) else {
                warn!("no text control named '{}'", key);
                continue;
            };
            if let Some(limit) = field.max_characters
                && value.chars().count() > limit as usize
            {
                debug!("'{}' cut to its {} character limit", key, limit);
                *value = value.chars().take(limit as usize).collect();
            }
        }

        let mut picture_ids = HashMap::new();
        for (key, data, format) in std::mem::take(&mut self.pictures) {
            if !forms.iter().any(|f| f.key == key && f.kind == FormKind::Picture) {
                warn!("no picture control named '{}'", key);
                continue;
            }
            let partname = self.package.next_partname("/word/media/image", format.extension())?;
            let target = partname.relative_ref(self.document.base_uri());
            self.package.add_part(partname, format.mime_type(), data)?;
            let r_id = self
                .package
                .require_part_mut(self.document.as_str())?
                .rels_mut()
                .get_or_add(relationship_type::IMAGE, &target);
            picture_ids.insert(key, r_id);
        }

        let rewritten = rewrite_controls(&xml, &texts, &picture_ids)?;
        self.package
            .require_part_mut(self.document.as_str())?
            .set_blob(rewritten);
        debug!("filled {} picture controls", picture_ids.len());
        Ok(())
    }

    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.apply()?;
        Ok(self.package.to_bytes()?)
    }

    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.apply()?;
        self.package.save(path)?;
        Ok(())
    }
}

fn val_attr(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == b"val")
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn text_element(value: &str) -> [Event<'_>; 3] {
    let mut start = BytesStart::new("w:t");
    start.push_attribute(("xml:space", "preserve"));
    [
        Event::Start(start),
        Event::Text(BytesText::new(value)),
        Event::End(BytesEnd::new("w:t")),
    ]
}

fn with_embed(e: &BytesStart<'_>, r_id: &str) -> BytesStart<'static> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut blip = BytesStart::new(name);
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() != b"embed" {
            blip.push_attribute(attr);
        }
    }
    blip.push_attribute(("r:embed", r_id));
    blip.into_owned()
}

/// Rewrite the `w:sdt` elements named in `texts` and `pictures`.
fn rewrite_controls(
    xml: &str,
    texts: &HashMap<String, String>,
    pictures: &HashMap<String, String>,
) -> Result<Vec<u8>> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::with_capacity(xml.len())));
    let mut controls: Vec<ControlState> = Vec::new();

    loop {
        let event = reader.read_event()?;
        if matches!(event, Event::Eof) {
            break;
        }

        match &event {
            Event::Start(e) | Event::Empty(e) => {
                let is_empty = matches!(event, Event::Empty(_));
                match e.local_name().as_ref() {
                    b"sdt" if !is_empty => controls.push(ControlState {
                        replacement: Replacement::Keep,
                        in_properties: false,
                        in_content: false,
                        in_text: false,
                        text_written: false,
                    }),
                    b"sdtPr" => {
                        if let Some(control) = controls.last_mut() {
                            control.in_properties = !is_empty;
                        }
                    },
                    b"sdtContent" => {
                        if let Some(control) = controls.last_mut() {
                            control.in_content = !is_empty;
                        }
                    },
                    b"tag" => {
                        if let Some(control) = controls.last_mut()
                            && control.in_properties
                            && let Some(key) = val_attr(e)
                        {
                            control.replacement = match (texts.get(&key), pictures.get(&key)) {
                                (Some(text), _) => Replacement::Text(text.clone()),
                                (None, Some(r_id)) => Replacement::Picture(r_id.clone()),
                                (None, None) => Replacement::Keep,
                            };
                        }
                    },
                    b"showingPlcHdr" => {
                        if let Some(control) = controls.last()
                            && control.in_properties
                            && !matches!(control.replacement, Replacement::Keep)
                        {
                            continue;
                        }
                    },
                    b"t" => {
                        if let Some(control) = controls.last_mut()
                            && control.in_content
                            && let Replacement::Text(ref value) = control.replacement
                        {
                            if is_empty {
                                continue;
                            }
                            control.in_text = true;
                            writer.write_event(event.borrow())?;
                            if !control.text_written {
                                writer.write_event(Event::Text(BytesText::new(value)))?;
                                control.text_written = true;
                            }
                            continue;
                        }
                    },
                    b"blip" => {
                        if let Some(control) = controls.last()
                            && control.in_content
                            && let Replacement::Picture(ref r_id) = control.replacement
                        {
                            let blip = with_embed(e, r_id);
                            if is_empty {
                                writer.write_event(Event::Empty(blip))?;
                            } else {
                                writer.write_event(Event::Start(blip))?;
                            }
                            continue;
                        }
                    },
                    _ => {},
                }
            },
            Event::Text(_) | Event::GeneralRef(_) => {
                if controls.last().is_some_and(|c| c.in_text) {
                    continue;
                }
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => {
                    if let Some(control) = controls.last_mut() {
                        control.in_text = false;
                    }
                },
                b"r" => {
                    if let Some(control) = controls.last_mut()
                        && control.in_content
                        && !control.text_written
                        && let Replacement::Text(ref value) = control.replacement
                    {
                        for piece in text_element(value) {
                            writer.write_event(piece)?;
                        }
                        control.text_written = true;
                    }
                },
                b"sdtPr" => {
                    if let Some(control) = controls.last_mut() {
                        control.in_properties = false;
                    }
                },
                b"sdtContent" => {
                    if let Some(control) = controls.last_mut() {
                        control.in_content = false;
                    }
                },
                b"sdt" => {
                    controls.pop();
                },
                _ => {},
            },
            _ => {},
        }

        writer.write_event(event)?;
    }

    Ok(writer.into_inner().into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::picture::PLACEHOLDER_PNG;
    use crate::ooxml::docx::{Document, DocxReader, PictureForm, TextForm};

    fn form_document() -> Vec<u8> {
        let mut doc = Document::new();
        let mut photo = PictureForm::new("Photo");
        photo.set_placeholder("Photo");
        doc.paragraph_mut(0).unwrap().add_content_control(photo);
        let mut name = TextForm::new("First name");
        name.set_placeholder("First name").set_comb(true).set_max_characters(13);
        name.properties_mut().bold = Some(true);
        let paragraph = doc.paragraph_mut(0).unwrap();
        paragraph.add_content_control(name);
        paragraph.add_content_control(TextForm::new("Company Name"));
        doc.to_bytes().unwrap()
    }

    #[test]
    fn test_fill_text_controls() {
        let mut filler = FormFiller::from_bytes(form_document()).unwrap();
        filler.set_text("First name", "Ada & Co").set_text("Company Name", "Acme");
        let bytes = filler.to_bytes().unwrap();

        let reader = DocxReader::from_bytes(bytes).unwrap();
        let first = reader.form("First name").unwrap();
        assert_eq!(first.text, "Ada & Co");
        assert!(!first.showing_placeholder);
        assert_eq!(reader.form("Company Name").unwrap().text, "Acme");
        assert!(reader.document_xml().unwrap().contains("<w:b/>"));
    }

    #[test]
    fn test_text_cut_to_saved_limit() {
        let mut filler = FormFiller::from_bytes(form_document()).unwrap();
        filler
            .set_text("First name", "Maximilian Alexander")
            .set_text("Company Name", "A company name with no limit at all");
        let reader = DocxReader::from_bytes(filler.to_bytes().unwrap()).unwrap();
        assert_eq!(reader.form("First name").unwrap().text, "Maximilian Al");
        assert_eq!(
            reader.form("Company Name").unwrap().text,
            "A company name with no limit at all"
        );
    }

    #[test]
    fn test_fill_picture_control() {
        let mut filler = FormFiller::from_bytes(form_document()).unwrap();
        filler.set_picture("Photo", PLACEHOLDER_PNG.to_vec()).unwrap();
        let bytes = filler.to_bytes().unwrap();

        let reader = DocxReader::from_bytes(bytes).unwrap();
        assert!(reader.package().contains("/word/media/image2.png"));
        let photo = reader.form("Photo").unwrap();
        assert!(!photo.showing_placeholder);
        let rels = reader.package().part("/word/document.xml").unwrap().rels();
        let r_id = rels
            .iter()
            .find(|r| r.target_ref() == "media/image2.png")
            .map(|r| r.r_id().to_string())
            .unwrap();
        assert!(reader.document_xml().unwrap().contains(&format!(r#"r:embed="{}""#, r_id)));
    }

    #[test]
    fn test_rejects_non_image_bytes() {
        let mut filler = FormFiller::from_bytes(form_document()).unwrap();
        assert!(filler.set_picture("Photo", b"plain text".to_vec()).is_err());
    }

    #[test]
    fn test_unknown_keys_leave_document_unchanged() {
        let original = form_document();
        let mut filler = FormFiller::from_bytes(original.clone()).unwrap();
        filler.set_text("Nope", "value");
        let bytes = filler.to_bytes().unwrap();
        let before = DocxReader::from_bytes(original).unwrap().forms().unwrap();
        let after = DocxReader::from_bytes(bytes).unwrap().forms().unwrap();
        assert_eq!(before, after);
    }
}
