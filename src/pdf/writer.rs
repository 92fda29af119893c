//! Serialization of laid out pages into a PDF file.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream, StringFormat, dictionary};

use crate::common::Rgb;

use super::error::Result;
use super::font::{StandardFont, encode_win_ansi};
use super::layout::{DrawOp, PageLayout, Stroke};

const PDF_VERSION: &str = "1.5";

fn real(value: f32) -> Object {
    Object::Real(value)
}

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

fn color_operands(color: Rgb) -> Vec<Object> {
    color.to_unit().into_iter().map(real).collect()
}

/// Resource names of the fonts used anywhere in the layout.
fn collect_fonts(layout: &PageLayout) -> BTreeMap<StandardFont, String> {
    let mut fonts = BTreeMap::new();
    for op in layout.pages.iter().flat_map(|page| page.ops.iter()) {
        if let DrawOp::Text { font, .. } = op {
            let next = fonts.len() + 1;
            fonts.entry(*font).or_insert_with(|| format!("F{}", next));
        }
    }
    fonts
}

fn stroke_operations(operations: &mut Vec<Operation>, stroke: Stroke) {
    operations.push(Operation::new("RG", color_operands(stroke.color)));
    operations.push(Operation::new("w", vec![real(stroke.width)]));
}

fn page_operations(ops: &[DrawOp], fonts: &BTreeMap<StandardFont, String>) -> Vec<Operation> {
    let mut operations = Vec::with_capacity(ops.len() * 5);
    for op in ops {
        match op {
            DrawOp::Text { x, y, font, size, color, text } => {
                let Some(font_name) = fonts.get(font) else {
                    continue;
                };
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec![name(font_name), real(*size)]));
                operations.push(Operation::new("rg", color_operands(*color)));
                operations.push(Operation::new("Td", vec![real(*x), real(*y)]));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                ));
                operations.push(Operation::new("ET", vec![]));
            },
            DrawOp::Rect { x, y, width, height, fill, stroke } => {
                let paint = match (fill, stroke) {
                    (Some(_), Some(_)) => "B",
                    (Some(_), None) => "f",
                    (None, Some(_)) => "S",
                    (None, None) => continue,
                };
                operations.push(Operation::new("q", vec![]));
                if let Some(color) = fill {
                    operations.push(Operation::new("rg", color_operands(*color)));
                }
                if let Some(stroke) = stroke {
                    stroke_operations(&mut operations, *stroke);
                }
                operations.push(Operation::new("re", vec![real(*x), real(*y), real(*width), real(*height)]));
                operations.push(Operation::new(paint, vec![]));
                operations.push(Operation::new("Q", vec![]));
            },
            DrawOp::Line { from, to, stroke } => {
                operations.push(Operation::new("q", vec![]));
                stroke_operations(&mut operations, *stroke);
                operations.push(Operation::new("m", vec![real(from.0), real(from.1)]));
                operations.push(Operation::new("l", vec![real(to.0), real(to.1)]));
                operations.push(Operation::new("S", vec![]));
                operations.push(Operation::new("Q", vec![]));
            },
            DrawOp::Image { x, y, width, height, image } => {
                operations.push(Operation::new("q", vec![]));
                operations.push(Operation::new(
                    "cm",
                    vec![real(*width), real(0.0), real(0.0), real(*height), real(*x), real(*y)],
                ));
                operations.push(Operation::new("Do", vec![name(&format!("Im{}", image + 1))]));
                operations.push(Operation::new("Q", vec![]));
            },
        }
    }
    operations
}

/// Build the PDF object graph of `layout`, with uncompressed streams.
pub(crate) fn build_document(layout: &PageLayout) -> Result<lopdf::Document> {
    let mut doc = lopdf::Document::with_version(PDF_VERSION);
    let pages_id: ObjectId = doc.new_object_id();

    let fonts = collect_fonts(layout);
    let mut font_dict = Dictionary::new();
    for (font, resource) in &fonts {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        font_dict.set(resource.as_bytes().to_vec(), font_id);
    }

    let mut xobjects = Dictionary::new();
    for (idx, image) in layout.images.iter().enumerate() {
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8_i64,
            },
            image.rgb.clone(),
        );
        let image_id = doc.add_object(stream);
        xobjects.set(format!("Im{}", idx + 1).into_bytes(), image_id);
    }

    let mut resources = dictionary! { "Font" => font_dict };
    if !xobjects.is_empty() {
        resources.set("XObject", xobjects);
    }
    let resources_id = doc.add_object(resources);

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content = Content { operations: page_operations(&page.ops, &fonts) };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), real(layout.width), real(layout.height)],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Producer" => Object::string_literal("docforge"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    Ok(doc)
}

/// Serialize `layout` into PDF bytes with compressed streams.
pub fn write_pdf(layout: &PageLayout) -> Result<Vec<u8>> {
    let mut doc = build_document(layout)?;
    doc.compress();
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::font::FontFamily;
    use crate::pdf::layout::{Page, RasterImage};

    fn sample_layout() -> PageLayout {
        let times = StandardFont::new(FontFamily::Times, true, false);
        let text = |s: &str, font| DrawOp::Text {
            x: 72.0,
            y: 700.0,
            font,
            size: 14.0,
            color: Rgb::BLACK,
            text: s.to_string(),
        };
        PageLayout {
            width: 612.0,
            height: 792.0,
            pages: vec![
                Page {
                    ops: vec![
                        text("INVOICE", times),
                        DrawOp::Rect {
                            x: 72.0,
                            y: 600.0,
                            width: 100.0,
                            height: 20.0,
                            fill: Some(Rgb::grey(245)),
                            stroke: Some(Stroke { color: Rgb::BLACK, width: 0.5 }),
                        },
                        DrawOp::Image { x: 72.0, y: 400.0, width: 50.0, height: 50.0, image: 0 },
                    ],
                },
                Page { ops: vec![text("Total \u{2022}", StandardFont::new(FontFamily::Helvetica, false, false))] },
            ],
            images: vec![RasterImage { width: 1, height: 1, rgb: vec![255, 0, 0] }],
        }
    }

    #[test]
    fn test_build_document_structure() {
        let doc = build_document(&sample_layout()).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 2);

        let first = doc.get_object(pages[&1]).unwrap().as_dict().unwrap();
        let content_id = first.get(b"Contents").unwrap().as_reference().unwrap();
        let stream = doc.get_object(content_id).unwrap().as_stream().unwrap();
        let content = Content::decode(&stream.content).unwrap();
        let operators: Vec<&str> = content.operations.iter().map(|op| op.operator.as_str()).collect();
        assert!(operators.starts_with(&["BT", "Tf", "rg", "Td", "Tj", "ET"]));
        assert!(operators.contains(&"B"));
        assert!(operators.contains(&"Do"));
        let tj = content.operations.iter().find(|op| op.operator == "Tj").unwrap();
        assert_eq!(tj.operands[0].as_str().unwrap(), b"INVOICE");

        let second = doc.get_object(pages[&2]).unwrap().as_dict().unwrap();
        let content_id = second.get(b"Contents").unwrap().as_reference().unwrap();
        let stream = doc.get_object(content_id).unwrap().as_stream().unwrap();
        let content = Content::decode(&stream.content).unwrap();
        let tj = content.operations.iter().find(|op| op.operator == "Tj").unwrap();
        assert_eq!(tj.operands[0].as_str().unwrap(), b"Total \x95");
    }

    #[test]
    fn test_fonts_get_stable_resource_names() {
        let fonts = collect_fonts(&sample_layout());
        assert_eq!(fonts.len(), 2);
        assert_eq!(fonts[&StandardFont::new(FontFamily::Times, true, false)], "F1");
        assert_eq!(fonts[&StandardFont::new(FontFamily::Helvetica, false, false)], "F2");
    }

    #[test]
    fn test_write_pdf_reloads() {
        let bytes = write_pdf(&sample_layout()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let reloaded = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(reloaded.get_pages().len(), 2);
    }

    #[test]
    fn test_output_is_deterministic() {
        let layout = sample_layout();
        assert_eq!(write_pdf(&layout).unwrap(), write_pdf(&layout).unwrap());
    }
}
