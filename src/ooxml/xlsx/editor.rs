//! Reading and annotating existing `.xlsx` packages.
//!
//! [`WorkbookEditor`] keeps the package it opened as raw parts. Reading
//! walks the sheet XML with quick-xml; adding notes appends a comments part
//! and a VML drawing and patches a `legacyDrawing` element into the sheet.
//! Everything else in the package is written back untouched.

use std::collections::BTreeMap;
use std::path::Path;

use log::debug;
use memchr::memmem;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use crate::ooxml::opc::{OpcPackage, PackURI};
use crate::ooxml::xmltext::TextBuffer;

use super::cell::{CellValue, parse_cell_ref, parse_number};
use super::comments::{CellComment, comments_xml, vml_drawing_xml};
use super::strings::parse_shared_strings;

/// Values of the used block of a sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsedRange {
    /// Zero-based row of the first row in `values`
    pub top: u32,
    /// Zero-based column of the first column in `values`
    pub left: u32,
    pub values: Vec<Vec<CellValue>>,
}

impl UsedRange {
    /// Non-empty cells with their zero-based positions.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32, &CellValue)> {
        self.values.iter().enumerate().flat_map(move |(i, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, v)| !v.is_empty())
                .map(move |(j, v)| (self.top + i as u32, self.left + j as u32, v))
        })
    }
}

/// Elements that follow `legacyDrawing` in a worksheet.
const AFTER_LEGACY_DRAWING: [&[u8]; 7] = [
    b"<legacyDrawingHF",
    b"<picture",
    b"<oleObjects",
    b"<controls",
    b"<webPublishItems",
    b"<tableParts",
    b"<extLst",
];

#[derive(Debug)]
pub struct WorkbookEditor {
    package: OpcPackage,
    workbook: PackURI,
    /// Sheet name and part name, in tab order
    sheets: Vec<(String, PackURI)>,
    shared_strings: Vec<String>,
    pending: BTreeMap<usize, Vec<CellComment>>,
}

impl WorkbookEditor {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_package(OpcPackage::open(path)?)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_package(OpcPackage::from_bytes(bytes)?)
    }

    fn from_package(package: OpcPackage) -> Result<Self> {
        let workbook = package.main_partname()?;
        let part = package.require_part(workbook.as_str())?;

        let mut sheets = Vec::new();
        let mut reader = Reader::from_str(part.xml()?);
        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                    let name = attr(&e, b"name").unwrap_or_default();
                    let r_id = attr_qualified(&e, b"r:id")
                        .or_else(|| attr(&e, b"id"))
                        .ok_or_else(|| OoxmlError::InvalidFormat(format!("sheet '{}' has no r:id", name)))?;
                    sheets.push((name, part.related_partname(&r_id)?));
                },
                Event::Eof => break,
                _ => {},
            }
        }

        let shared_strings = match part.rels().part_with_reltype(rt::SHARED_STRINGS) {
            Ok(rel) => {
                let uri = rel.target_partname()?;
                parse_shared_strings(package.require_part(uri.as_str())?.blob())?
            },
            Err(_) => Vec::new(),
        };

        debug!("opened workbook with {} sheets", sheets.len());
        Ok(Self {
            package,
            workbook,
            sheets,
            shared_strings,
            pending: BTreeMap::new(),
        })
    }

    pub fn package(&self) -> &OpcPackage {
        &self.package
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(name, _)| name.as_str()).collect()
    }

    fn sheet_index(&self, sheet: &str) -> Result<usize> {
        self.sheets
            .iter()
            .position(|(name, _)| name == sheet)
            .ok_or_else(|| OoxmlError::PartNotFound(format!("worksheet '{}'", sheet)))
    }

    /// Values of every cell with content on `sheet`, as one block.
    pub fn used_range(&self, sheet: &str) -> Result<UsedRange> {
        let index = self.sheet_index(sheet)?;
        let xml = self.package.require_part(self.sheets[index].1.as_str())?.blob();
        let cells = read_cells(xml, &self.shared_strings)?;

        let Some(top) = cells.keys().map(|&(r, _)| r).min() else {
            return Ok(UsedRange::default());
        };
        let left = cells.keys().map(|&(_, c)| c).min().unwrap_or(0);
        let bottom = cells.keys().map(|&(r, _)| r).max().unwrap_or(top);
        let right = cells.keys().map(|&(_, c)| c).max().unwrap_or(left);

        let mut values = vec![vec![CellValue::Empty; (right - left + 1) as usize]; (bottom - top + 1) as usize];
        for ((r, c), value) in cells {
            values[(r - top) as usize][(c - left) as usize] = value;
        }
        Ok(UsedRange { top, left, values })
    }

    /// Queue a note for a zero-based cell of `sheet`.
    pub fn add_comment(&mut self, sheet: &str, row: u32, col: u32, text: &str, author: &str) -> Result<()> {
        let index = self.sheet_index(sheet)?;
        let queue = self.pending.entry(index).or_default();
        queue.retain(|c| (c.row, c.col) != (row, col));
        queue.push(CellComment {
            row,
            col,
            text: text.to_string(),
            author: author.to_string(),
        });
        Ok(())
    }

    /// Write queued notes into the package.
    pub fn apply(&mut self) -> Result<()> {
        for (index, mut comments) in std::mem::take(&mut self.pending) {
            comments.sort_by_key(|c| (c.row, c.col));
            let (name, sheet_uri) = self.sheets[index].clone();
            let sheet_part = self.package.require_part(sheet_uri.as_str())?;
            let existing = sheet_part.rels().iter().any(|r| r.reltype() == rt::COMMENTS);
            if existing || memmem::find(sheet_part.blob(), b"<legacyDrawing ").is_some() {
                return Err(OoxmlError::Conflict(format!("sheet '{}' already has comments", name)));
            }

            let comments_uri = self.package.next_partname("/xl/comments", "xml")?;
            let vml_uri = self.package.next_partname("/xl/drawings/vmlDrawing", "vml")?;
            let comments_target = comments_uri.relative_ref(sheet_uri.base_uri());
            let vml_target = vml_uri.relative_ref(sheet_uri.base_uri());
            self.package
                .add_part(vml_uri, ct::OFC_VML_DRAWING, vml_drawing_xml(&comments, index + 1)?.into_bytes())?;
            self.package
                .add_part(comments_uri, ct::SML_COMMENTS, comments_xml(&comments)?.into_bytes())?;

            let sheet_part = self.package.require_part_mut(sheet_uri.as_str())?;
            let vml_rid = sheet_part.rels_mut().get_or_add(rt::VML_DRAWING, &vml_target);
            sheet_part.rels_mut().get_or_add(rt::COMMENTS, &comments_target);
            let patched = insert_legacy_drawing(sheet_part.blob(), &vml_rid)?;
            sheet_part.set_blob(patched);
            debug!("added {} comments to sheet '{}'", comments.len(), name);
        }
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

    pub fn workbook_partname(&self) -> &PackURI {
        &self.workbook
    }
}

/// Values of `sheet` in an `.xlsx` file, from `A1` to the last used cell.
pub fn read_values<P: AsRef<Path>>(path: P, sheet: &str) -> Result<Vec<Vec<CellValue>>> {
    let used = WorkbookEditor::open(path)?.used_range(sheet)?;
    if used.values.is_empty() {
        return Ok(Vec::new());
    }
    let width = used.left as usize + used.values[0].len();
    let mut grid = vec![vec![CellValue::Empty; width]; used.top as usize];
    for row in used.values {
        let mut padded = vec![CellValue::Empty; used.left as usize];
        padded.extend(row);
        grid.push(padded);
    }
    Ok(grid)
}

fn attr(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local && a.key.prefix().is_none())
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn attr_qualified(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn decode_cell(kind: &str, raw: String, formula: Option<String>, shared: &[String]) -> CellValue {
    let value = match kind {
        "s" => atoi_simd::parse::<usize, false, false>(raw.trim().as_bytes())
            .ok()
            .and_then(|i| shared.get(i))
            .map(|s| CellValue::Text(s.clone()))
            .unwrap_or(CellValue::Empty),
        "str" | "inlineStr" => CellValue::Text(raw),
        "e" => CellValue::Error(raw),
        "b" => CellValue::Bool(raw.trim() == "1"),
        _ if raw.is_empty() => CellValue::Empty,
        _ => parse_number(&raw).map(CellValue::Number).unwrap_or(CellValue::Text(raw)),
    };
    match formula {
        Some(formula) => CellValue::Formula {
            formula,
            cached: (!value.is_empty()).then(|| Box::new(value)),
        },
        None => value,
    }
}

/// Cell values of a worksheet part keyed by zero-based position.
fn read_cells(xml: &[u8], shared: &[String]) -> Result<BTreeMap<(u32, u32), CellValue>> {
    let mut reader = Reader::from_reader(xml);
    let mut cells = BTreeMap::new();
    let mut text = TextBuffer::default();

    let mut current: Option<((u32, u32), String)> = None;
    let mut formula: Option<String> = None;
    let mut raw = String::new();
    let mut capture = false;
    let mut next_row = 0u32;
    let mut next_col = 0u32;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"row" => {
                next_row = match attr(&e, b"r") {
                    Some(r) => atoi_simd::parse::<u32, false, false>(r.as_bytes())
                        .map_err(|_| OoxmlError::InvalidReference(r.clone()))?
                        .saturating_sub(1),
                    None => next_row,
                };
                next_col = 0;
            },
            Event::Start(e) if e.local_name().as_ref() == b"c" => {
                let pos = match attr(&e, b"r") {
                    Some(r) => parse_cell_ref(&r)?,
                    None => (next_row, next_col),
                };
                next_col = pos.1 + 1;
                current = Some((pos, attr(&e, b"t").unwrap_or_default()));
                formula = None;
                raw.clear();
            },
            Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                if let Some(r) = attr(&e, b"r") {
                    next_col = parse_cell_ref(&r)?.1 + 1;
                } else {
                    next_col += 1;
                }
            },
            Event::Start(e) if current.is_some() => {
                if matches!(e.local_name().as_ref(), b"v" | b"f" | b"t") {
                    capture = true;
                }
            },
            Event::Text(t) if capture => text.push_text(&t),
            Event::GeneralRef(r) if capture => text.push_ref(&r),
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"t" => {
                    capture = false;
                    raw.push_str(&text.take());
                },
                b"f" => {
                    capture = false;
                    formula = Some(text.take());
                },
                b"c" => {
                    if let Some((pos, kind)) = current.take() {
                        let value = decode_cell(&kind, std::mem::take(&mut raw), formula.take(), shared);
                        if !value.is_empty() {
                            cells.insert(pos, value);
                        }
                    }
                },
                b"row" => next_row += 1,
                _ => {},
            },
            Event::Eof => break,
            _ => {},
        }
    }
    Ok(cells)
}

fn insert_legacy_drawing(xml: &[u8], r_id: &str) -> Result<Vec<u8>> {
    let element = if memmem::find(xml, br#"xmlns:r=""#).is_some() {
        format!(r#"<legacyDrawing r:id="{}"/>"#, r_id)
    } else {
        format!(
            r#"<legacyDrawing xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" r:id="{}"/>"#,
            r_id
        )
    };
    let at = AFTER_LEGACY_DRAWING
        .iter()
        .filter_map(|tag| memmem::find(xml, tag))
        .min()
        .or_else(|| memmem::rfind(xml, b"</worksheet>"))
        .ok_or_else(|| OoxmlError::InvalidFormat("worksheet part is not closed".to_string()))?;

    let mut patched = Vec::with_capacity(xml.len() + element.len());
    patched.extend_from_slice(&xml[..at]);
    patched.extend_from_slice(element.as_bytes());
    patched.extend_from_slice(&xml[at..]);
    Ok(patched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xlsx::Workbook;

    fn errors_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.sheet_mut(0).unwrap();
        sheet.range("B2:D2").unwrap().set_values(&[vec![
            "Revenue".into(),
            CellValue::Error("#DIV/0!".to_string()),
            CellValue::formula("B2+1", Some(3.0)),
        ]]);
        sheet.range("B3").unwrap().set_value(true);
        sheet.range("C3").unwrap().set_value("#N/A text");
        workbook.to_bytes().unwrap()
    }

    #[test]
    fn test_used_range_reads_every_cell_kind() {
        let editor = WorkbookEditor::from_bytes(errors_workbook()).unwrap();
        assert_eq!(editor.sheet_names(), vec!["Sheet1"]);
        let used = editor.used_range("Sheet1").unwrap();
        assert_eq!((used.top, used.left), (1, 1));
        assert_eq!(used.values[0][0], CellValue::text("Revenue"));
        assert_eq!(used.values[0][1], CellValue::Error("#DIV/0!".to_string()));
        assert_eq!(used.values[0][2].as_number(), Some(3.0));
        assert_eq!(used.values[1][0], CellValue::Bool(true));
        assert_eq!(used.values[1][1], CellValue::text("#N/A text"));
        assert_eq!(used.cells().count(), 5);
        assert!(editor.used_range("Missing").is_err());
    }

    #[test]
    fn test_comments_are_added_once() {
        let mut editor = WorkbookEditor::from_bytes(errors_workbook()).unwrap();
        editor.add_comment("Sheet1", 1, 2, "Error: #DIV/0!", "").unwrap();
        let bytes = editor.to_bytes().unwrap();

        let reopened = WorkbookEditor::from_bytes(bytes.clone()).unwrap();
        let package = reopened.package();
        let sheet = package.part("/xl/worksheets/sheet1.xml").unwrap();
        assert!(sheet.xml().unwrap().contains("<legacyDrawing r:id=\"rId1\"/></worksheet>"));
        assert!(package.contains("/xl/comments1.xml"));
        assert!(package.contains("/xl/drawings/vmlDrawing1.vml"));
        assert!(package.part("/xl/comments1.xml").unwrap().xml().unwrap().contains(r#"ref="C2""#));
        // the data is untouched
        assert_eq!(reopened.used_range("Sheet1").unwrap().values[0][0], CellValue::text("Revenue"));

        let mut again = WorkbookEditor::from_bytes(bytes).unwrap();
        again.add_comment("Sheet1", 0, 0, "late", "").unwrap();
        assert!(matches!(again.apply(), Err(OoxmlError::Conflict(_))));
    }

    #[test]
    fn test_legacy_drawing_goes_before_table_parts() {
        let xml = br#"<worksheet xmlns:r="r"><sheetData/><tableParts count="0"/></worksheet>"#;
        let patched = insert_legacy_drawing(xml, "rId4").unwrap();
        let text = String::from_utf8(patched).unwrap();
        assert!(text.contains(r#"<sheetData/><legacyDrawing r:id="rId4"/><tableParts"#));
    }

    #[test]
    fn test_read_values_pads_to_a1() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        std::fs::write(&path, errors_workbook()).unwrap();
        let grid = read_values(&path, "Sheet1").unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0], vec![CellValue::Empty; 4]);
        assert_eq!(grid[1][1], CellValue::text("Revenue"));
    }
}
