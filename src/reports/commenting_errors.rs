//! Notes on every error cell of an existing workbook (`.xlsx`).
use std::path::PathBuf;

use log::{debug, info};

use crate::config::RunConfig;
use crate::error::Result;
use crate::ooxml::OoxmlError;
use crate::ooxml::xlsx::WorkbookEditor;
use crate::session::DocumentSession;

pub const INPUT: &str = "spreadsheet_with_errors.xlsx";

pub const AUTHOR: &str = "docforge";

pub fn generate(config: &RunConfig) -> Result<PathBuf> {
    let mut session = DocumentSession::open(config.doc_file(INPUT))?;
    let noted = annotate(session.editor_mut()?)?;
    info!("{} error cells noted", noted);
    super::finish(session, config)
}

/// Note every cell of the first sheet whose text contains `#`. Returns the
/// number of notes added.
pub fn annotate(editor: &mut WorkbookEditor) -> Result<usize> {
    let sheet = editor
        .sheet_names()
        .first()
        .map(|name| name.to_string())
        .ok_or_else(|| OoxmlError::PartNotFound("worksheet".to_string()))?;
    let used = editor.used_range(&sheet)?;
    let mut noted = 0;
    for (row, col, value) in used.cells() {
        let text = value.to_string();
        if text.contains('#') {
            debug!("{}: error at ({}, {}): {}", sheet, row, col, text);
            editor.add_comment(&sheet, row, col, &format!("Error: {}", text), AUTHOR)?;
            noted += 1;
        }
    }
    Ok(noted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xlsx::{CellValue, Workbook};
    use crate::reports::testing::sandbox;
    use std::io::Read;

    fn workbook_bytes() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.sheet_mut(0).unwrap();
        sheet.range("A1").unwrap().set_value("Ratio");
        sheet.range("A2").unwrap().set_value(CellValue::Error("#DIV/0!".to_string()));
        sheet.range("B2").unwrap().set_value("Issue #12");
        sheet.range("C3").unwrap().set_value(CellValue::Error("#N/A".to_string()));
        workbook.to_bytes().unwrap()
    }

    #[test]
    fn test_every_hash_cell_gets_a_note() {
        let mut editor = WorkbookEditor::from_bytes(workbook_bytes()).unwrap();
        assert_eq!(annotate(&mut editor).unwrap(), 3);
        let bytes = editor.to_bytes().unwrap();

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut comments = String::new();
        archive
            .by_name("xl/comments1.xml")
            .unwrap()
            .read_to_string(&mut comments)
            .unwrap();
        assert!(comments.contains(r#"ref="A2""#));
        assert!(comments.contains("Error: #DIV/0!"));
        assert!(comments.contains("Error: #N/A"));
        assert!(comments.contains(AUTHOR));
        assert!(!comments.contains(r#"ref="A1""#));
    }

    #[test]
    fn test_generate() {
        let (_dir, config) = sandbox();
        let output = generate(&config).unwrap();
        let file = std::fs::File::open(output).unwrap();
        let archive = zip::ZipArchive::new(file).unwrap();
        assert!(archive.file_names().any(|name| name.starts_with("xl/comments")));
    }

    #[test]
    fn test_missing_workbook() {
        let (_dir, config) = sandbox();
        std::fs::remove_file(config.doc_file(INPUT)).unwrap();
        assert!(generate(&config).is_err());
        assert!(!config.output_file("xlsx").exists());
    }
}
