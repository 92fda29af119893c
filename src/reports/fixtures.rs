//! Input documents of the reports that edit or read an existing file.
//!
//! `docforge fixtures` writes them under `<resources>/docs/`:
//!
//! - `form.docx`, the purchase order filled by `filling-form`
//! - `chart_data.xlsx`, the price grid charted by `chart-presentation`
//! - `spreadsheet_with_errors.xlsx`, the sheet noted by `commenting-errors`
use std::path::PathBuf;

use log::info;

use crate::builders::fill_row;
use crate::config::RunConfig;
use crate::error::Result;
use crate::ooxml::xlsx::{CellValue, Workbook};
use crate::session::{DocumentKind, DocumentSession};

use super::{chart_presentation, commenting_errors, forms};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Monthly prices of three price types. May is the peak.
const PRICES: [[f64; 3]; 12] = [
    [10.0, 12.0, 8.0],
    [14.0, 13.0, 9.0],
    [16.0, 15.0, 12.0],
    [19.0, 18.0, 14.0],
    [25.0, 22.0, 19.0],
    [21.0, 20.0, 16.0],
    [22.0, 21.0, 17.0],
    [23.0, 22.0, 18.0],
    [24.0, 23.0, 18.0],
    [26.0, 24.0, 20.0],
    [27.0, 25.0, 21.0],
    [28.0, 26.0, 22.0],
];

/// Write every fixture and return their paths.
pub fn write_all(config: &RunConfig) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(3);

    let mut session = DocumentSession::create(DocumentKind::Word);
    *session.word_mut()? = forms::advanced_form()?;
    written.push(save(session, config, forms::FORM_DOCUMENT)?);

    let mut session = DocumentSession::create(DocumentKind::Spreadsheet);
    chart_data(session.workbook_mut()?)?;
    written.push(save(session, config, chart_presentation::INPUT)?);

    let mut session = DocumentSession::create(DocumentKind::Spreadsheet);
    sheet_with_errors(session.workbook_mut()?)?;
    written.push(save(session, config, commenting_errors::INPUT)?);

    info!("{} fixtures written", written.len());
    Ok(written)
}

fn save(mut session: DocumentSession, config: &RunConfig, name: &str) -> Result<PathBuf> {
    let path = config.doc_file(name);
    session.save(&path)?;
    session.close();
    Ok(path)
}

/// Header row of price types, then one row per month.
pub fn chart_data(workbook: &mut Workbook) -> Result<()> {
    let sheet = workbook.sheet_mut(0)?;
    fill_row(sheet, 0, 0, &["", "Type A", "Type B", "Type C"]);
    for (row, (month, prices)) in MONTHS.iter().zip(PRICES).enumerate() {
        let row = row as u32 + 1;
        sheet.range_by_number(row, 0).set_value(*month);
        fill_row(sheet, row, 1, &prices);
    }
    Ok(())
}

/// A small sales table with three failed formulas.
pub fn sheet_with_errors(workbook: &mut Workbook) -> Result<()> {
    let sheet = workbook.sheet_mut(0)?;
    let rows: Vec<Vec<CellValue>> = vec![
        vec!["Item".into(), "Revenue".into(), "Units".into(), "Price per unit".into()],
        vec!["Lamp".into(), 1200.0.into(), 40.0.into(), 30.0.into()],
        vec!["Desk".into(), 3400.0.into(), 0.0.into(), CellValue::Error("#DIV/0!".to_string())],
        vec!["Chair".into(), CellValue::Error("#N/A".to_string()), 25.0.into(), 45.0.into()],
        vec!["Shelf".into(), 900.0.into(), 15.0.into(), CellValue::Error("#VALUE!".to_string())],
    ];
    sheet.range("A1:D5")?.set_values(&rows);
    sheet.set_column_width(3, 15.0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xlsx::read_values;

    #[test]
    fn test_write_all() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig::new().with_resources_dir(dir.path());
        let written = write_all(&config).unwrap();
        assert_eq!(written.len(), 3);
        assert!(written.iter().all(|path| path.starts_with(dir.path().join("docs"))));

        let grid = read_values(config.doc_file(chart_presentation::INPUT), "Sheet1").unwrap();
        assert_eq!(grid.len(), 13);
        assert_eq!(grid[0][1].to_string(), "Type A");
        assert_eq!(grid[5][1].as_number(), Some(25.0));

        let errors = read_values(config.doc_file(commenting_errors::INPUT), "Sheet1").unwrap();
        let count = errors
            .iter()
            .flatten()
            .filter(|value| matches!(value, CellValue::Error(_)))
            .count();
        assert_eq!(count, 3);
    }
}
