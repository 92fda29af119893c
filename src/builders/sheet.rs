/// Spreadsheet helpers: rows and columns of values, grids and fitting.
use crate::common::Rgb;
use crate::ooxml::error::Result;
use crate::ooxml::xlsx::{CellValue, LineStyle, Worksheet};

/// Write `values` rightwards from (`row`, `col`), zero-based.
pub fn fill_row<V: Into<CellValue> + Clone>(sheet: &mut Worksheet, row: u32, col: u32, values: &[V]) {
    for (offset, value) in values.iter().enumerate() {
        sheet.range_by_number(row, col + offset as u32).set_value(value.clone());
    }
}

/// Write `values` downwards from (`row`, `col`), zero-based.
pub fn fill_column<V: Into<CellValue> + Clone>(sheet: &mut Worksheet, row: u32, col: u32, values: &[V]) {
    for (offset, value) in values.iter().enumerate() {
        sheet.range_by_number(row + offset as u32, col).set_value(value.clone());
    }
}

/// Draw every edge of `reference`, inside lines included.
pub fn set_borders(sheet: &mut Worksheet, reference: &str, style: LineStyle, color: Rgb) -> Result<()> {
    sheet.range(reference)?.set_borders(style, color);
    Ok(())
}

/// Fit the rows and/or columns of `reference` to their content.
pub fn autofit(sheet: &mut Worksheet, reference: &str, rows: bool, columns: bool) -> Result<()> {
    sheet.range(reference)?.autofit(rows, columns);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xlsx::Workbook;

    #[test]
    fn test_fill_row_and_column() {
        let mut workbook = Workbook::new();
        let sheet = workbook.sheet_mut(0).unwrap();
        fill_row(sheet, 0, 0, &["Item", "Quantity", "Status"]);
        fill_column(sheet, 1, 1, &[10.0, 0.0]);
        assert_eq!(sheet.cell_value(0, 2), Some(&CellValue::Text("Status".to_string())));
        assert_eq!(sheet.cell_value(2, 1), Some(&CellValue::Number(0.0)));
    }

    #[test]
    fn test_grid_and_autofit() {
        let mut workbook = Workbook::new();
        let sheet = workbook.sheet_mut(0).unwrap();
        fill_row(sheet, 0, 0, &["A fairly long header text", "x"]);
        set_borders(sheet, "A1:B2", LineStyle::Thin, Rgb::BLACK).unwrap();
        autofit(sheet, "A1:B1", false, true).unwrap();
        let borders = &sheet.cell_style(1, 1).unwrap().borders;
        assert!(borders.bottom.is_some() && borders.left.is_some());
        assert!(sheet.column_width(0) > sheet.column_width(1));
        assert!(set_borders(sheet, "not a range", LineStyle::Thin, Rgb::BLACK).is_err());
    }
}
