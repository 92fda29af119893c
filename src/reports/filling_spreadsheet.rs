//! A fixed product table pasted into a new workbook (`.xlsx`).
use std::path::PathBuf;

use crate::config::RunConfig;
use crate::error::Result;
use crate::ooxml::xlsx::{CellValue, Workbook};
use crate::session::{DocumentKind, DocumentSession};

/// Typed-in cell text; numeric strings land as numbers.
pub const PRODUCTS: [[&str; 4]; 9] = [
    ["Id", "Product", "Price", "Available"],
    ["1001", "Item A", "12.2", "true"],
    ["1002", "Item B", "18.8", "true"],
    ["1003", "Item C", "70.1", "false"],
    ["1004", "Item D", "60.6", "true"],
    ["1005", "Item E", "32.6", "true"],
    ["1006", "Item F", "28.3", "false"],
    ["1007", "Item G", "11.1", "false"],
    ["1008", "Item H", "41.4", "true"],
];

pub fn generate(config: &RunConfig) -> Result<PathBuf> {
    let mut session = DocumentSession::create(DocumentKind::Spreadsheet);
    build(session.workbook_mut()?)?;
    super::finish(session, config)
}

pub fn build(workbook: &mut Workbook) -> Result<()> {
    let values: Vec<Vec<CellValue>> = PRODUCTS
        .iter()
        .map(|row| row.iter().map(|&text| CellValue::parse(text)).collect())
        .collect();
    let last = (PRODUCTS.len() as u32 - 1, PRODUCTS[0].len() as u32 - 1);
    workbook.sheet_mut(0)?.range_between((0, 0), last).set_values(&values);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xlsx::read_values;
    use crate::reports::testing::sandbox;

    #[test]
    fn test_table_lands_at_a1() {
        let mut workbook = Workbook::new();
        build(&mut workbook).unwrap();
        let sheet = workbook.sheet(0).unwrap();
        assert_eq!(sheet.used_range().unwrap().to_string(), "A1:D9");
        assert_eq!(sheet.cell_value(0, 3), Some(&CellValue::text("Available")));
        assert_eq!(sheet.cell_value(3, 0), Some(&CellValue::Number(1003.0)));
        assert_eq!(sheet.cell_value(8, 2), Some(&CellValue::Number(41.4)));
    }

    #[test]
    fn test_generate_round_trips_values() {
        let (_dir, config) = sandbox();
        let output = generate(&config).unwrap();
        let values = read_values(&output, "Sheet1").unwrap();
        assert_eq!(values.len(), 9);
        assert_eq!(values[5][1].to_string(), "Item E");
        assert_eq!(values[1][2].as_number(), Some(12.2));
    }
}
