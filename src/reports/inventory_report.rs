//! Inventory sheet with a colored status column (`.xlsx`).
use std::path::PathBuf;

use serde::Deserialize;

use crate::builders::fill_row;
use crate::common::Rgb;
use crate::config::RunConfig;
use crate::error::Result;
use crate::input::{Validate, load_json};
use crate::ooxml::xlsx::Workbook;
use crate::session::{DocumentKind, DocumentSession};

use super::Scalar;

pub const INPUT: &str = "ims_response.json";

const HEADERS: [&str; 3] = ["Item", "Quantity", "Status"];

const IN_STOCK: Rgb = Rgb::new(0, 194, 87);
const RESERVED: Rgb = Rgb::new(255, 255, 0);
const UNAVAILABLE: Rgb = Rgb::new(255, 79, 79);

#[derive(Debug, Clone, Deserialize)]
pub struct Inventory {
    pub inventory: Vec<InventoryItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InventoryItem {
    pub item: String,
    pub quantity: Scalar,
    pub status: String,
}

impl Validate for Inventory {}

/// Fill of the status cell. Statuses other than the two known ones count
/// as unavailable.
pub fn status_color(status: &str) -> Rgb {
    match status {
        "In Stock" => IN_STOCK,
        "Reserved" => RESERVED,
        _ => UNAVAILABLE,
    }
}

pub fn generate(config: &RunConfig) -> Result<PathBuf> {
    let inventory: Inventory = load_json(config.data_file(INPUT))?;
    let mut session = DocumentSession::create(DocumentKind::Spreadsheet);
    build(session.workbook_mut()?, &inventory)?;
    super::finish(session, config)
}

pub fn build(workbook: &mut Workbook, inventory: &Inventory) -> Result<()> {
    let sheet = workbook.sheet_mut(0)?;
    fill_row(sheet, 0, 0, &HEADERS);
    sheet.range("A1:C1")?.set_bold(true);

    for (idx, entry) in inventory.inventory.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.range_by_number(row, 0).set_value(entry.item.as_str());
        // numeric text becomes a number cell
        sheet.range_by_number(row, 1).set_value(entry.quantity.to_string());
        sheet
            .range_by_number(row, 2)
            .set_value(entry.status.as_str())
            .set_fill_color(status_color(&entry.status));
    }

    sheet.set_column_width(0, 40.0);
    sheet.set_column_width(2, 15.0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xlsx::{CellValue, WorkbookEditor};
    use crate::reports::testing::sandbox;

    fn sample() -> Inventory {
        serde_json::from_str(
            r#"{"inventory": [
                {"item": "Laptop", "quantity": 12, "status": "In Stock"},
                {"item": "Monitor", "quantity": "3", "status": "Reserved"},
                {"item": "Dock", "quantity": "n/a", "status": "Out of Stock"}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(status_color("In Stock"), Rgb::new(0, 194, 87));
        assert_eq!(status_color("Reserved"), Rgb::new(255, 255, 0));
        assert_eq!(status_color("Discontinued"), Rgb::new(255, 79, 79));
        assert_eq!(status_color("in stock"), UNAVAILABLE);
    }

    #[test]
    fn test_rows_and_fills() {
        let mut workbook = Workbook::new();
        build(&mut workbook, &sample()).unwrap();
        let sheet = workbook.sheet(0).unwrap();
        assert_eq!(sheet.cell_value(0, 1), Some(&CellValue::text("Quantity")));
        assert!(sheet.cell_style(0, 0).unwrap().font.bold);
        assert_eq!(sheet.cell_value(1, 1), Some(&CellValue::Number(12.0)));
        assert_eq!(sheet.cell_value(2, 1), Some(&CellValue::Number(3.0)));
        assert_eq!(sheet.cell_value(3, 1), Some(&CellValue::text("n/a")));
        assert_eq!(sheet.cell_style(2, 2).unwrap().fill, Some(RESERVED));
        assert_eq!(sheet.cell_style(3, 2).unwrap().fill, Some(UNAVAILABLE));
        assert_eq!(sheet.column_width(0), 40.0);
        assert_eq!(sheet.column_width(2), 15.0);
    }

    #[test]
    fn test_empty_inventory_keeps_headers() {
        let mut workbook = Workbook::new();
        build(&mut workbook, &Inventory { inventory: Vec::new() }).unwrap();
        let sheet = workbook.sheet(0).unwrap();
        assert_eq!(sheet.used_range().map(|r| r.rows()), Some(1));
    }

    #[test]
    fn test_generate() {
        let (_dir, config) = sandbox();
        let output = generate(&config).unwrap();
        let editor = WorkbookEditor::open(&output).unwrap();
        let used = editor.used_range("Sheet1").unwrap();
        assert_eq!(used.values[0][0].to_string(), "Item");
        assert!(used.values.len() > 1);
    }
}
