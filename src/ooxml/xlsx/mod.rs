//! Spreadsheet (`.xlsx`) support.
//!
//! [`Workbook`] builds new workbooks: sheets, cell values and formulas,
//! deduplicated cell styles, merged cells, notes and charts drawn from
//! cell ranges. [`WorkbookEditor`] opens existing workbooks to read their
//! values and add notes without disturbing the rest of the package.
//!
//! # Examples
//!
//! ```rust,no_run
//! use docforge::common::Rgb;
//! use docforge::ooxml::xlsx::Workbook;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.sheet_mut(0)?;
//! sheet.range("A1:C1")?.set_values(&[vec!["Item".into(), "Quantity".into(), "Status".into()]]).set_bold(true);
//! sheet.range("C2")?.set_value("In Stock").set_fill_color(Rgb::new(0, 194, 87));
//! workbook.save("result.xlsx")?;
//! # Ok::<(), docforge::ooxml::OoxmlError>(())
//! ```

pub mod cell;
mod comments;
mod drawing;
pub mod editor;
pub mod sheet;
mod strings;
pub mod styles;
pub mod workbook;

pub use cell::{CellValue, RangeRef, cell_name, parse_cell_ref};
pub use comments::CellComment;
pub use editor::{UsedRange, WorkbookEditor, read_values};
pub use sheet::{BorderEdge, Range, SheetChart, Worksheet};
pub use styles::{BorderLine, CellBorders, CellFont, CellStyle, HorizontalAlign, LineStyle, VerticalAlign};
pub use workbook::{SheetSelector, Workbook};
