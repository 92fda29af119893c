//! Content builders shared by the reports.
//!
//! Each helper issues a short, fixed sequence of engine calls against a
//! document handle: a styled run, a bordered table, a list, a chart, a row
//! of spreadsheet values or a line of slide text. Helpers keep no state;
//! the only thing they hand back is the created handle (a table, a
//! numbering id) for later calls.

pub mod chart;
pub mod list;
pub mod sheet;
pub mod slide;
pub mod table;
pub mod text;

pub use chart::{ChartSpec, add_chart};
pub use list::{add_list, create_numbering};
pub use sheet::{autofit, fill_column, fill_row, set_borders};
pub use slide::add_shape_text;
pub use table::{TableStyle, create_table, fill_table_body, fill_table_headers};
pub use text::{RequisiteStyle, TextStyle, add_requisite, add_text};
