//! DrawingML charts shared by documents, workbooks and presentations.

pub mod model;
pub mod writer;

pub use model::{
    AxisStyle, AxisTitle, Chart, ChartKind, GridValue, LegendPosition, NumericData, Series, StringData,
};
pub use writer::{chart_to_bytes, write_chart};
