//! Chart object model.
//!
//! A [`Chart`] is one plot (bar, line, pie, scatter or area) with its series,
//! title, legend and axis styling. Charts are either built from literal
//! arrays ([`Chart::new`] plus [`Chart::add_series`]) or from a rectangular
//! block of spreadsheet cells ([`Chart::from_range`]), in which case every
//! series keeps a formula reference plus a cache of the current values.

use crate::common::Rgb;
use crate::ooxml::error::{OoxmlError, Result};

/// Plot types understood by the builder API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    BarStacked,
    HorizontalBar,
    Line,
    LineNormal,
    LineStacked,
    Area,
    Pie,
    Doughnut,
    Scatter,
}

impl ChartKind {
    /// Parse the builder-API chart type name (`"bar"`, `"lineStacked"`, ...).
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(match name {
            "bar" => Self::Bar,
            "barStacked" => Self::BarStacked,
            "horizontalBar" => Self::HorizontalBar,
            "line" => Self::Line,
            "lineNormal" => Self::LineNormal,
            "lineStacked" => Self::LineStacked,
            "area" => Self::Area,
            "pie" => Self::Pie,
            "doughnut" => Self::Doughnut,
            "scatter" => Self::Scatter,
            other => {
                return Err(OoxmlError::InvalidFormat(format!(
                    "unknown chart type '{}'",
                    other
                )));
            },
        })
    }

    pub fn is_pie(self) -> bool {
        matches!(self, Self::Pie | Self::Doughnut)
    }

    pub(crate) fn grouping(self) -> &'static str {
        match self {
            Self::BarStacked | Self::LineStacked => "stacked",
            _ => "standard",
        }
    }

    pub(crate) fn has_axes(self) -> bool {
        !self.is_pie()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendPosition {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

impl LegendPosition {
    pub fn xml_value(self) -> &'static str {
        match self {
            Self::Top => "t",
            Self::Bottom => "b",
            Self::Left => "l",
            Self::Right => "r",
        }
    }
}

/// A value of a chart data cell.
#[derive(Debug, Clone, PartialEq)]
pub enum GridValue {
    Empty,
    Number(f64),
    Text(String),
}

impl GridValue {
    fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    fn as_label(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Empty => None,
        }
    }
}

/// Shortest round-trip text of a number, without a trailing `.0`.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        let mut buf = itoa::Buffer::new();
        buf.format(n as i64).to_string()
    } else {
        let mut buf = ryu::Buffer::new();
        buf.format(n).to_string()
    }
}

/// String points of a series, optionally backed by a sheet formula.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringData {
    pub source_ref: Option<String>,
    pub values: Vec<String>,
}

/// Numeric points of a series, optionally backed by a sheet formula.
/// `None` points are blank cells (or formulas without a cached value).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericData {
    pub source_ref: Option<String>,
    pub values: Vec<Option<f64>>,
    pub format_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub name: Option<String>,
    pub name_ref: Option<String>,
    pub categories: Option<StringData>,
    /// Numeric categories (years, scatter x values) are written as numbers.
    pub numeric_categories: Option<NumericData>,
    pub values: NumericData,
    pub fill: Option<Rgb>,
    pub outline: Option<Rgb>,
    /// Per-point fills, used by pie slices.
    pub point_fills: Vec<Rgb>,
    pub line_width_emu: Option<u32>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: Some(name.into()),
            values: NumericData {
                values: values.into_iter().map(Some).collect(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_categories<S: AsRef<str>>(mut self, categories: &[S]) -> Self {
        self.categories = Some(StringData {
            source_ref: None,
            values: categories.iter().map(|s| s.as_ref().to_string()).collect(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.values.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.values.is_empty()
    }
}

/// Axis and gridline styling for charts that have axes.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisStyle {
    pub major_horizontal_gridlines: bool,
    pub minor_horizontal_gridlines: bool,
    pub major_vertical_gridlines: bool,
    pub minor_vertical_gridlines: bool,
    pub gridline_color: Option<Rgb>,
    pub label_color: Option<Rgb>,
    pub show_category_axis: bool,
    pub show_value_axis: bool,
    pub category_title: Option<AxisTitle>,
    pub value_title: Option<AxisTitle>,
}

/// Axis caption. Size is in points.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTitle {
    pub text: String,
    pub size: u32,
}

impl Default for AxisStyle {
    fn default() -> Self {
        Self {
            major_horizontal_gridlines: true,
            minor_horizontal_gridlines: false,
            major_vertical_gridlines: false,
            minor_vertical_gridlines: false,
            gridline_color: None,
            label_color: None,
            show_category_axis: true,
            show_value_axis: true,
            category_title: None,
            value_title: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: Option<String>,
    /// Title size in points.
    pub title_size: Option<u32>,
    pub title_color: Option<Rgb>,
    pub series: Vec<Series>,
    pub legend: Option<LegendPosition>,
    pub legend_color: Option<Rgb>,
    /// Base text size in points.
    pub font_size: Option<u32>,
    pub style: Option<u32>,
    pub axes: AxisStyle,
    pub show_data_labels: bool,
}

impl Chart {
    pub fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            title: None,
            title_size: None,
            title_color: None,
            series: Vec::new(),
            legend: Some(LegendPosition::Bottom),
            legend_color: None,
            font_size: None,
            style: None,
            axes: AxisStyle::default(),
            show_data_labels: false,
        }
    }

    /// Chart with one series per name and shared category labels, as the
    /// builder API's "create chart from parallel arrays" call.
    pub fn from_arrays<S: AsRef<str>, C: AsRef<str>>(
        kind: ChartKind,
        series_names: &[S],
        values: Vec<Vec<f64>>,
        categories: &[C],
    ) -> Result<Self> {
        if series_names.len() != values.len() {
            return Err(OoxmlError::InvalidFormat(format!(
                "{} series names for {} value arrays",
                series_names.len(),
                values.len()
            )));
        }
        let mut chart = Self::new(kind);
        for (name, data) in series_names.iter().zip(values) {
            chart.add_series(Series::new(name.as_ref(), data).with_categories(categories));
        }
        Ok(chart)
    }

    pub fn add_series(&mut self, series: Series) -> &mut Series {
        self.series.push(series);
        let last = self.series.len() - 1;
        &mut self.series[last]
    }

    pub fn set_title(&mut self, title: impl Into<String>, size: u32) -> &mut Self {
        self.title = Some(title.into());
        self.title_size = Some(size);
        self
    }

    pub fn set_legend(&mut self, position: Option<LegendPosition>) -> &mut Self {
        self.legend = position;
        self
    }

    pub fn set_font_size(&mut self, size: u32) -> &mut Self {
        self.font_size = Some(size);
        self
    }

    pub fn set_category_axis_title(&mut self, text: impl Into<String>, size: u32) -> &mut Self {
        self.axes.category_title = Some(AxisTitle { text: text.into(), size });
        self
    }

    pub fn set_value_axis_title(&mut self, text: impl Into<String>, size: u32) -> &mut Self {
        self.axes.value_title = Some(AxisTitle { text: text.into(), size });
        self
    }

    pub fn set_style(&mut self, style: u32) -> &mut Self {
        self.style = Some(style);
        self
    }

    pub fn set_series_fill(&mut self, index: usize, color: Rgb) -> Result<()> {
        let len = self.series.len();
        let series = self
            .series
            .get_mut(index)
            .ok_or(OoxmlError::IndexOutOfRange { what: "series", index, len })?;
        series.fill = Some(color);
        Ok(())
    }

    pub fn set_series_outline(&mut self, index: usize, color: Rgb) -> Result<()> {
        let len = self.series.len();
        let series = self
            .series
            .get_mut(index)
            .ok_or(OoxmlError::IndexOutOfRange { what: "series", index, len })?;
        series.outline = Some(color);
        Ok(())
    }

    /// Fill of one data point of a series (pie slices).
    pub fn set_point_fill(&mut self, series: usize, point: usize, color: Rgb) -> Result<()> {
        let len = self.series.len();
        let series = self
            .series
            .get_mut(series)
            .ok_or(OoxmlError::IndexOutOfRange { what: "series", index: series, len })?;
        if series.point_fills.len() <= point {
            let fallback = series.fill.unwrap_or(Rgb::grey(128));
            series.point_fills.resize(point + 1, fallback);
        }
        series.point_fills[point] = color;
        Ok(())
    }

    /// Build a chart from a block of cells.
    ///
    /// `grid` holds the cell values of the block whose top-left cell is at
    /// zero-based `(top, left)` on `sheet`. With `in_rows` each row of the
    /// block is a series, otherwise each column is.
    ///
    /// The first line across the series (the first row, or first column when
    /// `in_rows`) is a header of series names when every cell in it is text.
    /// The first series line holds category labels when there is more than one
    /// series line and either its data cells are text or a header exists.
    pub fn from_range(
        kind: ChartKind,
        sheet: &str,
        top: u32,
        left: u32,
        grid: &[Vec<GridValue>],
        in_rows: bool,
    ) -> Result<Self> {
        let rows = grid.len();
        let cols = grid.iter().map(Vec::len).max().unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(OoxmlError::InvalidFormat("empty chart data range".to_string()));
        }

        // (line, position) -> cell, where a line is one potential series
        let cell = |line: usize, pos: usize| grid_cell(grid, in_rows, line, pos);
        let coord = |line: usize, pos: usize| -> (u32, u32) {
            if in_rows {
                (top + line as u32, left + pos as u32)
            } else {
                (top + pos as u32, left + line as u32)
            }
        };
        let (lines, positions) = if in_rows { (rows, cols) } else { (cols, rows) };

        let has_header = positions > 1
            && if lines > 1 {
                (1..lines).all(|l| cell(l, 0).is_text())
            } else {
                cell(0, 0).is_text()
            };
        let first_pos = usize::from(has_header);
        let has_labels = lines > 1
            && (has_header || (first_pos..positions).all(|p| cell(0, p).is_text()));

        let first_line = usize::from(has_labels);
        if first_pos >= positions || first_line >= lines {
            return Err(OoxmlError::InvalidFormat(
                "chart data range has no values".to_string(),
            ));
        }

        let reference = |from: (u32, u32), to: (u32, u32)| -> String {
            let quoted = quote_sheet_name(sheet);
            if from == to {
                format!("{}!{}", quoted, absolute_cell_ref(from.0, from.1))
            } else {
                format!(
                    "{}!{}:{}",
                    quoted,
                    absolute_cell_ref(from.0, from.1),
                    absolute_cell_ref(to.0, to.1)
                )
            }
        };

        let last_pos = positions - 1;
        let categories = if has_labels {
            let labels: Vec<&GridValue> = (first_pos..positions).map(|p| cell(0, p)).collect();
            let source = Some(reference(coord(0, first_pos), coord(0, last_pos)));
            let numeric = labels.iter().all(|v| matches!(v, GridValue::Number(_)));
            Some((numeric, source, labels))
        } else {
            None
        };

        let mut chart = Self::new(kind);
        for line in first_line..lines {
            let mut series = Series::default();
            if has_header {
                series.name = Some(cell(line, 0).as_label());
                series.name_ref = Some(reference(coord(line, 0), coord(line, 0)));
            } else {
                series.name = Some(format!("Series{}", line - first_line + 1));
            }
            series.values = NumericData {
                source_ref: Some(reference(coord(line, first_pos), coord(line, last_pos))),
                values: (first_pos..positions)
                    .map(|p| cell(line, p).as_number())
                    .collect(),
                format_code: None,
            };
            match &categories {
                Some((true, source, labels)) => {
                    series.numeric_categories = Some(NumericData {
                        source_ref: source.clone(),
                        values: labels.iter().map(|v| v.as_number()).collect(),
                        format_code: None,
                    });
                },
                Some((false, source, labels)) => {
                    series.categories = Some(StringData {
                        source_ref: source.clone(),
                        values: labels.iter().map(|v| v.as_label()).collect(),
                    });
                },
                None => {},
            }
            chart.series.push(series);
        }

        Ok(chart)
    }

    /// Like [`Chart::from_range`] but with literal data and no sheet references.
    pub fn from_grid(kind: ChartKind, grid: &[Vec<GridValue>], in_rows: bool) -> Result<Self> {
        let mut chart = Self::from_range(kind, "Sheet1", 0, 0, grid, in_rows)?;
        for series in &mut chart.series {
            series.name_ref = None;
            series.values.source_ref = None;
            if let Some(categories) = &mut series.categories {
                categories.source_ref = None;
            }
            if let Some(categories) = &mut series.numeric_categories {
                categories.source_ref = None;
            }
        }
        Ok(chart)
    }
}

static EMPTY_CELL: GridValue = GridValue::Empty;

fn grid_cell(grid: &[Vec<GridValue>], in_rows: bool, line: usize, pos: usize) -> &GridValue {
    let (r, c) = if in_rows { (line, pos) } else { (pos, line) };
    grid.get(r).and_then(|row| row.get(c)).unwrap_or(&EMPTY_CELL)
}

/// `$A$1` style absolute reference of a zero-based cell.
pub fn absolute_cell_ref(row: u32, col: u32) -> String {
    format!("${}${}", column_letters(col), row + 1)
}

/// Column letters of a zero-based column index (`0` → `A`, `26` → `AA`).
pub fn column_letters(col: u32) -> String {
    let mut n = col + 1;
    let mut letters = Vec::with_capacity(3);
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push(b'A' + rem);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Sheet names with spaces or punctuation are single-quoted in formulas.
pub fn quote_sheet_name(name: &str) -> String {
    if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> GridValue {
        GridValue::Text(s.to_string())
    }

    fn num(n: f64) -> GridValue {
        GridValue::Number(n)
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn test_header_and_category_column() {
        // Year | Amount
        let grid = vec![
            vec![text("Year"), text("Amount")],
            vec![num(0.0), num(1000.0)],
            vec![num(1.0), num(1050.0)],
        ];
        let chart = Chart::from_range(ChartKind::LineNormal, "Sheet1", 0, 0, &grid, false).unwrap();
        assert_eq!(chart.series.len(), 1);
        let series = &chart.series[0];
        assert_eq!(series.name.as_deref(), Some("Amount"));
        assert_eq!(series.name_ref.as_deref(), Some("Sheet1!$B$1"));
        assert_eq!(series.values.source_ref.as_deref(), Some("Sheet1!$B$2:$B$3"));
        assert_eq!(series.values.values, vec![Some(1000.0), Some(1050.0)]);
        let cats = series.numeric_categories.as_ref().unwrap();
        assert_eq!(cats.source_ref.as_deref(), Some("Sheet1!$A$2:$A$3"));
    }

    #[test]
    fn test_text_labels_without_header() {
        let grid = vec![
            vec![text("How easy?"), num(4.5)],
            vec![text("Would recommend?"), num(3.0)],
        ];
        let chart = Chart::from_range(ChartKind::Bar, "Average", 1, 0, &grid, false).unwrap();
        assert_eq!(chart.series.len(), 1);
        let series = &chart.series[0];
        assert_eq!(series.values.source_ref.as_deref(), Some("Average!$B$2:$B$3"));
        let cats = series.categories.as_ref().unwrap();
        assert_eq!(cats.values, vec!["How easy?", "Would recommend?"]);
        assert_eq!(cats.source_ref.as_deref(), Some("Average!$A$2:$A$3"));
    }

    #[test]
    fn test_rows_as_series() {
        // Negative | Neutral | Positive
        //   =COUNTIF results
        let grid = vec![
            vec![text("Negative"), text("Neutral"), text("Positive")],
            vec![num(2.0), num(3.0), GridValue::Empty],
        ];
        let chart = Chart::from_range(ChartKind::Pie, "Charts", 0, 0, &grid, true).unwrap();
        assert_eq!(chart.series.len(), 1);
        let series = &chart.series[0];
        assert_eq!(series.values.source_ref.as_deref(), Some("Charts!$A$2:$C$2"));
        assert_eq!(series.values.values, vec![Some(2.0), Some(3.0), None]);
        assert_eq!(
            series.categories.as_ref().unwrap().source_ref.as_deref(),
            Some("Charts!$A$1:$C$1")
        );
    }

    #[test]
    fn test_literal_grid_with_header_and_labels() {
        let grid = vec![
            vec![GridValue::Empty, text("Price A"), text("Price B")],
            vec![text("Jan"), num(1.0), num(2.0)],
            vec![text("Feb"), num(3.0), num(4.0)],
        ];
        let chart = Chart::from_grid(ChartKind::LineStacked, &grid, false).unwrap();
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[1].name.as_deref(), Some("Price B"));
        assert!(chart.series[1].values.source_ref.is_none());
        assert_eq!(
            chart.series[0].categories.as_ref().unwrap().values,
            vec!["Jan", "Feb"]
        );
    }

    #[test]
    fn test_quoted_sheet_name() {
        assert_eq!(quote_sheet_name("Sheet1"), "Sheet1");
        assert_eq!(quote_sheet_name("My Data"), "'My Data'");
    }

    #[test]
    fn test_unknown_kind() {
        assert!(ChartKind::from_name("radar3d").is_err());
        assert_eq!(ChartKind::from_name("lineStacked").unwrap(), ChartKind::LineStacked);
    }
}
