//! Worksheets, cell ranges and sheet charts.
//!
//! A [`Worksheet`] stores its cells sparsely, keyed by zero-based
//! `(row, col)`. All editing goes through a [`Range`], a borrowed view of a
//! rectangular block obtained from [`Worksheet::range`] or
//! [`Worksheet::range_by_number`]. Range calls apply to every cell of the
//! block, so `sheet.range("A1:C1")?.set_bold(true)` styles a whole header.
//!
//! # Examples
//!
//! ```rust
//! use docforge::ooxml::xlsx::Workbook;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.sheet_mut(0)?;
//! sheet.range("A1")?.set_value("Item").set_bold(true);
//! sheet.range_by_number(1, 0).set_value("Laptop");
//! sheet.set_column_width(0, 40.0);
//! # Ok::<(), docforge::ooxml::OoxmlError>(())
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;

use log::warn;

use crate::common::Rgb;
use crate::common::xml::escape_xml;
use crate::ooxml::charts::{AxisStyle, Chart, ChartKind, GridValue, LegendPosition};
use crate::ooxml::charts::model::format_number;
use crate::ooxml::error::{OoxmlError, Result};

use super::cell::{CellValue, RangeRef, cell_name};
use super::comments::CellComment;
use super::drawing::ChartAnchor;
use super::strings::SharedStrings;
use super::styles::{BorderLine, CellStyle, HorizontalAlign, LineStyle, StylesBuilder, VerticalAlign};

/// Width of a column nobody sized, in characters.
pub const DEFAULT_COLUMN_WIDTH: f64 = 8.43;
/// Height of a row nobody sized, in points.
pub const DEFAULT_ROW_HEIGHT: f64 = 15.0;
const MAX_COLUMN_WIDTH: f64 = 255.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CellData {
    pub value: CellValue,
    pub style: CellStyle,
}

/// Which edges of a range a border call draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderEdge {
    Top,
    Bottom,
    Left,
    Right,
    InsideHorizontal,
    InsideVertical,
}

impl BorderEdge {
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(match name {
            "Top" => Self::Top,
            "Bottom" => Self::Bottom,
            "Left" => Self::Left,
            "Right" => Self::Right,
            "InsideHorizontal" => Self::InsideHorizontal,
            "InsideVertical" => Self::InsideVertical,
            other => {
                return Err(OoxmlError::InvalidFormat(format!("unknown border edge '{}'", other)));
            },
        })
    }

    pub const ALL: [BorderEdge; 6] = [
        Self::Top,
        Self::Bottom,
        Self::Left,
        Self::Right,
        Self::InsideHorizontal,
        Self::InsideVertical,
    ];
}

#[derive(Debug, Clone)]
enum SeriesStyle {
    Fill(usize, Rgb),
    Outline(usize, Rgb),
    PointFill(usize, usize, Rgb),
}

/// A chart placed on a worksheet.
///
/// The data comes from a cell range that is read when the workbook is
/// saved, so values written after [`Worksheet::add_chart`] still show up.
/// Series styling is therefore recorded here and applied to the series
/// once they exist.
#[derive(Debug, Clone)]
pub struct SheetChart {
    source: RangeRef,
    in_rows: bool,
    template: Chart,
    series_styles: Vec<SeriesStyle>,
    pub(crate) anchor: ChartAnchor,
}

impl SheetChart {
    pub fn kind(&self) -> ChartKind {
        self.template.kind
    }

    pub fn source(&self) -> &RangeRef {
        &self.source
    }

    /// Anchor the top-left corner at a zero-based cell plus EMU offsets.
    pub fn set_position(&mut self, from_col: u32, col_offset: i64, from_row: u32, row_offset: i64) -> &mut Self {
        self.anchor.from_col = from_col;
        self.anchor.col_offset = col_offset;
        self.anchor.from_row = from_row;
        self.anchor.row_offset = row_offset;
        self
    }

    pub fn set_title(&mut self, title: &str, size: u32) -> &mut Self {
        self.template.set_title(title, size);
        self
    }

    pub fn set_legend(&mut self, position: Option<LegendPosition>) -> &mut Self {
        self.template.set_legend(position);
        self
    }

    pub fn set_font_size(&mut self, size: u32) -> &mut Self {
        self.template.set_font_size(size);
        self
    }

    pub fn set_style(&mut self, style: u32) -> &mut Self {
        self.template.set_style(style);
        self
    }

    pub fn axes_mut(&mut self) -> &mut AxisStyle {
        &mut self.template.axes
    }

    pub fn set_series_fill(&mut self, series: usize, color: Rgb) -> &mut Self {
        self.series_styles.push(SeriesStyle::Fill(series, color));
        self
    }

    pub fn set_series_outline(&mut self, series: usize, color: Rgb) -> &mut Self {
        self.series_styles.push(SeriesStyle::Outline(series, color));
        self
    }

    pub fn set_point_fill(&mut self, series: usize, point: usize, color: Rgb) -> &mut Self {
        self.series_styles.push(SeriesStyle::PointFill(series, point, color));
        self
    }

    /// Build the chart from the current values of its source block on
    /// `sheet_name`.
    pub(crate) fn resolve(&self, sheet_name: &str, grid: &[Vec<GridValue>]) -> Result<Chart> {
        if !grid.iter().flatten().any(|v| matches!(v, GridValue::Number(_))) {
            warn!("chart range {}!{} has no numeric data", sheet_name, self.source);
        }
        let mut chart = Chart::from_range(
            self.template.kind,
            sheet_name,
            self.source.first.0,
            self.source.first.1,
            grid,
            self.in_rows,
        )?;
        let series = std::mem::take(&mut chart.series);
        chart = Chart {
            series,
            ..self.template.clone()
        };
        for style in &self.series_styles {
            match *style {
                SeriesStyle::Fill(i, color) => chart.set_series_fill(i, color)?,
                SeriesStyle::Outline(i, color) => chart.set_series_outline(i, color)?,
                SeriesStyle::PointFill(i, p, color) => chart.set_point_fill(i, p, color)?,
            }
        }
        Ok(chart)
    }
}

/// One sheet of a workbook.
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    pub(crate) cells: BTreeMap<(u32, u32), CellData>,
    column_widths: BTreeMap<u32, f64>,
    row_heights: BTreeMap<u32, f64>,
    merges: Vec<RangeRef>,
    pub(crate) comments: Vec<CellComment>,
    pub(crate) charts: Vec<SheetChart>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            column_widths: BTreeMap::new(),
            row_heights: BTreeMap::new(),
            merges: Vec::new(),
            comments: Vec::new(),
            charts: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Range by A1 reference. A sheet prefix, when present, must name this
    /// sheet.
    pub fn range(&mut self, reference: &str) -> Result<Range<'_>> {
        let area = RangeRef::parse(reference)?;
        if let Some(ref sheet) = area.sheet
            && sheet != &self.name
        {
            return Err(OoxmlError::InvalidReference(format!(
                "{} does not refer to sheet '{}'",
                reference, self.name
            )));
        }
        Ok(Range {
            sheet: self,
            area: RangeRef { sheet: None, ..area },
        })
    }

    /// Single-cell range by zero-based row and column.
    pub fn range_by_number(&mut self, row: u32, col: u32) -> Range<'_> {
        self.range_between((row, col), (row, col))
    }

    /// Block spanned by two zero-based corner cells, in any order.
    pub fn range_between(&mut self, a: (u32, u32), b: (u32, u32)) -> Range<'_> {
        let area = RangeRef {
            sheet: None,
            first: (a.0.min(b.0), a.1.min(b.1)),
            last: (a.0.max(b.0), a.1.max(b.1)),
        };
        Range { sheet: self, area }
    }

    pub fn cell_value(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells.get(&(row, col)).map(|c| &c.value)
    }

    pub fn cell_style(&self, row: u32, col: u32) -> Option<&CellStyle> {
        self.cells.get(&(row, col)).map(|c| &c.style)
    }

    /// Smallest block holding every non-empty value.
    pub fn used_range(&self) -> Option<RangeRef> {
        let mut bounds: Option<((u32, u32), (u32, u32))> = None;
        for (&(r, c), cell) in &self.cells {
            if cell.value.is_empty() {
                continue;
            }
            bounds = Some(match bounds {
                None => ((r, c), (r, c)),
                Some((first, last)) => ((first.0.min(r), first.1.min(c)), (last.0.max(r), last.1.max(c))),
            });
        }
        bounds.map(|(first, last)| RangeRef {
            sheet: None,
            first,
            last,
        })
    }

    /// Cell values of a block, row by row.
    pub fn values(&self, area: &RangeRef) -> Vec<Vec<CellValue>> {
        (area.first.0..=area.last.0)
            .map(|r| {
                (area.first.1..=area.last.1)
                    .map(|c| self.cell_value(r, c).cloned().unwrap_or_default())
                    .collect()
            })
            .collect()
    }

    pub(crate) fn grid(&self, area: &RangeRef) -> Vec<Vec<GridValue>> {
        self.values(area)
            .iter()
            .map(|row| row.iter().map(CellValue::to_grid_value).collect())
            .collect()
    }

    /// Column width in characters.
    pub fn set_column_width(&mut self, col: u32, width: f64) {
        self.column_widths.insert(col, width.clamp(0.0, MAX_COLUMN_WIDTH));
    }

    pub fn column_width(&self, col: u32) -> f64 {
        self.column_widths.get(&col).copied().unwrap_or(DEFAULT_COLUMN_WIDTH)
    }

    /// Row height in points.
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height.max(0.0));
    }

    pub fn row_height(&self, row: u32) -> f64 {
        self.row_heights.get(&row).copied().unwrap_or(DEFAULT_ROW_HEIGHT)
    }

    /// Widen every used column to fit its longest value.
    pub fn autofit_columns(&mut self) {
        if let Some(used) = self.used_range() {
            self.autofit(&used, false, true);
        }
    }

    fn autofit(&mut self, area: &RangeRef, rows: bool, columns: bool) {
        if columns {
            for col in area.first.1..=area.last.1 {
                let widest = (area.first.0..=area.last.0)
                    .filter(|&row| !self.is_merged(row, col))
                    .filter_map(|row| self.cells.get(&(row, col)))
                    .map(|cell| text_width(&cell.value.to_string(), cell.style.font.bold))
                    .fold(0.0f64, f64::max);
                if widest > 0.0 {
                    self.set_column_width(col, widest.max(DEFAULT_COLUMN_WIDTH));
                }
            }
        }
        if rows {
            for row in area.first.0..=area.last.0 {
                let lines = (area.first.1..=area.last.1)
                    .filter_map(|col| self.cell_value(row, col))
                    .map(|v| v.to_string().lines().count().max(1))
                    .max()
                    .unwrap_or(1);
                let fitted = DEFAULT_ROW_HEIGHT * lines as f64;
                if fitted > self.row_height(row) {
                    self.set_row_height(row, fitted);
                }
            }
        }
    }

    pub fn merged_ranges(&self) -> &[RangeRef] {
        &self.merges
    }

    fn is_merged(&self, row: u32, col: u32) -> bool {
        self.merges.iter().any(|m| m.rows() * m.cols() > 1 && m.contains(row, col))
    }

    /// Whether the cell lies under a merge without being its top-left cell.
    fn is_hidden_by_merge(&self, row: u32, col: u32) -> bool {
        self.merges
            .iter()
            .any(|m| m.contains(row, col) && m.first != (row, col))
    }

    pub fn comments(&self) -> &[CellComment] {
        &self.comments
    }

    /// Place a chart over the data in `data_range` (`"A1:B5"` or
    /// `"Sheet2!$A$1:$B$5"`). Size is EMU.
    pub fn add_chart(
        &mut self,
        data_range: &str,
        in_rows: bool,
        kind: ChartKind,
        width: i64,
        height: i64,
    ) -> Result<&mut SheetChart> {
        let source = RangeRef::parse(data_range)?;
        self.charts.push(SheetChart {
            source,
            in_rows,
            template: Chart::new(kind),
            series_styles: Vec::new(),
            anchor: ChartAnchor {
                from_col: 0,
                col_offset: 0,
                from_row: 0,
                row_offset: 0,
                width,
                height,
            },
        });
        let last = self.charts.len() - 1;
        Ok(&mut self.charts[last])
    }

    pub fn charts(&self) -> &[SheetChart] {
        &self.charts
    }

    /// Serialize into `xl/worksheets/sheetN.xml`. `drawing` and
    /// `legacy_drawing` are the rIds of the sheet's drawing parts.
    pub(crate) fn to_xml(
        &self,
        strings: &mut SharedStrings,
        styles: &mut StylesBuilder,
        selected: bool,
        drawing: Option<&str>,
        legacy_drawing: Option<&str>,
    ) -> Result<String> {
        let mut xml = String::with_capacity(4096 + self.cells.len() * 48);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#);

        let dimension = self
            .used_range()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "A1".to_string());
        write!(xml, r#"<dimension ref="{}"/>"#, dimension)?;
        if selected {
            xml.push_str(r#"<sheetViews><sheetView tabSelected="1" workbookViewId="0"/></sheetViews>"#);
        } else {
            xml.push_str(r#"<sheetViews><sheetView workbookViewId="0"/></sheetViews>"#);
        }
        xml.push_str(r#"<sheetFormatPr defaultRowHeight="15"/>"#);

        if !self.column_widths.is_empty() {
            xml.push_str("<cols>");
            for (col, width) in &self.column_widths {
                write!(
                    xml,
                    r#"<col min="{0}" max="{0}" width="{1}" customWidth="1"/>"#,
                    col + 1,
                    format_number(*width)
                )?;
            }
            xml.push_str("</cols>");
        }

        xml.push_str("<sheetData>");
        let mut rows: Vec<u32> = self.cells.keys().map(|&(r, _)| r).collect();
        rows.extend(self.row_heights.keys().copied());
        rows.sort_unstable();
        rows.dedup();
        for row in rows {
            write!(xml, r#"<row r="{}""#, row + 1)?;
            if let Some(height) = self.row_heights.get(&row) {
                write!(xml, r#" ht="{}" customHeight="1""#, format_number(*height))?;
            }
            xml.push('>');
            for (&(_, col), cell) in self.cells.range((row, 0)..=(row, u32::MAX)) {
                write_cell(&mut xml, row, col, cell, strings, styles)?;
            }
            xml.push_str("</row>");
        }
        xml.push_str("</sheetData>");

        if !self.merges.is_empty() {
            write!(xml, r#"<mergeCells count="{}">"#, self.merges.len())?;
            for merge in &self.merges {
                write!(xml, r#"<mergeCell ref="{}"/>"#, merge)?;
            }
            xml.push_str("</mergeCells>");
        }

        xml.push_str(r#"<pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>"#);
        if let Some(r_id) = drawing {
            write!(xml, r#"<drawing r:id="{}"/>"#, r_id)?;
        }
        if let Some(r_id) = legacy_drawing {
            write!(xml, r#"<legacyDrawing r:id="{}"/>"#, r_id)?;
        }
        xml.push_str("</worksheet>");
        Ok(xml)
    }
}

/// Approximate display width of `text` in characters of the default font.
fn text_width(text: &str, bold: bool) -> f64 {
    let widest_line = text.lines().map(|l| l.chars().count()).max().unwrap_or(0) as f64;
    let factor = if bold { 1.1 } else { 1.0 };
    (widest_line * factor + 2.0).min(MAX_COLUMN_WIDTH)
}

fn write_cell(
    xml: &mut String,
    row: u32,
    col: u32,
    cell: &CellData,
    strings: &mut SharedStrings,
    styles: &mut StylesBuilder,
) -> Result<()> {
    let name = cell_name(row, col);
    let style = styles.add(&cell.style);
    write!(xml, r#"<c r="{}""#, name)?;
    if style != 0 {
        write!(xml, r#" s="{}""#, style)?;
    }
    match &cell.value {
        CellValue::Empty => xml.push_str("/>"),
        CellValue::Number(n) => write!(xml, "><v>{}</v></c>", format_number(*n))?,
        CellValue::Text(s) => write!(xml, r#" t="s"><v>{}</v></c>"#, strings.add(s))?,
        CellValue::Bool(b) => write!(xml, r#" t="b"><v>{}</v></c>"#, u8::from(*b))?,
        CellValue::Error(e) => write!(xml, r#" t="e"><v>{}</v></c>"#, escape_xml(e))?,
        CellValue::Formula { formula, cached } => {
            match cached.as_deref() {
                Some(CellValue::Text(s)) => {
                    write!(xml, r#" t="str"><f>{}</f><v>{}</v>"#, escape_xml(formula), escape_xml(s))?
                },
                Some(CellValue::Bool(b)) => {
                    write!(xml, r#" t="b"><f>{}</f><v>{}</v>"#, escape_xml(formula), u8::from(*b))?
                },
                Some(CellValue::Error(e)) => {
                    write!(xml, r#" t="e"><f>{}</f><v>{}</v>"#, escape_xml(formula), escape_xml(e))?
                },
                Some(value) => match value.as_number() {
                    Some(n) => write!(xml, "><f>{}</f><v>{}</v>", escape_xml(formula), format_number(n))?,
                    None => write!(xml, "><f>{}</f>", escape_xml(formula))?,
                },
                None => write!(xml, "><f>{}</f>", escape_xml(formula))?,
            }
            xml.push_str("</c>");
        },
    }
    Ok(())
}

/// A rectangular block of cells on a sheet.
#[derive(Debug)]
pub struct Range<'a> {
    sheet: &'a mut Worksheet,
    area: RangeRef,
}

impl Range<'_> {
    pub fn address(&self) -> &RangeRef {
        &self.area
    }

    fn cells(&self) -> impl Iterator<Item = (u32, u32)> + use<> {
        let area = self.area.clone();
        (area.first.0..=area.last.0)
            .flat_map(move |r| (area.first.1..=area.last.1).map(move |c| (r, c)))
    }

    fn style_each(&mut self, mut apply: impl FnMut(&mut CellStyle)) -> &mut Self {
        for pos in self.cells() {
            apply(&mut self.sheet.cells.entry(pos).or_default().style);
        }
        self
    }

    fn put(&mut self, row: u32, col: u32, value: CellValue) {
        if value.is_empty() {
            if let Some(cell) = self.sheet.cells.get_mut(&(row, col)) {
                cell.value = CellValue::Empty;
            }
            return;
        }
        self.sheet.cells.entry((row, col)).or_default().value = value;
    }

    /// Write one value into every cell of the range. Text is interpreted
    /// like typed input: `=` starts a formula and numeric text is a number.
    /// Cells covered by a merge keep no value of their own.
    pub fn set_value(&mut self, value: impl Into<CellValue>) -> &mut Self {
        let value = value.into();
        for (r, c) in self.cells() {
            if !self.sheet.is_hidden_by_merge(r, c) {
                self.put(r, c, value.clone());
            }
        }
        self
    }

    /// Write a block of values starting at the top-left cell. Values past
    /// the range bounds are still written, matching a paste.
    pub fn set_values(&mut self, values: &[Vec<CellValue>]) -> &mut Self {
        let (top, left) = self.area.first;
        for (i, row) in values.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                self.put(top + i as u32, left + j as u32, value.clone());
            }
        }
        self
    }

    pub fn set_number(&mut self, n: f64) -> &mut Self {
        self.set_value(CellValue::Number(n))
    }

    /// Formula with the value a spreadsheet application would compute for
    /// it; the workbook asks for a full recalculation on open regardless.
    pub fn set_formula(&mut self, formula: &str, cached: Option<f64>) -> &mut Self {
        self.set_value(CellValue::formula(formula, cached))
    }

    pub fn values(&self) -> Vec<Vec<CellValue>> {
        self.sheet.values(&self.area)
    }

    pub fn value(&self) -> CellValue {
        self.sheet
            .cell_value(self.area.first.0, self.area.first.1)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_bold(&mut self, bold: bool) -> &mut Self {
        self.style_each(|s| s.font.bold = bold)
    }

    pub fn set_italic(&mut self, italic: bool) -> &mut Self {
        self.style_each(|s| s.font.italic = italic)
    }

    /// Font size in points.
    pub fn set_font_size(&mut self, size: u32) -> &mut Self {
        self.style_each(|s| s.font.size = Some(size))
    }

    pub fn set_font_name(&mut self, name: &str) -> &mut Self {
        self.style_each(|s| s.font.name = Some(name.to_string()))
    }

    pub fn set_font_color(&mut self, color: Rgb) -> &mut Self {
        self.style_each(|s| s.font.color = Some(color))
    }

    pub fn set_fill_color(&mut self, color: Rgb) -> &mut Self {
        self.style_each(|s| s.fill = Some(color))
    }

    pub fn set_align_horizontal(&mut self, align: HorizontalAlign) -> &mut Self {
        self.style_each(|s| s.horizontal = Some(align))
    }

    pub fn set_align_vertical(&mut self, align: VerticalAlign) -> &mut Self {
        self.style_each(|s| s.vertical = Some(align))
    }

    pub fn set_wrap_text(&mut self, wrap: bool) -> &mut Self {
        self.style_each(|s| s.wrap_text = wrap)
    }

    /// Number format code such as `0.0` or `#,##0.00`.
    pub fn set_number_format(&mut self, code: &str) -> &mut Self {
        self.style_each(|s| s.number_format = Some(code.to_string()))
    }

    /// Draw one edge (outer or inside) of the range.
    pub fn set_border(&mut self, edge: BorderEdge, style: LineStyle, color: Rgb) -> &mut Self {
        let line = Some(BorderLine { style, color });
        let (first, last) = (self.area.first, self.area.last);
        for (r, c) in self.cells() {
            let borders = &mut self.sheet.cells.entry((r, c)).or_default().style.borders;
            match edge {
                BorderEdge::Top if r == first.0 => borders.top = line,
                BorderEdge::Bottom if r == last.0 => borders.bottom = line,
                BorderEdge::Left if c == first.1 => borders.left = line,
                BorderEdge::Right if c == last.1 => borders.right = line,
                BorderEdge::InsideHorizontal => {
                    if r > first.0 {
                        borders.top = line;
                    }
                    if r < last.0 {
                        borders.bottom = line;
                    }
                },
                BorderEdge::InsideVertical => {
                    if c > first.1 {
                        borders.left = line;
                    }
                    if c < last.1 {
                        borders.right = line;
                    }
                },
                _ => {},
            }
        }
        self
    }

    /// Grid of lines on every edge, inside ones included.
    pub fn set_borders(&mut self, style: LineStyle, color: Rgb) -> &mut Self {
        for edge in BorderEdge::ALL {
            self.set_border(edge, style, color);
        }
        self
    }

    /// Merge the block into one cell. Overlapping merges are replaced and
    /// values outside the top-left cell are dropped.
    pub fn merge(&mut self) -> &mut Self {
        if self.area.rows() * self.area.cols() < 2 {
            return self;
        }
        let area = self.area.clone();
        self.sheet.merges.retain(|m| !overlaps(m, &area));
        for (r, c) in self.cells() {
            if (r, c) != area.first
                && let Some(cell) = self.sheet.cells.get_mut(&(r, c))
            {
                cell.value = CellValue::Empty;
            }
        }
        self.sheet.merges.push(area);
        self
    }

    pub fn set_row_height(&mut self, height: f64) -> &mut Self {
        for row in self.area.first.0..=self.area.last.0 {
            self.sheet.set_row_height(row, height);
        }
        self
    }

    pub fn set_column_width(&mut self, width: f64) -> &mut Self {
        for col in self.area.first.1..=self.area.last.1 {
            self.sheet.set_column_width(col, width);
        }
        self
    }

    /// Fit row heights and/or column widths to the content of the range.
    pub fn autofit(&mut self, rows: bool, columns: bool) -> &mut Self {
        let area = self.area.clone();
        self.sheet.autofit(&area, rows, columns);
        self
    }

    /// Attach a note to the top-left cell, replacing any note already there.
    pub fn add_comment(&mut self, text: &str, author: &str) -> &mut Self {
        let (row, col) = self.area.first;
        self.sheet.comments.retain(|c| (c.row, c.col) != (row, col));
        self.sheet.comments.push(CellComment {
            row,
            col,
            text: text.to_string(),
            author: author.to_string(),
        });
        self
    }
}

fn overlaps(a: &RangeRef, b: &RangeRef) -> bool {
    a.first.0 <= b.last.0 && b.first.0 <= a.last.0 && a.first.1 <= b.last.1 && b.first.1 <= a.last.1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(sheet: &Worksheet) -> String {
        let mut strings = SharedStrings::new();
        let mut styles = StylesBuilder::new();
        sheet.to_xml(&mut strings, &mut styles, true, None, None).unwrap()
    }

    #[test]
    fn test_set_value_interprets_input() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.range("A1").unwrap().set_value("1001");
        sheet.range("B1").unwrap().set_value("Item A");
        sheet.range("C1").unwrap().set_value("=A1*2");
        assert_eq!(sheet.cell_value(0, 0), Some(&CellValue::Number(1001.0)));
        assert_eq!(sheet.cell_value(0, 1), Some(&CellValue::text("Item A")));
        let xml = render(&sheet);
        assert!(xml.contains(r#"<c r="A1"><v>1001</v></c>"#));
        assert!(xml.contains(r#"<c r="B1" t="s"><v>0</v></c>"#));
        assert!(xml.contains(r#"<c r="C1"><f>A1*2</f></c>"#));
    }

    #[test]
    fn test_reference_to_other_sheet_is_rejected() {
        let mut sheet = Worksheet::new("Average");
        assert!(sheet.range("Charts!A1").is_err());
        assert!(sheet.range("Average!A1:B2").is_ok());
    }

    #[test]
    fn test_block_values_and_used_range() {
        let mut sheet = Worksheet::new("Sheet1");
        let rows = vec![
            vec![CellValue::from("Question"), CellValue::from("Average Rating")],
            vec![CellValue::from("Speed"), CellValue::from("4.5")],
        ];
        sheet.range_by_number(2, 1).set_values(&rows);
        let used = sheet.used_range().unwrap();
        assert_eq!(used.to_string(), "B3:C4");
        assert_eq!(sheet.values(&used)[1][1], CellValue::Number(4.5));
    }

    #[test]
    fn test_merge_keeps_top_left_value() {
        let mut sheet = Worksheet::new("Comments");
        sheet.range("A2:A4").unwrap().merge().set_value("2024-01-01");
        assert_eq!(sheet.cell_value(1, 0), Some(&CellValue::text("2024-01-01")));
        assert_eq!(sheet.cell_value(2, 0), None);
        assert!(render(&sheet).contains(r#"<mergeCells count="1"><mergeCell ref="A2:A4"/></mergeCells>"#));
    }

    #[test]
    fn test_inside_borders() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.range("A1:B2").unwrap().set_borders(LineStyle::Thin, Rgb::BLACK);
        for r in 0..2 {
            for c in 0..2 {
                let borders = sheet.cell_style(r, c).unwrap().borders;
                assert!(borders.top.is_some() && borders.bottom.is_some());
                assert!(borders.left.is_some() && borders.right.is_some());
            }
        }

        let mut sheet = Worksheet::new("Sheet1");
        sheet.range("A1:A3").unwrap().set_border(BorderEdge::Top, LineStyle::Thin, Rgb::BLACK);
        assert!(sheet.cell_style(0, 0).unwrap().borders.top.is_some());
        assert!(sheet.cell_style(1, 0).unwrap().borders.top.is_none());
    }

    #[test]
    fn test_sizes_and_autofit() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.range("A1").unwrap().set_value("A rather long header").set_bold(true);
        sheet.range("A1:C1").unwrap().set_row_height(24.0).autofit(false, true);
        assert!(sheet.column_width(0) > 20.0);
        assert_eq!(sheet.column_width(1), DEFAULT_COLUMN_WIDTH);
        let xml = render(&sheet);
        assert!(xml.contains(r#"<row r="1" ht="24" customHeight="1">"#));
        assert!(xml.contains(r#"<col min="1" max="1""#));
    }

    #[test]
    fn test_chart_resolves_from_grid() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.range("A1:B1").unwrap().set_values(&[vec!["Year".into(), "Amount".into()]]);
        sheet.range("A2:B2").unwrap().set_values(&[vec![0.0.into(), 1000.0.into()]]);
        sheet.range("A3:B3").unwrap().set_values(&[vec![1.0.into(), CellValue::formula("$B$2*POWER((1+0.12),A3)", Some(1120.0))]]);
        let chart = sheet
            .add_chart("Sheet1!$A$1:$B$3", false, ChartKind::LineNormal, 4_873_680, 2_926_080)
            .unwrap();
        chart.set_title("Capital Growth Over Time", 22).set_position(3, 0, 2, 0);
        chart.set_series_fill(0, Rgb::new(91, 155, 213));

        let area = chart.source().clone();
        let grid = sheet.grid(&area);
        let resolved = sheet.charts()[0].resolve("Sheet1", &grid).unwrap();
        assert_eq!(resolved.title.as_deref(), Some("Capital Growth Over Time"));
        assert_eq!(resolved.series.len(), 1);
        assert_eq!(resolved.series[0].values.values, vec![Some(1000.0), Some(1120.0)]);
        assert_eq!(resolved.series[0].fill, Some(Rgb::new(91, 155, 213)));
    }

    #[test]
    fn test_comment_replaces_previous_note() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.range("B2").unwrap().add_comment("first", "");
        sheet.range("B2").unwrap().add_comment("second", "");
        assert_eq!(sheet.comments().len(), 1);
        assert_eq!(sheet.comments()[0].text, "second");
    }
}
