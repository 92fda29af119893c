/// Tables: rows of cells, each cell holding paragraphs.
use std::fmt::Write as FmtWrite;
use std::ops::RangeInclusive;

use crate::common::Rgb;
use crate::ooxml::error::{OoxmlError, Result};

use super::drawing::WriteContext;
use super::paragraph::Paragraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    Single,
    Double,
    Dashed,
    Dotted,
    None,
}

impl BorderStyle {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "single" => Ok(Self::Single),
            "double" => Ok(Self::Double),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            "none" => Ok(Self::None),
            other => Err(OoxmlError::InvalidFormat(format!("unknown border style '{}'", other))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
            Self::None => "nil",
        }
    }
}

/// Border definition shared by all sides of a table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableBorder {
    pub style: BorderStyle,
    /// Width in eighths of a point (4 = half a point)
    pub size: u32,
    pub color: Rgb,
}

impl Default for TableBorder {
    fn default() -> Self {
        Self {
            style: BorderStyle::Single,
            size: 4,
            color: Rgb::BLACK,
        }
    }
}

/// Default cell margins of the table, in twips.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CellMargins {
    pub top: Option<u32>,
    pub left: Option<u32>,
    pub bottom: Option<u32>,
    pub right: Option<u32>,
}

impl CellMargins {
    fn is_empty(&self) -> bool {
        self.top.is_none() && self.left.is_none() && self.bottom.is_none() && self.right.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
}

impl VerticalAlign {
    fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct TableProperties {
    pub(crate) width_pct: Option<u32>,
    pub(crate) borders: Option<TableBorder>,
    pub(crate) cell_margins: CellMargins,
}

/// A table with a fixed column count.
#[derive(Debug, Clone)]
pub struct Table {
    pub(crate) rows: Vec<Row>,
    pub(crate) cols: usize,
    pub(crate) properties: TableProperties,
}

impl Table {
    /// Table of `rows` x `cols` cells, each with one empty paragraph.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: (0..rows).map(|_| Row::new(cols)).collect(),
            cols,
            properties: TableProperties::default(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    pub fn add_row(&mut self) -> &mut Row {
        self.rows.push(Row::new(self.cols));
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    /// Set table width as a percentage of the text width.
    pub fn set_width_percent(&mut self, percent: u32) -> &mut Self {
        self.properties.width_pct = Some(percent);
        self
    }

    /// Set the outer and inside borders at once.
    pub fn set_borders(&mut self, style: BorderStyle, size: u32, color: Rgb) -> &mut Self {
        self.properties.borders = Some(TableBorder { style, size, color });
        self
    }

    pub fn set_cell_margins(&mut self, margins: CellMargins) -> &mut Self {
        self.properties.cell_margins = margins;
        self
    }

    pub fn set_cell_margin_top(&mut self, twips: u32) -> &mut Self {
        self.properties.cell_margins.top = Some(twips);
        self
    }

    pub fn set_cell_margin_bottom(&mut self, twips: u32) -> &mut Self {
        self.properties.cell_margins.bottom = Some(twips);
        self
    }

    pub fn set_cell_margin_left(&mut self, twips: u32) -> &mut Self {
        self.properties.cell_margins.left = Some(twips);
        self
    }

    pub fn set_cell_margin_right(&mut self, twips: u32) -> &mut Self {
        self.properties.cell_margins.right = Some(twips);
        self
    }

    pub fn borders(&self) -> Option<&TableBorder> {
        self.properties.borders.as_ref()
    }

    pub fn cell_margins(&self) -> CellMargins {
        self.properties.cell_margins
    }

    pub fn width_percent(&self) -> Option<u32> {
        self.properties.width_pct
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&mut self, index: usize) -> Result<&mut Row> {
        let len = self.rows.len();
        self.rows
            .get_mut(index)
            .ok_or(OoxmlError::IndexOutOfRange { what: "row", index, len })
    }

    pub fn cell(&mut self, row: usize, col: usize) -> Result<&mut Cell> {
        self.row(row)?.cell(col)
    }

    /// Text of every cell, row by row.
    pub fn cell_texts(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.cells.iter().map(Cell::text).collect())
            .collect()
    }

    /// Merge the cells `cols` of `row` into the first one.
    ///
    /// The first cell spans the whole range; paragraphs of the covered cells
    /// that hold content move into it.
    pub fn merge_cells(&mut self, row: usize, cols: RangeInclusive<usize>) -> Result<&mut Cell> {
        let (first, last) = (*cols.start(), *cols.end());
        let width = self.cols;
        if first > last || last >= width {
            return Err(OoxmlError::IndexOutOfRange { what: "column", index: last, len: width });
        }
        let row = self.row(row)?;
        if row.cells[first..=last].iter().any(|cell| cell.covered || cell.grid_span > 1) {
            return Err(OoxmlError::Conflict("cells are already merged".to_string()));
        }

        let mut moved = Vec::new();
        for cell in &mut row.cells[first + 1..=last] {
            cell.covered = true;
            moved.extend(cell.paragraphs.drain(..).filter(|p| !p.is_empty()));
            cell.paragraphs.push(Paragraph::new());
        }
        let target = &mut row.cells[first];
        target.grid_span = (last - first + 1) as u32;
        target.paragraphs.extend(moved);
        Ok(target)
    }

    pub(crate) fn to_xml(&self, xml: &mut String, ctx: &mut WriteContext, text_width: u32) -> Result<()> {
        xml.push_str("<w:tbl><w:tblPr>");

        let written = match self.properties.width_pct {
            Some(pct) => write!(xml, r#"<w:tblW w:w="{}" w:type="pct"/>"#, pct * 50),
            None => write!(xml, r#"<w:tblW w:w="0" w:type="auto"/>"#),
        };
        written.map_err(|e| OoxmlError::Xml(e.to_string()))?;

        if let Some(ref border) = self.properties.borders {
            xml.push_str("<w:tblBorders>");
            for side in ["top", "left", "bottom", "right", "insideH", "insideV"] {
                write_border(xml, side, border)?;
            }
            xml.push_str("</w:tblBorders>");
        }

        xml.push_str(r#"<w:tblLayout w:type="fixed"/>"#);

        let margins = self.properties.cell_margins;
        if !margins.is_empty() {
            xml.push_str("<w:tblCellMar>");
            for (side, value) in [
                ("top", margins.top),
                ("left", margins.left),
                ("bottom", margins.bottom),
                ("right", margins.right),
            ] {
                if let Some(value) = value {
                    write!(xml, r#"<w:{} w:w="{}" w:type="dxa"/>"#, side, value)?;
                }
            }
            xml.push_str("</w:tblCellMar>");
        }
        xml.push_str("</w:tblPr>");

        let total = text_width * self.properties.width_pct.unwrap_or(100) / 100;
        let col_width = total / self.cols.max(1) as u32;
        xml.push_str("<w:tblGrid>");
        for _ in 0..self.cols {
            write!(xml, r#"<w:gridCol w:w="{}"/>"#, col_width)?;
        }
        xml.push_str("</w:tblGrid>");

        for row in &self.rows {
            row.to_xml(xml, ctx, col_width)?;
        }

        xml.push_str("</w:tbl>");
        Ok(())
    }
}

fn write_border(xml: &mut String, name: &str, border: &TableBorder) -> Result<()> {
    write!(
        xml,
        r#"<w:{} w:val="{}" w:sz="{}" w:space="0" w:color="{}"/>"#,
        name,
        border.style.as_str(),
        border.size,
        border.color.to_hex()
    )
    .map_err(|e| OoxmlError::Xml(e.to_string()))
}

/// A table row.
#[derive(Debug, Clone)]
pub struct Row {
    pub(crate) cells: Vec<Cell>,
    /// Minimum height in twips
    pub(crate) height: Option<u32>,
    pub(crate) header: bool,
}

impl Row {
    fn new(cols: usize) -> Self {
        Self {
            cells: (0..cols).map(|_| Cell::new()).collect(),
            height: None,
            header: false,
        }
    }

    pub fn cell(&mut self, index: usize) -> Result<&mut Cell> {
        let len = self.cells.len();
        self.cells
            .get_mut(index)
            .ok_or(OoxmlError::IndexOutOfRange { what: "cell", index, len })
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn set_height(&mut self, twips: u32) -> &mut Self {
        self.height = Some(twips);
        self
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    /// Repeat this row at the top of each page.
    pub fn set_header(&mut self, header: bool) -> &mut Self {
        self.header = header;
        self
    }

    /// Shade every cell of the row.
    pub fn set_background_color(&mut self, color: Rgb) -> &mut Self {
        for cell in &mut self.cells {
            cell.shading = Some(color);
        }
        self
    }

    fn to_xml(&self, xml: &mut String, ctx: &mut WriteContext, col_width: u32) -> Result<()> {
        xml.push_str("<w:tr>");
        if self.height.is_some() || self.header {
            xml.push_str("<w:trPr>");
            if let Some(height) = self.height {
                write!(xml, r#"<w:trHeight w:val="{}"/>"#, height)?;
            }
            if self.header {
                xml.push_str("<w:tblHeader/>");
            }
            xml.push_str("</w:trPr>");
        }
        for cell in self.cells.iter().filter(|cell| !cell.covered) {
            cell.to_xml(xml, ctx, col_width)?;
        }
        xml.push_str("</w:tr>");
        Ok(())
    }
}

/// A table cell. It always holds at least one paragraph.
#[derive(Debug, Clone)]
pub struct Cell {
    pub(crate) paragraphs: Vec<Paragraph>,
    pub(crate) shading: Option<Rgb>,
    pub(crate) width_pct: Option<u32>,
    pub(crate) vertical_align: Option<VerticalAlign>,
    pub(crate) grid_span: u32,
    /// Hidden under a merged neighbour
    pub(crate) covered: bool,
}

impl Cell {
    fn new() -> Self {
        Self {
            paragraphs: vec![Paragraph::new()],
            shading: None,
            width_pct: None,
            vertical_align: None,
            grid_span: 1,
            covered: false,
        }
    }

    /// The cell's first paragraph.
    pub fn first_paragraph(&mut self) -> &mut Paragraph {
        if self.paragraphs.is_empty() {
            self.paragraphs.push(Paragraph::new());
        }
        &mut self.paragraphs[0]
    }

    pub fn paragraph(&mut self, index: usize) -> Result<&mut Paragraph> {
        let len = self.paragraphs.len();
        self.paragraphs
            .get_mut(index)
            .ok_or(OoxmlError::IndexOutOfRange { what: "paragraph", index, len })
    }

    pub fn add_paragraph(&mut self) -> &mut Paragraph {
        self.paragraphs.push(Paragraph::new());
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraphs_mut(&mut self) -> &mut [Paragraph] {
        &mut self.paragraphs
    }

    pub fn set_shading(&mut self, color: Rgb) -> &mut Self {
        self.shading = Some(color);
        self
    }

    pub fn shading(&self) -> Option<Rgb> {
        self.shading
    }

    pub fn set_width_percent(&mut self, percent: u32) -> &mut Self {
        self.width_pct = Some(percent);
        self
    }

    pub fn width_percent(&self) -> Option<u32> {
        self.width_pct
    }

    pub fn set_vertical_align(&mut self, align: VerticalAlign) -> &mut Self {
        self.vertical_align = Some(align);
        self
    }

    /// Number of grid columns this cell spans.
    pub fn grid_span(&self) -> u32 {
        self.grid_span
    }

    pub fn is_covered(&self) -> bool {
        self.covered
    }

    /// Paragraph texts joined with `'\n'`.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn to_xml(&self, xml: &mut String, ctx: &mut WriteContext, col_width: u32) -> Result<()> {
        xml.push_str("<w:tc><w:tcPr>");
        match self.width_pct {
            Some(pct) => write!(xml, r#"<w:tcW w:w="{}" w:type="pct"/>"#, pct * 50)?,
            None => write!(xml, r#"<w:tcW w:w="{}" w:type="dxa"/>"#, col_width * self.grid_span)?,
        }
        if self.grid_span > 1 {
            write!(xml, r#"<w:gridSpan w:val="{}"/>"#, self.grid_span)?;
        }
        if let Some(color) = self.shading {
            write!(xml, r#"<w:shd w:val="clear" w:color="auto" w:fill="{}"/>"#, color.to_hex())?;
        }
        if let Some(align) = self.vertical_align {
            write!(xml, r#"<w:vAlign w:val="{}"/>"#, align.as_str())?;
        }
        xml.push_str("</w:tcPr>");

        for paragraph in &self.paragraphs {
            paragraph.to_xml(xml, ctx)?;
        }
        if self.paragraphs.is_empty() {
            xml.push_str("<w:p/>");
        }

        xml.push_str("</w:tc>");
        Ok(())
    }
}
