/// Bordered report tables.
use crate::common::Rgb;
use crate::ooxml::docx::{BorderStyle, Document, Table, TableBorder};
use crate::ooxml::error::Result;

use super::text::{TextStyle, add_text};

#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    pub width_percent: u32,
    /// Same border on every edge, inside lines included
    pub border: Option<TableBorder>,
    /// Twips
    pub cell_margin_top: Option<u32>,
    /// Background of the first row
    pub header_shading: Option<Rgb>,
    /// Twips before and after every cell paragraph
    pub paragraph_spacing: Option<u32>,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            width_percent: 100,
            border: Some(TableBorder::default()),
            cell_margin_top: None,
            header_shading: None,
            paragraph_spacing: None,
        }
    }
}

impl TableStyle {
    /// Light grey grid with a shaded header row.
    pub fn report() -> Self {
        Self {
            border: Some(TableBorder {
                style: BorderStyle::Single,
                size: 4,
                color: Rgb::grey(200),
            }),
            cell_margin_top: Some(200),
            header_shading: Some(Rgb::grey(245)),
            ..Default::default()
        }
    }

    /// Thin black grid with airy cell paragraphs.
    pub fn ledger() -> Self {
        Self {
            paragraph_spacing: Some(40),
            ..Default::default()
        }
    }

    pub fn without_borders(mut self) -> Self {
        self.border = None;
        self
    }
}

/// Append a `rows` x `cols` table in `style` to `document`.
pub fn create_table<'d>(document: &'d mut Document, rows: usize, cols: usize, style: &TableStyle) -> Result<&'d mut Table> {
    let mut table = Table::new(rows, cols);
    table.set_width_percent(style.width_percent);
    if let Some(border) = style.border {
        table.set_borders(border.style, border.size, border.color);
    }
    if let Some(twips) = style.cell_margin_top {
        table.set_cell_margin_top(twips);
    }
    if let Some(color) = style.header_shading
        && rows > 0
    {
        table.row(0)?.set_background_color(color);
    }
    if let Some(twips) = style.paragraph_spacing {
        for row in 0..rows {
            for col in 0..cols {
                table
                    .cell(row, col)?
                    .first_paragraph()
                    .set_spacing_before(twips)
                    .set_spacing_after(twips);
            }
        }
    }
    Ok(document.push_table(table))
}

/// Write `headers` into the first row.
pub fn fill_table_headers<S: AsRef<str>>(table: &mut Table, headers: &[S], style: &TextStyle) -> Result<()> {
    for (col, header) in headers.iter().enumerate() {
        add_text(table.cell(0, col)?.first_paragraph(), header.as_ref(), style);
    }
    Ok(())
}

/// Write `rows` starting at `start_row`, one string per cell.
pub fn fill_table_body<S: AsRef<str>>(
    table: &mut Table,
    rows: &[Vec<S>],
    start_row: usize,
    style: &TextStyle,
) -> Result<()> {
    for (i, values) in rows.iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            add_text(table.cell(start_row + i, col)?.first_paragraph(), value.as_ref(), style);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_table() {
        let mut doc = Document::new();
        let table = create_table(&mut doc, 2, 3, &TableStyle::report()).unwrap();
        fill_table_headers(table, &["Total revenue", "Total expenses", "Total net profit"], &TextStyle::sized(22).bold())
            .unwrap();
        fill_table_body(table, &[vec!["1500000", "900000", "600000"]], 1, &TextStyle::sized(22)).unwrap();

        assert_eq!(table.width_percent(), Some(100));
        assert_eq!(table.cell_margins().top, Some(200));
        assert_eq!(table.borders().map(|b| b.color), Some(Rgb::grey(200)));
        assert_eq!(table.rows()[0].cells()[0].shading(), Some(Rgb::grey(245)));
        assert_eq!(table.rows()[1].cells()[0].shading(), None);
        assert_eq!(
            doc.tables().next().unwrap().cell_texts(),
            vec![
                vec!["Total revenue", "Total expenses", "Total net profit"],
                vec!["1500000", "900000", "600000"],
            ]
        );
    }

    #[test]
    fn test_ledger_spacing() {
        let mut doc = Document::new();
        let table = create_table(&mut doc, 2, 2, &TableStyle::ledger()).unwrap();
        let paragraph = table.cell(1, 1).unwrap().first_paragraph();
        assert_eq!(paragraph.properties().spacing_before, Some(40));
        assert_eq!(paragraph.properties().spacing_after, Some(40));
    }

    #[test]
    fn test_body_past_last_row_fails() {
        let mut doc = Document::new();
        let table = create_table(&mut doc, 1, 2, &TableStyle::default()).unwrap();
        assert!(fill_table_body(table, &[vec!["a", "b"]], 1, &TextStyle::new()).is_err());
    }
}
