//! Compound growth of an investment, with a line chart (`.xlsx`).
use std::path::PathBuf;

use serde::Deserialize;

use crate::common::Rgb;
use crate::common::unit::mm_to_emu;
use crate::config::RunConfig;
use crate::error::Result;
use crate::input::{Validate, load_json};
use crate::ooxml::charts::ChartKind;
use crate::ooxml::xlsx::Workbook;
use crate::session::{DocumentKind, DocumentSession};

pub const INPUT: &str = "investment_data.json";

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Investment {
    pub initial_amount: i64,
    /// Yearly rate as a fraction, `0.05` for 5%
    pub return_rate: f64,
    /// Years
    pub term: u32,
}

impl Validate for Investment {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.term == 0 {
            return Err("term must be at least one year".to_string());
        }
        if !self.return_rate.is_finite() {
            return Err("return_rate is not a number".to_string());
        }
        Ok(())
    }
}

impl Investment {
    /// Amount after `year` years of compounding.
    pub fn amount_after(&self, year: u32) -> f64 {
        self.initial_amount as f64 * (1.0 + self.return_rate).powf(f64::from(year))
    }
}

pub fn generate(config: &RunConfig) -> Result<PathBuf> {
    let investment: Investment = load_json(config.data_file(INPUT))?;
    let mut session = DocumentSession::create(DocumentKind::Spreadsheet);
    build(session.workbook_mut()?, &investment)?;
    super::finish(session, config)
}

/// Growth formula of the 1-based sheet row `row`, whose column A holds the year.
/// The rate is written with every digit, so the formula agrees with the cached value.
fn growth_formula(rate: f64, row: u32) -> String {
    let mut buf = ryu::Buffer::new();
    format!("=$B$2*POWER((1+{}),A{})", buf.format(rate), row)
}

pub fn build(workbook: &mut Workbook, investment: &Investment) -> Result<()> {
    let sheet = workbook.sheet_mut(0)?;
    sheet.range("A1")?.set_value("Year");
    sheet.range("B1")?.set_value("Amount");

    sheet.range("A2")?.set_value(0u32);
    sheet.range("B2")?.set_value(investment.initial_amount);
    for year in 1..=investment.term {
        let row = year + 2;
        sheet.range_by_number(row - 1, 0).set_value(year);
        sheet
            .range_by_number(row - 1, 1)
            .set_formula(&growth_formula(investment.return_rate, row), Some(investment.amount_after(year)));
    }

    let last_row = investment.term + 2;
    let chart = sheet.add_chart(
        &format!("Sheet1!$A$1:$B${}", last_row),
        false,
        ChartKind::LineNormal,
        mm_to_emu(135.38),
        mm_to_emu(81.28),
    )?;
    chart
        .set_position(3, 0, 2, 0)
        .set_title("Capital Growth Over Time", 22);
    let axes = chart.axes_mut();
    axes.minor_vertical_gridlines = true;
    axes.major_horizontal_gridlines = true;
    axes.gridline_color = Some(Rgb::grey(134));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::input::InputError;
    use crate::ooxml::xlsx::CellValue;
    use crate::reports::testing::{overwrite_data, sandbox};

    const SAMPLE: Investment = Investment {
        initial_amount: 10_000,
        return_rate: 0.05,
        term: 3,
    };

    #[test]
    fn test_formulas_reference_their_year() {
        let mut workbook = Workbook::new();
        build(&mut workbook, &SAMPLE).unwrap();
        let sheet = workbook.sheet(0).unwrap();
        assert_eq!(sheet.cell_value(1, 1), Some(&CellValue::Number(10_000.0)));
        assert_eq!(sheet.cell_value(4, 0), Some(&CellValue::Number(3.0)));
        match sheet.cell_value(4, 1) {
            Some(CellValue::Formula { formula, cached }) => {
                assert_eq!(formula, "$B$2*POWER((1+0.05),A5)");
                let cached = cached.as_ref().and_then(|v| v.as_number()).unwrap();
                assert!((cached - 11_576.25).abs() < 1e-6);
            },
            other => panic!("expected a formula, got {:?}", other),
        }
        assert_eq!(sheet.used_range().unwrap().rows(), 5);
    }

    #[test]
    fn test_precise_rate_kept_in_formula() {
        let precise = Investment {
            return_rate: 0.012_345_678_9,
            ..SAMPLE
        };
        let mut workbook = Workbook::new();
        build(&mut workbook, &precise).unwrap();
        match workbook.sheet(0).unwrap().cell_value(2, 1) {
            Some(CellValue::Formula { formula, cached }) => {
                assert_eq!(formula, "$B$2*POWER((1+0.0123456789),A3)");
                let cached = cached.as_ref().and_then(|v| v.as_number()).unwrap();
                assert!((cached - 10_123.456_789).abs() < 1e-6);
            },
            other => panic!("expected a formula, got {:?}", other),
        }
    }

    #[test]
    fn test_chart_covers_every_year() {
        let mut workbook = Workbook::new();
        build(&mut workbook, &SAMPLE).unwrap();
        let chart = &workbook.sheet(0).unwrap().charts()[0];
        assert_eq!(chart.kind(), ChartKind::LineNormal);
        assert_eq!(chart.source().last, (4, 1));
        assert_eq!(chart.source().sheet.as_deref(), Some("Sheet1"));
    }

    #[test]
    fn test_zero_term_is_invalid() {
        let (_dir, config) = sandbox();
        overwrite_data(
            &config,
            INPUT,
            r#"{"initial_amount": 1000, "return_rate": 0.1, "term": 0}"#,
        );
        assert!(matches!(generate(&config), Err(Error::Input(InputError::Invalid { .. }))));
    }

    #[test]
    fn test_generate_embeds_chart() {
        let (_dir, config) = sandbox();
        let output = generate(&config).unwrap();
        let file = std::fs::File::open(output).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        assert!(archive.by_name("xl/charts/chart1.xml").is_ok());
    }
}
