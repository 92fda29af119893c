//! One slide with a chart whose data comes from a workbook (`.pptx`).
use std::path::PathBuf;

use log::debug;

use crate::builders::{TextStyle, add_shape_text};
use crate::common::Rgb;
use crate::common::unit::mm_to_emu;
use crate::config::RunConfig;
use crate::error::Result;
use crate::ooxml::OoxmlError;
use crate::ooxml::charts::{Chart, ChartKind, GridValue, LegendPosition};
use crate::ooxml::docx::Justification;
use crate::ooxml::pptx::{DEFAULT_SLIDE_HEIGHT, Presentation, Slide, WIDESCREEN_SLIDE_WIDTH};
use crate::session::{DocumentKind, DocumentSession};

pub const INPUT: &str = "chart_data.xlsx";

const BACKGROUND: Rgb = Rgb::new(255, 244, 240);
const TEXT_COLOR: Rgb = Rgb::new(115, 81, 68);
const FONT: &str = "Tahoma";

const TITLE: &str = "Price Type Report";
const SUMMARY: &str = "This is an overview of price types. As we can see, May was the price peak, \
                       but even in June the price went down, the annual upward trend persists.";

pub fn generate(config: &RunConfig) -> Result<PathBuf> {
    let grid = read_grid(config)?;
    let mut session = DocumentSession::create(DocumentKind::Presentation);
    build(session.presentation_mut()?, &grid)?;
    super::finish(session, config)
}

/// Values of the first sheet's used range. The workbook session is closed
/// before the presentation is created.
fn read_grid(config: &RunConfig) -> Result<Vec<Vec<GridValue>>> {
    let mut source = DocumentSession::open(config.doc_file(INPUT))?;
    let editor = source.editor_mut()?;
    let sheet = editor
        .sheet_names()
        .first()
        .map(|name| name.to_string())
        .ok_or_else(|| OoxmlError::PartNotFound("worksheet".to_string()))?;
    let used = editor.used_range(&sheet)?;
    debug!("{}: {} rows of chart data", sheet, used.values.len());
    let grid = used
        .values
        .iter()
        .map(|row| row.iter().map(|value| value.to_grid_value()).collect())
        .collect();
    source.close();
    Ok(grid)
}

/// Title, summary and a stacked line chart on the first slide. The grid's
/// first row names the series and its first column labels the categories.
pub fn build(pres: &mut Presentation, grid: &[Vec<GridValue>]) -> Result<()> {
    pres.set_slide_size(WIDESCREEN_SLIDE_WIDTH, DEFAULT_SLIDE_HEIGHT);
    let slide = pres.slide_mut(0)?;
    slide.remove_all_objects().set_background_color(BACKGROUND);

    add_text_box(slide, (20.0, 20.0, 300.0, 20.0), TITLE, 80, Justification::Center)?;
    add_text_box(slide, (210.0, 50.0, 120.0, 80.0), SUMMARY, 42, Justification::Left)?;

    let mut chart = Chart::from_grid(ChartKind::LineStacked, grid, false)?;
    chart
        .set_style(24)
        .set_font_size(12)
        .set_legend(Some(LegendPosition::Top));
    slide.add_chart(chart, mm_to_emu(20.0), mm_to_emu(50.0), mm_to_emu(180.0), mm_to_emu(100.0));
    Ok(())
}

/// A borderless text box at `(x, y, width, height)` millimetres, with the
/// text followed by a line break.
fn add_text_box(
    slide: &mut Slide,
    (x, y, width, height): (f64, f64, f64, f64),
    text: &str,
    size: u32,
    justification: Justification,
) -> Result<()> {
    let shape = slide.add_text_shape(mm_to_emu(x), mm_to_emu(y), mm_to_emu(width), mm_to_emu(height));
    let style = TextStyle::sized(size)
        .with_font(FONT)
        .with_color(TEXT_COLOR)
        .with_justification(justification);
    add_shape_text(shape.paragraph_mut(0)?, text, &style).add_line_break();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::{SlideBackground, SlideObject};
    use crate::reports::testing::sandbox;

    fn grid() -> Vec<Vec<GridValue>> {
        let text = |s: &str| GridValue::Text(s.to_string());
        vec![
            vec![GridValue::Empty, text("Type A"), text("Type B")],
            vec![text("Jan"), GridValue::Number(10.0), GridValue::Number(12.0)],
            vec![text("Feb"), GridValue::Number(14.0), GridValue::Number(11.0)],
            vec![text("Mar"), GridValue::Number(13.0), GridValue::Number(17.0)],
        ]
    }

    #[test]
    fn test_series_per_column() {
        let mut pres = Presentation::new();
        build(&mut pres, &grid()).unwrap();
        let slide = pres.slide(0).unwrap();
        assert_eq!(slide.background(), Some(&SlideBackground::Color(BACKGROUND)));

        let chart = slide
            .objects()
            .iter()
            .find_map(|object| match object {
                SlideObject::Chart(frame) => Some(frame.chart()),
                _ => None,
            })
            .unwrap();
        assert_eq!(chart.kind, ChartKind::LineStacked);
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[1].name.as_deref(), Some("Type B"));
        assert_eq!(
            chart.series[0].categories.as_ref().unwrap().values,
            ["Jan", "Feb", "Mar"]
        );
        assert_eq!(chart.series[1].values.values[2], Some(17.0));
        assert_eq!(chart.legend, Some(LegendPosition::Top));
        assert_eq!(chart.style, Some(24));
    }

    #[test]
    fn test_title_and_summary() {
        let mut pres = Presentation::new();
        build(&mut pres, &grid()).unwrap();
        let texts: Vec<String> = pres.slide(0).unwrap().shapes().map(|s| s.text()).collect();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].starts_with(TITLE));
        assert!(texts[1].contains("annual upward trend"));
    }

    #[test]
    fn test_generate_from_fixture() {
        let (_dir, config) = sandbox();
        let output = generate(&config).unwrap();
        let file = std::fs::File::open(output).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        assert!(archive.by_name("ppt/charts/chart1.xml").is_ok());
    }

    #[test]
    fn test_missing_workbook() {
        let (_dir, config) = sandbox();
        std::fs::remove_file(config.doc_file(INPUT)).unwrap();
        assert!(generate(&config).is_err());
    }
}
