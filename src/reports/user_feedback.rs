//! User feedback report: per-question averages, every comment, and three
//! charts over them (`.xlsx`).
use std::path::PathBuf;

use serde::Deserialize;

use crate::common::Rgb;
use crate::common::unit::mm_to_emu;
use crate::config::RunConfig;
use crate::error::Result;
use crate::input::{Validate, load_json};
use crate::ooxml::charts::ChartKind;
use crate::ooxml::xlsx::{CellValue, HorizontalAlign, LineStyle, VerticalAlign, Workbook, Worksheet};
use crate::session::{DocumentKind, DocumentSession};

pub const INPUT: &str = "user_feedback_data.json";

const ORANGE: Rgb = Rgb::new(237, 125, 49);
const GREY: Rgb = Rgb::grey(128);
const BLUE: Rgb = Rgb::new(91, 155, 213);

/// Averages at or below this mark the whole response orange.
const LOW_RATING: f64 = 2.0;

const CHART_WIDTH_MM: f64 = 135.38;
const CHART_HEIGHT_MM: f64 = 81.28;

/// One submitted survey.
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    pub date: String,
    pub feedback: Vec<Feedback>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feedback {
    pub question: String,
    pub answer: Answer,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Answer {
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct FeedbackData(pub Vec<Response>);

impl Validate for FeedbackData {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.0.is_empty() {
            return Err("no responses".to_string());
        }
        if let Some(response) = self.0.iter().find(|r| r.feedback.is_empty()) {
            return Err(format!("response of {} has no answers", response.date));
        }
        Ok(())
    }
}

fn mean(ratings: &[i64]) -> f64 {
    ratings.iter().sum::<i64>() as f64 / ratings.len() as f64
}

fn round_to(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Ratings grouped by `key`, in order of first appearance.
fn group_ratings<'a>(data: &'a FeedbackData, key: impl Fn(&'a Response, &'a Feedback) -> &'a str) -> Vec<(&'a str, Vec<i64>)> {
    let mut groups: Vec<(&str, Vec<i64>)> = Vec::new();
    for response in &data.0 {
        for item in &response.feedback {
            let name = key(response, item);
            match groups.iter_mut().find(|(n, _)| *n == name) {
                Some((_, ratings)) => ratings.push(item.answer.rating),
                None => groups.push((name, vec![item.answer.rating])),
            }
        }
    }
    groups
}

pub fn generate(config: &RunConfig) -> Result<PathBuf> {
    let data: FeedbackData = load_json(config.data_file(INPUT))?;
    let mut session = DocumentSession::create(DocumentKind::Spreadsheet);
    build(session.workbook_mut()?, &data, config.number_format.average_decimals)?;
    super::finish(session, config)
}

fn set_table_style(sheet: &mut Worksheet, first: (u32, u32), last: (u32, u32)) {
    let mut range = sheet.range_between(first, last);
    range
        .set_row_height(24.0)
        .set_align_vertical(VerticalAlign::Center)
        .set_borders(LineStyle::Thin, Rgb::BLACK);
}

/// Fill the `Average` sheet; returns the number of rows written, header included.
fn fill_averages(sheet: &mut Worksheet, data: &FeedbackData, decimals: usize) -> u32 {
    let mut rows = vec![vec![
        CellValue::text("Question"),
        CellValue::text("Average Rating"),
        CellValue::text("Number of Responses"),
    ]];
    for (question, ratings) in group_ratings(data, |_, item| item.question.as_str()) {
        rows.push(vec![
            CellValue::text(question),
            CellValue::Number(round_to(mean(&ratings), decimals)),
            CellValue::Number(ratings.len() as f64),
        ]);
    }

    let last = (rows.len() as u32 - 1, 2);
    set_table_style(sheet, (0, 0), last);
    sheet.range_between((1, 1), last).set_align_horizontal(HorizontalAlign::Center);
    sheet.range_between((0, 0), (0, 2)).set_bold(true);
    sheet.range_between((0, 0), last).set_values(&rows).autofit(false, true);
    rows.len() as u32
}

/// Fill the `Comments` sheet; returns the number of rows written, header included.
fn fill_comments(sheet: &mut Worksheet, data: &FeedbackData, decimals: usize) -> u32 {
    let headers = ["Date", "Question", "Comment", "Rating", "Average User Rating"];
    let last_col = headers.len() as u32 - 1;
    let header_row: Vec<CellValue> = headers.iter().map(|h| CellValue::text(*h)).collect();
    sheet
        .range_between((0, 0), (0, last_col))
        .set_values(&[header_row])
        .set_bold(true);

    let mut row = 1u32;
    for response in &data.0 {
        let answers: Vec<Vec<CellValue>> = response
            .feedback
            .iter()
            .map(|item| {
                vec![
                    CellValue::text(item.question.as_str()),
                    CellValue::text(item.answer.comment.as_str()),
                    CellValue::Number(item.answer.rating as f64),
                ]
            })
            .collect();
        let ratings: Vec<i64> = response.feedback.iter().map(|item| item.answer.rating).collect();
        let exact = mean(&ratings);
        let average = round_to(exact, decimals);
        let end = row + answers.len() as u32 - 1;

        sheet
            .range_between((row, 0), (end, 0))
            .merge()
            .set_value(CellValue::text(response.date.as_str()));
        sheet.range_between((row, 1), (end, last_col - 1)).set_values(&answers);
        sheet
            .range_between((row, last_col), (end, last_col))
            .merge()
            .set_value(average);
        // Highlighting compares the unrounded mean.
        if exact <= LOW_RATING {
            sheet.range_between((row, 0), (end, last_col)).set_fill_color(ORANGE);
        }
        row = end + 1;
    }

    let last = (row - 1, last_col);
    set_table_style(sheet, (0, 0), last);
    sheet
        .range_between((1, last_col - 1), last)
        .set_align_horizontal(HorizontalAlign::Center);
    sheet.range_between((0, 0), last).autofit(false, true);
    row
}

fn add_charts(sheet: &mut Worksheet, data: &FeedbackData, average_rows: u32, comment_rows: u32, decimals: usize) -> Result<()> {
    let (width, height) = (mm_to_emu(CHART_WIDTH_MM), mm_to_emu(CHART_HEIGHT_MM));

    sheet
        .add_chart(&format!("Average!$A$2:$B${}", average_rows), false, ChartKind::Bar, width, height)?
        .set_position(0, 0, 0, 0)
        .set_title("Average ratings", 16);

    let mut daily = vec![vec![CellValue::text("Date"), CellValue::text("Rating")]];
    for (date, ratings) in group_ratings(data, |response, _| response.date.as_str()) {
        daily.push(vec![CellValue::text(date), CellValue::Number(round_to(mean(&ratings), decimals))]);
    }
    let daily_range = format!("$E$1:$F${}", daily.len());
    sheet.range(&daily_range)?.set_values(&daily);
    let scatter = sheet.add_chart(&format!("Charts!{}", daily_range), false, ChartKind::Scatter, width, height)?;
    scatter
        .set_position(0, 0, 18, 0)
        .set_series_fill(0, BLUE)
        .set_series_outline(0, GREY)
        .set_title("Dynamics of the average ratings", 16);
    scatter.axes_mut().major_horizontal_gridlines = false;

    // Cached counts mirror what the COUNTIF formulas evaluate to.
    let ratings: Vec<i64> = data.0.iter().flat_map(|r| r.feedback.iter().map(|f| f.answer.rating)).collect();
    let count = |pred: fn(i64) -> bool| ratings.iter().filter(|&&r| pred(r)).count() as f64;
    let source = format!("Comments!$D$1:$D${}", comment_rows);
    sheet.range("$A$1:$C$2")?.set_values(&[
        vec![CellValue::text("Negative"), CellValue::text("Neutral"), CellValue::text("Positive")],
        vec![
            CellValue::formula(&format!("COUNTIF({}, \"<=2\")", source), Some(count(|r| r <= 2))),
            CellValue::formula(&format!("COUNTIF({}, \"=3\")", source), Some(count(|r| r == 3))),
            CellValue::formula(&format!("COUNTIF({}, \">=4\")", source), Some(count(|r| r >= 4))),
        ],
    ]);
    sheet
        .add_chart("Charts!$A$1:$C$2", true, ChartKind::Pie, width, height)?
        .set_position(9, 0, 0, 0)
        .set_title("Shares of reviews", 16)
        .set_point_fill(0, 0, ORANGE)
        .set_point_fill(0, 1, GREY)
        .set_point_fill(0, 2, BLUE)
        .set_series_outline(0, Rgb::WHITE);
    Ok(())
}

pub fn build(workbook: &mut Workbook, data: &FeedbackData, decimals: usize) -> Result<()> {
    let average = workbook.sheet_mut(0)?;
    average.set_name("Average");
    let average_rows = fill_averages(average, data, decimals);

    let comment_rows = fill_comments(workbook.add_sheet("Comments")?, data, decimals);
    add_charts(workbook.add_sheet("Charts")?, data, average_rows, comment_rows, decimals)?;

    workbook.set_active(0)?;
    Ok(())
}
