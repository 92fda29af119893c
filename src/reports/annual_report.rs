//! Annual financial report (`.docx`).
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Number;

use crate::builders::{
    ChartSpec, TableStyle, TextStyle, add_chart, add_list, add_text, create_numbering, create_table,
    fill_table_body, fill_table_headers,
};
use crate::config::RunConfig;
use crate::error::Result;
use crate::input::{Validate, load_json};
use crate::ooxml::charts::ChartKind;
use crate::ooxml::docx::{Document, Justification, NumberingKind, Paragraph};
use crate::session::{DocumentKind, DocumentSession};

pub const INPUT: &str = "financial_system_response.json";

const QUARTERS: [&str; 4] = ["Q1", "Q2", "Q3", "Q4"];

#[derive(Debug, Clone, Deserialize)]
pub struct FinancialReport {
    pub year: i32,
    pub financials: Financials,
    pub achievements: Vec<String>,
    pub plans: Plans,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Financials {
    pub quarterly_data: Vec<Quarter>,
    pub r_d_expenses: Number,
    pub marketing_expenses: Number,
    pub total_expenses: Number,
    pub total_revenue: Number,
    pub net_profit: Number,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Quarter {
    pub revenue: f64,
    pub expenses: f64,
    pub net_profit: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Plans {
    pub projects: Vec<Project>,
    pub financial_goals: Vec<FinancialGoal>,
    pub marketing_initiatives: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub name: String,
    pub deadline: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FinancialGoal {
    pub goal: String,
    pub value: String,
}

impl Validate for FinancialReport {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.financials.quarterly_data.len() > QUARTERS.len() {
            return Err(format!(
                "{} quarters of data in one year",
                self.financials.quarterly_data.len()
            ));
        }
        Ok(())
    }
}

pub fn generate(config: &RunConfig) -> Result<PathBuf> {
    let report: FinancialReport = load_json(config.data_file(INPUT))?;
    let mut session = DocumentSession::create(DocumentKind::Word);
    build(session.word_mut()?, &report)?;
    super::finish(session, config)
}

fn push_text(document: &mut Document, text: &str, style: &TextStyle) {
    add_text(document.push_paragraph(Paragraph::new()), text, style);
}

fn push_table<S: AsRef<str>>(document: &mut Document, headers: &[&str], rows: &[Vec<S>]) -> Result<()> {
    let table = create_table(document, rows.len() + 1, headers.len(), &TableStyle::report())?;
    fill_table_headers(table, headers, &TextStyle::sized(22).bold())?;
    fill_table_body(table, rows, 1, &TextStyle::sized(22))?;
    Ok(())
}

/// Chart value of a total; the tables print the number as sent.
fn amount(value: &Number) -> f64 {
    value.as_f64().unwrap_or_default()
}

pub fn build(document: &mut Document, report: &FinancialReport) -> Result<()> {
    let section = TextStyle::sized(32).bold();
    let caption = TextStyle::sized(24);
    let financials = &report.financials;

    add_text(
        document.paragraph_mut(0)?,
        &format!("Annual Report for {}", report.year),
        &TextStyle::sized(44).bold().with_justification(Justification::Center),
    );

    push_text(document, "Financial performance", &section);
    push_text(document, "Quarterly data:", &caption);
    let quarters = &financials.quarterly_data;
    let performance = ChartSpec::new(ChartKind::LineNormal)
        .series("Revenue", quarters.iter().map(|q| q.revenue).collect())
        .series("Expenses", quarters.iter().map(|q| q.expenses).collect())
        .series("Net Profit", quarters.iter().map(|q| q.net_profit).collect())
        .categories(&QUARTERS);
    add_chart(document.push_paragraph(Paragraph::new()), &performance)?;

    push_text(document, "Expenses:", &caption);
    let research = amount(&financials.r_d_expenses);
    let marketing = amount(&financials.marketing_expenses);
    let other = amount(&financials.total_expenses) - (research + marketing);
    let expenses = ChartSpec::new(ChartKind::Pie)
        .series("", vec![research, marketing, other])
        .categories(&["Research and Development", "Marketing", "Other"]);
    add_chart(document.push_paragraph(Paragraph::new()), &expenses)?;

    push_text(document, "Year total numbers:", &caption);
    push_table(
        document,
        &["Total revenue", "Total expenses", "Total net profit"],
        &[vec![
            financials.total_revenue.to_string(),
            financials.total_expenses.to_string(),
            financials.net_profit.to_string(),
        ]],
    )?;

    push_text(document, "Achievements this year", &section);
    let numbered = create_numbering(document, NumberingKind::Numbered);
    add_list(document, numbered, &report.achievements, 0, &TextStyle::sized(22))?;

    push_text(document, "Plans for the next year", &section);
    push_text(document, "Projects:", &caption);
    let projects: Vec<Vec<&str>> = report
        .plans
        .projects
        .iter()
        .map(|p| vec![p.name.as_str(), p.deadline.as_str()])
        .collect();
    push_table(document, &["Name", "Deadline"], &projects)?;

    push_text(document, "Financial goals:", &caption);
    let goals: Vec<Vec<&str>> = report
        .plans
        .financial_goals
        .iter()
        .map(|g| vec![g.goal.as_str(), g.value.as_str()])
        .collect();
    push_table(document, &["Goal", "Value"], &goals)?;

    push_text(document, "Marketing initiatives:", &caption);
    let bullets = create_numbering(document, NumberingKind::Bullet);
    add_list(
        document,
        bullets,
        &report.plans.marketing_initiatives,
        0,
        &TextStyle::sized(22),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::input::InputError;
    use crate::ooxml::docx::DocxReader;
    use crate::reports::testing::{overwrite_data, sandbox};

    fn sample() -> FinancialReport {
        serde_json::from_str(
            r#"{
                "year": 2024,
                "financials": {
                    "quarterly_data": [
                        {"revenue": 300000, "expenses": 200000, "net_profit": 100000},
                        {"revenue": 350000, "expenses": 210000, "net_profit": 140000}
                    ],
                    "r_d_expenses": 150000,
                    "marketing_expenses": 90000,
                    "total_expenses": 410000,
                    "total_revenue": 650000,
                    "net_profit": 240000
                },
                "achievements": ["Opened a second office"],
                "plans": {
                    "projects": [{"name": "Mobile app", "deadline": "Q3 2025"}],
                    "financial_goals": [{"goal": "Revenue", "value": "1M"}],
                    "marketing_initiatives": ["Trade fairs"]
                }
            }"#,
        )
        .unwrap()
    }

    fn list_items(document: &Document) -> usize {
        document
            .elements()
            .iter()
            .filter_map(|e| e.as_paragraph())
            .filter(|p| p.properties().numbering.is_some())
            .count()
    }

    #[test]
    fn test_layout() {
        let mut document = Document::new();
        build(&mut document, &sample()).unwrap();
        let texts = document.paragraph_texts();
        assert_eq!(texts[0], "Annual Report for 2024");
        assert!(texts.contains(&"Achievements this year".to_string()));
        assert_eq!(document.tables().count(), 3);
        assert_eq!(list_items(&document), 2);

        let totals = document.tables().next().unwrap();
        assert_eq!(totals.cell_texts()[1], vec!["650000", "410000", "240000"]);
        assert_eq!(totals.borders().map(|b| b.size), Some(4));
    }

    #[test]
    fn test_empty_achievements() {
        let mut report = sample();
        report.achievements.clear();
        report.plans.marketing_initiatives.clear();
        let mut document = Document::new();
        build(&mut document, &report).unwrap();
        assert_eq!(list_items(&document), 0);
        assert_eq!(document.numberings().len(), 2);
    }

    #[test]
    fn test_total_revenue_survives_reopen() {
        let (_dir, config) = sandbox();
        let mut text = std::fs::read_to_string(config.data_file(INPUT)).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&text).unwrap();
        value["year"] = 2024.into();
        value["financials"]["total_revenue"] = 7_654_321.into();
        text = value.to_string();
        overwrite_data(&config, INPUT, &text);

        let output = generate(&config).unwrap();
        let tables = DocxReader::open(&output).unwrap().tables().unwrap();
        let totals = tables
            .iter()
            .find(|t| t[0].first().map(String::as_str) == Some("Total revenue"))
            .unwrap();
        assert_eq!(totals[0], vec!["Total revenue", "Total expenses", "Total net profit"]);
        assert_eq!(totals[1][0], "7654321");
    }

    #[test]
    fn test_decimal_and_wide_totals_kept_verbatim() {
        let (_dir, config) = sandbox();
        let text = std::fs::read_to_string(config.data_file(INPUT)).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&text).unwrap();
        value["financials"]["total_revenue"] = serde_json::json!(5750000.5);
        value["financials"]["total_expenses"] = serde_json::json!(9_007_199_254_740_993_u64);
        overwrite_data(&config, INPUT, &value.to_string());

        let output = generate(&config).unwrap();
        let tables = DocxReader::open(&output).unwrap().tables().unwrap();
        let totals = tables
            .iter()
            .find(|t| t[0].first().map(String::as_str) == Some("Total revenue"))
            .unwrap();
        assert_eq!(totals[1][0], "5750000.5");
        assert_eq!(totals[1][1], "9007199254740993");
    }

    #[test]
    fn test_missing_field_fails_without_output() {
        let (_dir, config) = sandbox();
        overwrite_data(&config, INPUT, r#"{"year": 2024, "achievements": []}"#);
        let err = generate(&config).unwrap_err();
        assert!(matches!(
            err,
            Error::Input(InputError::MissingField { ref field, .. }) if field == "financials"
        ));
        assert!(!config.output_file("docx").exists());
    }

    #[test]
    fn test_same_input_same_bytes() {
        let (_dir, config) = sandbox();
        let first = std::fs::read(generate(&config).unwrap()).unwrap();
        let second = std::fs::read(generate(&config).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
