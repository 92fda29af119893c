//! Employment agreement, exported as PDF.
use std::path::PathBuf;

use serde::Deserialize;

use crate::builders::{TableStyle, TextStyle, add_text, create_numbering, create_table};
use crate::config::RunConfig;
use crate::error::Result;
use crate::input::{Validate, load_json};
use crate::ooxml::docx::{Cell, Document, Justification, LevelSuffix, ListFormat, NumberingKind, Paragraph};
use crate::session::{DocumentKind, DocumentSession};

use super::Scalar;

pub const INPUT: &str = "employment_agreement_response.json";

/// Twips
const DESCRIPTION_INDENT: i32 = 400;

const SIGNATURE_LINES: [&str; 3] = [
    "Name: __________________________",
    "Signature: _______________________",
    "Date: ___________________________",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Agreement {
    pub date: String,
    pub employer: Employer,
    pub employee: Employee,
    pub position_and_duties: PositionAndDuties,
    pub compensation: Compensation,
    pub probationary_period: ProbationaryPeriod,
    pub work_conditions: WorkConditions,
    pub termination: Termination,
    pub governing_law: GoverningLaw,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Employer {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Employee {
    #[serde(alias = "name")]
    pub full_name: String,
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PositionAndDuties {
    pub job_title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Compensation {
    pub salary: Scalar,
    pub currency: String,
    pub frequency: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbationaryPeriod {
    pub duration: String,
    pub terminate: Scalar,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkConditions {
    pub working_hours: String,
    pub work_schedule: String,
    pub benefits: Vec<String>,
    pub other_terms: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Termination {
    pub notice_period: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoverningLaw {
    pub jurisdiction: String,
}

impl Validate for Agreement {}

pub fn generate(config: &RunConfig) -> Result<PathBuf> {
    let agreement: Agreement = load_json(config.data_file(INPUT))?;
    let mut session = DocumentSession::create(DocumentKind::Pdf);
    build(session.word_mut()?, &agreement)?;
    super::finish(session, config)
}

fn push_section(document: &mut Document, title: &str, num_id: u32, description: &str) {
    let heading = document.push_paragraph(Paragraph::new());
    add_text(heading, title, &TextStyle::new().bold());
    heading.set_numbering(num_id, 0).set_spacing_after(50);
    if !description.is_empty() {
        push_description(document, description);
    }
}

fn push_description<'d>(document: &'d mut Document, text: &str) -> &'d mut Paragraph {
    let paragraph = document.push_paragraph(Paragraph::with_text(text));
    paragraph.set_indent_first_line(DESCRIPTION_INDENT);
    paragraph
}

fn push_condition(document: &mut Document, num_id: u32, title: &str, text: &str, spaced: bool) {
    let paragraph = document.push_paragraph(Paragraph::new());
    paragraph.set_numbering(num_id, 0).set_justification(Justification::Left);
    if spaced {
        paragraph.set_spacing_after(20);
    }
    add_text(paragraph, &format!("{}: ", title), &TextStyle::new().bold());
    paragraph.add_text(text);
}

fn fill_signer(cell: &mut Cell, title: &str) {
    let paragraph = cell.first_paragraph();
    paragraph.set_justification(Justification::Left);
    add_text(paragraph, title, &TextStyle::new().bold());
    for line in SIGNATURE_LINES {
        paragraph.add_line_break();
        paragraph.add_text(line);
    }
}

pub fn build(document: &mut Document, agreement: &Agreement) -> Result<()> {
    document
        .set_default_justification(Justification::Both)
        .set_default_font_size(24)
        .set_default_font_family("Times New Roman");

    add_text(
        document.paragraph_mut(0)?,
        "EMPLOYMENT AGREEMENT",
        &TextStyle::sized(28).bold(),
    );
    document
        .push_paragraph(Paragraph::with_text(&format!(
            "This Employment Agreement (\"Agreement\") is made and entered into on {} by and between:",
            agreement.date
        )))
        .set_spacing_after(50);

    let participants = document.push_paragraph(Paragraph::new());
    participants.set_justification(Justification::Left);
    add_text(participants, "Employer: ", &TextStyle::new().bold());
    participants.add_text(&format!(
        "{}, located at {}.",
        agreement.employer.name, agreement.employer.address
    ));
    participants.add_line_break();
    add_text(participants, "Employee: ", &TextStyle::new().bold());
    participants.add_text(&format!(
        "{}, residing at {}.",
        agreement.employee.full_name, agreement.employee.address
    ));
    document.push_paragraph(Paragraph::with_text(
        "The parties agree to the following terms and conditions:",
    ));

    let sections = create_numbering(document, NumberingKind::Numbered);
    document
        .numbering_mut(sections)?
        .level_mut(0)?
        .set_custom_type(ListFormat::Decimal, "%1.", Justification::Left)
        .set_suffix(LevelSuffix::Space);

    push_section(
        document,
        "POSITION AND DUTIES",
        sections,
        &format!(
            "The Employee is hired as {}. The Employee shall perform their duties as outlined by the Employer and \
             comply with all applicable policies and guidelines.",
            agreement.position_and_duties.job_title
        ),
    );

    let pay = &agreement.compensation;
    push_section(
        document,
        "COMPENSATION",
        sections,
        &format!(
            "The Employee will receive a salary of {} {} {} ({}), payable in accordance with the Employer's payroll \
             schedule and subject to lawful deductions.",
            pay.salary, pay.currency, pay.frequency, pay.kind
        ),
    );

    let probation = &agreement.probationary_period;
    push_section(
        document,
        "PROBATIONARY PERIOD",
        sections,
        &format!(
            "The Employee will serve a probationary period of {}. During this period, the Employer may terminate \
             this Agreement with {} days' notice if performance is deemed unsatisfactory.",
            probation.duration, probation.terminate
        ),
    );

    push_section(document, "WORK CONDITIONS", sections, "");
    push_description(document, "The following terms apply to the Employee's working conditions:").set_spacing_after(50);
    let bullets = create_numbering(document, NumberingKind::Bullet);
    let conditions = &agreement.work_conditions;
    push_condition(document, bullets, "Working Hours", &conditions.working_hours, true);
    push_condition(document, bullets, "Work Schedule", &conditions.work_schedule, true);
    push_condition(document, bullets, "Benefits", &conditions.benefits.join(", "), true);
    push_condition(document, bullets, "Other terms", &conditions.other_terms.join(", "), false);

    push_section(
        document,
        "TERMINATION",
        sections,
        &format!(
            "Either party may terminate this Agreement by providing {} written notice. The Employer reserves the \
             right to terminate employment immediately for cause, including but not limited to misconduct or breach \
             of Agreement.",
            agreement.termination.notice_period
        ),
    );
    push_section(
        document,
        "GOVERNING LAW",
        sections,
        &format!(
            "This Agreement is governed by the laws of {}, and any disputes arising under this Agreement will be \
             resolved in accordance with these laws.",
            agreement.governing_law.jurisdiction
        ),
    );
    push_section(
        document,
        "ENTIRE AGREEMENT",
        sections,
        "This document constitutes the entire Agreement between the parties and supersedes all prior agreements. \
         Any amendments must be made in writing and signed by both parties.",
    );

    let table = create_table(document, 2, 2, &TableStyle::default().without_borders())?;
    add_text(
        table.merge_cells(0, 0..=1)?.first_paragraph(),
        "SIGNATURES",
        &TextStyle::sized(24).bold(),
    );
    fill_signer(table.cell(1, 0)?, "Employer");
    fill_signer(table.cell(1, 1)?, "Employee");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::PdfExporter;
    use crate::reports::testing::sandbox;

    fn sample() -> Agreement {
        serde_json::from_str(
            r#"{
                "date": "January 15, 2025",
                "employer": {"name": "Greenfield Labs", "address": "22 Oak Avenue"},
                "employee": {"name": "Casey Park", "address": "9 Pine Street"},
                "position_and_duties": {"job_title": "Software Engineer"},
                "compensation": {"salary": 85000, "currency": "USD", "frequency": "per year", "type": "gross"},
                "probationary_period": {"duration": "3 months", "terminate": 7},
                "work_conditions": {
                    "working_hours": "9:00 - 18:00",
                    "work_schedule": "Monday to Friday",
                    "benefits": ["Health insurance", "Gym membership"],
                    "other_terms": ["Remote work on Fridays"]
                },
                "termination": {"notice_period": "30 days"},
                "governing_law": {"jurisdiction": "the State of New York"}
            }"#,
        )
        .unwrap()
    }

    fn paragraph<'d>(document: &'d Document, prefix: &str) -> &'d Paragraph {
        document
            .elements()
            .iter()
            .filter_map(|e| e.as_paragraph())
            .find(|p| p.text().starts_with(prefix))
            .unwrap()
    }

    #[test]
    fn test_sections_are_numbered() {
        let mut document = Document::new();
        build(&mut document, &sample()).unwrap();
        let sections = document.numberings()[0].num_id();
        let titles: Vec<String> = document
            .elements()
            .iter()
            .filter_map(|e| e.as_paragraph())
            .filter(|p| p.properties().numbering.map(|n| n.num_id) == Some(sections))
            .map(Paragraph::text)
            .collect();
        assert_eq!(
            titles,
            vec![
                "POSITION AND DUTIES",
                "COMPENSATION",
                "PROBATIONARY PERIOD",
                "WORK CONDITIONS",
                "TERMINATION",
                "GOVERNING LAW",
                "ENTIRE AGREEMENT",
            ]
        );
        assert_eq!(document.defaults().justification, Some(Justification::Both));
    }

    #[test]
    fn test_payload_values_reach_text() {
        let mut document = Document::new();
        build(&mut document, &sample()).unwrap();
        let salary = paragraph(&document, "The Employee will receive");
        assert!(salary.text().contains("85000 USD per year (gross)"));
        assert_eq!(salary.properties().indent_first_line, Some(DESCRIPTION_INDENT));
        assert!(paragraph(&document, "The Employee will serve").text().contains("7 days' notice"));
        assert_eq!(
            paragraph(&document, "Employer: ").text(),
            "Employer: Greenfield Labs, located at 22 Oak Avenue.\nEmployee: Casey Park, residing at 9 Pine Street."
        );
        let benefits = paragraph(&document, "Benefits: ");
        assert_eq!(benefits.text(), "Benefits: Health insurance, Gym membership");
        assert_eq!(paragraph(&document, "Other terms: ").properties().spacing_after, None);
    }

    #[test]
    fn test_signature_table() {
        let mut document = Document::new();
        build(&mut document, &sample()).unwrap();
        let table = document.tables().next().unwrap();
        assert!(table.borders().is_none());
        assert_eq!(table.rows()[0].cells()[0].grid_span(), 2);
        let employer = table.rows()[1].cells()[0].text();
        assert!(employer.starts_with("Employer\nName: "));
        assert!(employer.ends_with("Date: ___________________________"));
    }

    #[test]
    fn test_generate_writes_pdf() {
        let (_dir, config) = sandbox();
        let output = generate(&config).unwrap();
        assert!(std::fs::read(&output).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_layout_starts_with_title() {
        let mut document = Document::new();
        build(&mut document, &sample()).unwrap();
        let layout = PdfExporter::new(&document).layout().unwrap();
        assert!(layout.pages[0].texts().next().unwrap().starts_with("EMPLOYMENT"));
    }
}
