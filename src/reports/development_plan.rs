//! Employee development plan (`.docx`).
use std::path::PathBuf;

use serde::Deserialize;

use crate::builders::{
    TableStyle, TextStyle, add_list, add_text, create_numbering, create_table, fill_table_body, fill_table_headers,
};
use crate::config::RunConfig;
use crate::error::Result;
use crate::input::{Validate, load_json};
use crate::ooxml::docx::{Document, Justification, NumberingKind, Paragraph};
use crate::session::{DocumentKind, DocumentSession};

pub const INPUT: &str = "hrms_response.json";

/// Width of the handwritten feedback line.
const FEEDBACK_LINE: usize = 280;

#[derive(Debug, Clone, Deserialize)]
pub struct DevelopmentPlan {
    pub employee: Employee,
    pub competencies: Competencies,
    pub development_areas: Vec<String>,
    pub goals_next_year: Vec<String>,
    pub resources: Vec<LearningResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Employee {
    pub name: String,
    pub position: String,
    pub department: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Competencies {
    pub technical_skills: Vec<Skill>,
    pub soft_skills: Vec<Skill>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Skill {
    pub name: String,
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LearningResource {
    pub name: String,
    pub provider: String,
    pub duration: String,
}

impl Validate for DevelopmentPlan {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.employee.name.trim().is_empty() {
            return Err("employee name is empty".to_string());
        }
        Ok(())
    }
}

pub fn generate(config: &RunConfig) -> Result<PathBuf> {
    let plan: DevelopmentPlan = load_json(config.data_file(INPUT))?;
    let mut session = DocumentSession::create(DocumentKind::Word);
    build(session.word_mut()?, &plan)?;
    super::finish(session, config)
}

fn push_text(document: &mut Document, text: &str, style: &TextStyle) {
    add_text(document.push_paragraph(Paragraph::new()), text, style);
}

fn push_skills(document: &mut Document, skills: &[Skill]) -> Result<()> {
    let table = create_table(document, skills.len() + 1, 2, &TableStyle::report())?;
    fill_table_headers(table, &["Skill", "Level"], &TextStyle::sized(22).bold())?;
    let rows: Vec<Vec<&str>> = skills.iter().map(|s| vec![s.name.as_str(), s.level.as_str()]).collect();
    fill_table_body(table, &rows, 1, &TextStyle::sized(22))?;
    Ok(())
}

pub fn build(document: &mut Document, plan: &DevelopmentPlan) -> Result<()> {
    let section = TextStyle::sized(32).bold();
    let caption = TextStyle::sized(24);
    let item = TextStyle::sized(22);

    let title = document.paragraph_mut(0)?;
    add_text(
        title,
        "Employee Development Plan for 2024",
        &TextStyle::sized(48).bold().with_justification(Justification::Center),
    );
    title.set_spacing_before(5000).set_spacing_after(500);

    push_text(
        document,
        &plan.employee.name,
        &TextStyle::sized(36).with_justification(Justification::Center),
    );
    let info = format!(
        "Position: {}\nDepartment: {}",
        plan.employee.position, plan.employee.department
    );
    let paragraph = document.push_paragraph(Paragraph::new());
    add_text(paragraph, &info, &caption.clone().with_justification(Justification::Center));
    paragraph.add_page_break();

    push_text(document, "Competencies", &section);
    push_text(document, "Technical skills:", &caption);
    push_skills(document, &plan.competencies.technical_skills)?;
    push_text(document, "Soft skills:", &caption);
    push_skills(document, &plan.competencies.soft_skills)?;

    push_text(document, "Development areas", &section);
    let areas = create_numbering(document, NumberingKind::Numbered);
    add_list(document, areas, &plan.development_areas, 0, &item)?;

    push_text(document, "Goals for next year", &section);
    let goals = create_numbering(document, NumberingKind::Numbered);
    if add_list(document, goals, &plan.goals_next_year, 0, &item)? > 0 {
        let last = document.elements_count() - 1;
        document.paragraph_mut(last)?.add_page_break();
    }

    push_text(document, "Recommended resources", &section);
    let table = create_table(document, plan.resources.len() + 1, 3, &TableStyle::report())?;
    fill_table_headers(table, &["Name", "Provider", "Duration"], &TextStyle::sized(22).bold())?;
    let rows: Vec<Vec<&str>> = plan
        .resources
        .iter()
        .map(|r| vec![r.name.as_str(), r.provider.as_str(), r.duration.as_str()])
        .collect();
    fill_table_body(table, &rows, 1, &item)?;

    push_text(document, "Feedback", &section);
    let line = "_".repeat(FEEDBACK_LINE);
    for heading in ["Manager's feedback:", "Employee's feedback:"] {
        push_text(document, heading, &caption);
        push_text(document, &line, &caption);
    }
    Ok(())
}
