//! The example documents.
//!
//! Every report reads its input from the resources directory, builds one
//! document in a [`DocumentSession`] and saves it as `result.<ext>` in the
//! output directory. [`ReportKind`] names them for the command line and
//! [`run`] executes one.
//!
//! # Examples
//!
//! ```rust,no_run
//! use docforge::config::RunConfig;
//! use docforge::reports::{ReportKind, run};
//!
//! let config = RunConfig::new().with_output_dir("out");
//! let path = run(ReportKind::AnnualReport, &config)?;
//! println!("written {}", path.display());
//! # Ok::<(), docforge::Error>(())
//! ```
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use log::{info, warn};
use serde::Deserialize;

use crate::common::picture::PLACEHOLDER_PNG;
use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::session::{DocumentKind, DocumentSession};

pub mod annual_report;
pub mod chart_presentation;
pub mod commenting_errors;
pub mod commercial_offer;
pub mod development_plan;
pub mod employment_agreement;
pub mod filling_spreadsheet;
pub mod fixtures;
pub mod forms;
pub mod inventory_report;
pub mod investment_plan;
pub mod invoice;
pub mod presentation;
pub mod startup_presentation;
pub mod user_feedback;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    AnnualReport,
    DevelopmentPlan,
    CommercialOffer,
    Invoice,
    EmploymentAgreement,
    InventoryReport,
    InvestmentPlan,
    UserFeedbackReport,
    FillingSpreadsheet,
    CommentingErrors,
    BasicForm,
    AdvancedForm,
    FillingForm,
    Presentation,
    ChartPresentation,
    StartupPresentation,
}

impl ReportKind {
    pub const ALL: [ReportKind; 16] = [
        ReportKind::AnnualReport,
        ReportKind::DevelopmentPlan,
        ReportKind::CommercialOffer,
        ReportKind::Invoice,
        ReportKind::EmploymentAgreement,
        ReportKind::InventoryReport,
        ReportKind::InvestmentPlan,
        ReportKind::UserFeedbackReport,
        ReportKind::FillingSpreadsheet,
        ReportKind::CommentingErrors,
        ReportKind::BasicForm,
        ReportKind::AdvancedForm,
        ReportKind::FillingForm,
        ReportKind::Presentation,
        ReportKind::ChartPresentation,
        ReportKind::StartupPresentation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ReportKind::AnnualReport => "annual-report",
            ReportKind::DevelopmentPlan => "development-plan",
            ReportKind::CommercialOffer => "commercial-offer",
            ReportKind::Invoice => "invoice",
            ReportKind::EmploymentAgreement => "employment-agreement",
            ReportKind::InventoryReport => "inventory-report",
            ReportKind::InvestmentPlan => "investment-plan",
            ReportKind::UserFeedbackReport => "user-feedback-report",
            ReportKind::FillingSpreadsheet => "filling-spreadsheet",
            ReportKind::CommentingErrors => "commenting-errors",
            ReportKind::BasicForm => "basic-form",
            ReportKind::AdvancedForm => "advanced-form",
            ReportKind::FillingForm => "filling-form",
            ReportKind::Presentation => "presentation",
            ReportKind::ChartPresentation => "chart-presentation",
            ReportKind::StartupPresentation => "startup-presentation",
        }
    }

    /// One-line summary for `docforge list`.
    pub fn description(self) -> &'static str {
        match self {
            ReportKind::AnnualReport => "annual financial report with charts and tables",
            ReportKind::DevelopmentPlan => "employee development plan",
            ReportKind::CommercialOffer => "commercial offer with requisites and terms",
            ReportKind::Invoice => "invoice exported as PDF",
            ReportKind::EmploymentAgreement => "employment agreement exported as PDF",
            ReportKind::InventoryReport => "inventory sheet colored by status",
            ReportKind::InvestmentPlan => "compound growth formulas and chart",
            ReportKind::UserFeedbackReport => "feedback averages, comments and charts",
            ReportKind::FillingSpreadsheet => "static table written cell by cell",
            ReportKind::CommentingErrors => "notes on every error cell of a workbook",
            ReportKind::BasicForm => "employee pass card form",
            ReportKind::AdvancedForm => "purchase order form",
            ReportKind::FillingForm => "purchase order form filled from JSON",
            ReportKind::Presentation => "picture slides with captions",
            ReportKind::ChartPresentation => "slide with a chart read from a workbook",
            ReportKind::StartupPresentation => "startup pitch deck from market data",
        }
    }

    /// Format of the produced document.
    pub fn output_kind(self) -> DocumentKind {
        match self {
            ReportKind::AnnualReport
            | ReportKind::DevelopmentPlan
            | ReportKind::CommercialOffer
            | ReportKind::BasicForm
            | ReportKind::AdvancedForm
            | ReportKind::FillingForm => DocumentKind::Word,
            ReportKind::Invoice | ReportKind::EmploymentAgreement => DocumentKind::Pdf,
            ReportKind::InventoryReport
            | ReportKind::InvestmentPlan
            | ReportKind::UserFeedbackReport
            | ReportKind::FillingSpreadsheet
            | ReportKind::CommentingErrors => DocumentKind::Spreadsheet,
            ReportKind::Presentation | ReportKind::ChartPresentation | ReportKind::StartupPresentation => {
                DocumentKind::Presentation
            },
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ReportKind::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ReportKind::from_name(s).ok_or_else(|| Error::UnknownReport(s.to_string()))
    }
}

/// A payload value sent as text by some systems and as a number by others.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// Build one report and return the path of the written document.
pub fn run(kind: ReportKind, config: &RunConfig) -> Result<PathBuf> {
    info!("{}: started", kind);
    let started = Instant::now();
    let output = match kind {
        ReportKind::AnnualReport => annual_report::generate(config),
        ReportKind::DevelopmentPlan => development_plan::generate(config),
        ReportKind::CommercialOffer => commercial_offer::generate(config),
        ReportKind::Invoice => invoice::generate(config),
        ReportKind::EmploymentAgreement => employment_agreement::generate(config),
        ReportKind::InventoryReport => inventory_report::generate(config),
        ReportKind::InvestmentPlan => investment_plan::generate(config),
        ReportKind::UserFeedbackReport => user_feedback::generate(config),
        ReportKind::FillingSpreadsheet => filling_spreadsheet::generate(config),
        ReportKind::CommentingErrors => commenting_errors::generate(config),
        ReportKind::BasicForm => forms::generate_basic(config),
        ReportKind::AdvancedForm => forms::generate_advanced(config),
        ReportKind::FillingForm => forms::generate_filled(config),
        ReportKind::Presentation => presentation::generate(config),
        ReportKind::ChartPresentation => chart_presentation::generate(config),
        ReportKind::StartupPresentation => startup_presentation::generate(config),
    }?;
    info!(
        "{}: written {} in {:.1?}",
        kind,
        output.display(),
        started.elapsed()
    );
    Ok(output)
}

/// Run every report in turn, each into its own subdirectory of the output
/// directory. Stops at the first failure.
pub fn run_all(config: &RunConfig) -> Result<Vec<PathBuf>> {
    let mut outputs = Vec::with_capacity(ReportKind::ALL.len());
    for kind in ReportKind::ALL {
        let report_config = config.clone().with_output_dir(config.output_dir.join(kind.name()));
        outputs.push(run(kind, &report_config)?);
    }
    Ok(outputs)
}

/// Save the session's document as `result.<ext>` and close the session.
pub(crate) fn finish(mut session: DocumentSession, config: &RunConfig) -> Result<PathBuf> {
    let output = config.output_file(session.kind().extension());
    session.save(&output)?;
    session.close();
    Ok(output)
}

/// Bytes of `<resources>/images/<name>`. A missing or unreadable image is
/// replaced by a blank placeholder so the document still gets built.
pub(crate) fn load_image(config: &RunConfig, name: &str) -> Vec<u8> {
    let path = config.image_file(name);
    match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("cannot read image {}: {}, using a placeholder", path.display(), err);
            PLACEHOLDER_PNG.to_vec()
        },
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use crate::config::RunConfig;

    /// A resources directory holding the shipped sample data, with fresh
    /// fixture documents, and an empty output directory.
    pub fn sandbox() -> (TempDir, RunConfig) {
        let dir = tempfile::tempdir().unwrap();
        let resources = dir.path().join("resources");
        let shipped = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources");
        for sub in ["data", "images"] {
            let target = resources.join(sub);
            fs::create_dir_all(&target).unwrap();
            for entry in fs::read_dir(shipped.join(sub)).unwrap() {
                let entry = entry.unwrap();
                fs::copy(entry.path(), target.join(entry.file_name())).unwrap();
            }
        }
        let config = RunConfig::new()
            .with_resources_dir(&resources)
            .with_output_dir(dir.path().join("out"));
        super::fixtures::write_all(&config).unwrap();
        (dir, config)
    }

    /// Replace a sample data file with `text`.
    pub fn overwrite_data(config: &RunConfig, name: &str, text: &str) {
        fs::write(config.data_file(name), text).unwrap();
    }
}
