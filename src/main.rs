//! Command line runner of the docforge reports.
//!
//! ```sh
//! docforge annual-report --resources resources --output out
//! docforge all -o out -v
//! docforge list
//! docforge fixtures
//! ```
use std::path::PathBuf;
use std::process;

use clap::Parser;
use docforge::config::RunConfig;
use docforge::reports::{ReportKind, fixtures, run, run_all};
use docforge::{Error, Result};
use log::{error, info};

/// Build office documents from JSON inputs
#[derive(Parser, Debug)]
#[command(
    name = "docforge",
    about = "Build Word, Excel, PowerPoint and PDF documents from JSON inputs",
    long_about = "Runs one of the bundled reports, or all of them.\n\
                  `list` prints the report names and `fixtures` writes the input documents\n\
                  read by filling-form, chart-presentation and commenting-errors.",
    version
)]
struct Args {
    /// Report name, or one of `all`, `list` and `fixtures`
    #[arg(value_name = "REPORT")]
    target: String,

    /// Directory holding data/, docs/ and images/
    #[arg(short, long, value_name = "DIR")]
    resources: Option<PathBuf>,

    /// Directory the documents are written to
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log session and package activity
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Configuration file values, overridden by the flags.
    fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::new(),
        };
        if let Some(dir) = &self.resources {
            config = config.with_resources_dir(dir);
        }
        if let Some(dir) = &self.output {
            config = config.with_output_dir(dir);
        }
        Ok(config)
    }
}

fn execute(args: &Args) -> Result<()> {
    match args.target.as_str() {
        "list" => {
            for kind in ReportKind::ALL {
                println!("{:<22} {}", kind.name(), kind.description());
            }
        },
        "all" => {
            let outputs = run_all(&args.run_config()?)?;
            info!("{} documents written", outputs.len());
        },
        "fixtures" => {
            for path in fixtures::write_all(&args.run_config()?)? {
                println!("{}", path.display());
            }
        },
        name => {
            let kind: ReportKind = name.parse()?;
            let output = run(kind, &args.run_config()?)?;
            println!("{}", output.display());
        },
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(err) = execute(&args) {
        error!("{}", err);
        if let Error::UnknownReport(_) = err {
            error!("run `docforge list` for the available reports");
        }
        process::exit(1);
    }
}
