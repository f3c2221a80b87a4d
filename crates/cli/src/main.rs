//! # sheetcast-cli
//!
//! Command-line interface turning workbooks into the typed JSON data model.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use sheetcast_sheet::{WorkbookConfig, WorkbookParser};
use tracing_subscriber::EnvFilter;

/// sheetcast - typed data models from spreadsheets
#[derive(Parser)]
#[command(name = "sheetcast")]
#[command(author, version, about = "Turn spreadsheets into a typed, named JSON data model", long_about = None)]
struct Cli {
    /// Input workbook (.xlsx, .xlsm, .csv or .tsv)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Configuration document (YAML or JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit only the sheet of this name
    #[arg(short, long, value_name = "NAME")]
    sheet: Option<String>,

    /// Write the model to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pretty: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(clean) => {
            if clean {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout carries only the model.
    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => WorkbookConfig::from_path(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => WorkbookConfig::default(),
    };

    let mut model = WorkbookParser::new(config)
        .parse_path(&cli.input)
        .with_context(|| format!("Failed to parse {}", cli.input.display()))?;
    if let Some(name) = &cli.sheet {
        model.select_sheet(name)?;
    }

    let json = model.to_json(cli.pretty)?;
    match &cli.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{json}"),
    }

    let diagnostics = model.diagnostics;
    if diagnostics.error_count() > 0 || diagnostics.warning_count() > 0 {
        tracing::warn!(
            errors = diagnostics.error_count(),
            warnings = diagnostics.warning_count(),
            "parse finished with findings"
        );
    }
    Ok(diagnostics.is_clean())
}
