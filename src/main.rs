//! Muster - command line entry point
//!
//! Evaluates a saved division against a catalog directory, or checks a
//! catalog for dangling references.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use muster::catalog::{load_catalog, load_engine_config};
use muster::core::error::Result;
use muster::engine::Engine;
use muster::roster::DivisionConfig;
use muster::rules::builtin_rules;

#[derive(Parser, Debug)]
#[command(name = "muster")]
#[command(about = "Evaluate army lists against a unit catalog")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a saved division and print totals, stats and problems
    Evaluate {
        /// Catalog directory (units.toml, improvements.toml, regiments/, divisions/)
        #[arg(long)]
        catalog: PathBuf,

        /// Division document (JSON)
        #[arg(long)]
        division: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Report dangling references in a catalog
    CheckCatalog {
        /// Catalog directory
        #[arg(long)]
        catalog: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Text,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("muster=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let outcome = match args.command {
        Command::Evaluate {
            catalog,
            division,
            format,
        } => evaluate(&catalog, &division, format),
        Command::CheckCatalog { catalog } => check_catalog(&catalog),
    };

    match outcome {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::from(2)
        }
    }
}

fn evaluate(catalog_dir: &Path, division_path: &Path, format: Format) -> Result<ExitCode> {
    let catalog = load_catalog(catalog_dir)?;
    let config = load_engine_config(catalog_dir)?;
    let engine = Engine::with_rules(&catalog, builtin_rules(), &config);

    let content = std::fs::read_to_string(division_path)?;
    let division: DivisionConfig = serde_json::from_str(&content)?;
    let report = engine.report_for(&division)?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Text => print!("{}", report),
    }

    Ok(if report.has_hard_problems() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn check_catalog(catalog_dir: &Path) -> Result<ExitCode> {
    let catalog = load_catalog(catalog_dir)?;
    load_engine_config(catalog_dir)?;
    let problems = catalog.integrity_problems(builtin_rules());

    if problems.is_empty() {
        println!("Catalog OK");
        return Ok(ExitCode::SUCCESS);
    }
    for problem in &problems {
        println!("{}", problem);
    }
    tracing::warn!("{} catalog problem(s)", problems.len());
    Ok(ExitCode::FAILURE)
}
