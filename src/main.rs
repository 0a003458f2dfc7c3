//! fe-survey - frontend engineer interview survey statistics
//!
//! A CLI tool that fetches the public frontend engineer interview survey
//! and prints descriptive statistics over it.
//!
//! Exit codes:
//!   0 - Success (including runs where the dataset could not be loaded)
//!   1 - Runtime error (invalid arguments, config, unwritable output)

mod analysis;
mod cli;
mod config;
mod models;
mod report;
mod source;

use analysis::{load_records, AnalysisPipeline};
use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use models::SurveyReport;
use std::io::IsTerminal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so the file can turn on verbose output
    let (config, config_origin) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(config.log_level(args.quiet));

    info!("fe-survey v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {}", config_origin);

    if let Err(e) = run(config, args.quiet).await {
        error!("Run failed: {:#}", e);
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .fe-survey.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("{} already exists. Remove it first or edit it manually.", CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to choose the dataset source, analyses and age ranges.");
    Ok(())
}

/// Initialize logging. Logs go to stderr so stdout carries only the report.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Fetch the dataset, run the selected analyses and write the report.
async fn run(config: Config, quiet: bool) -> Result<()> {
    let source = config.source.dataset_source();
    let show_progress = !quiet && std::io::stderr().is_terminal();

    // Step 1: fetch and validate. Failures leave us with no records, not an error.
    let records = load_records(&source, show_progress).await;
    if records.is_empty() {
        warn!("No records available, reporting neutral results");
    }

    // Step 2: run the analyses against the one snapshot
    let pipeline = AnalysisPipeline::new(config.analysis.clone());
    let results = pipeline.analyze_all(&config.analysis.analyses, &records);
    info!("Completed {} analyses", results.len());

    // Step 3: render and write
    let report = SurveyReport::new(source.describe(), records.len(), results);
    let output = match config.general.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Text => report::generate_text_report(&report),
    };

    report::write_report(&output, config.general.output.as_deref())?;

    if let Some(ref path) = config.general.output {
        info!("Report saved to: {}", path.display());
    }

    Ok(())
}

/// Load configuration from file or use defaults, then apply CLI overrides.
///
/// Returns the merged config and a description of where it came from.
fn load_config(args: &Args) -> Result<(Config, String)> {
    let (mut config, origin) = if let Some(ref config_path) = args.config {
        // An explicit config path must load
        (Config::load(config_path)?, config_path.display().to_string())
    } else {
        match Config::load_default() {
            Ok(Some(config)) => (config, CONFIG_FILE_NAME.to_string()),
            Ok(None) => (Config::default(), "defaults".to_string()),
            Err(e) => {
                eprintln!("Warning: failed to load {}: {:#}", CONFIG_FILE_NAME, e);
                (Config::default(), "defaults".to_string())
            }
        }
    };

    config.merge_with_args(args);
    config
        .validate()
        .with_context(|| format!("Invalid configuration ({})", origin))?;
    Ok((config, origin))
}
