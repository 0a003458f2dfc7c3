//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::Analysis;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// fe-survey - frontend engineer interview survey statistics
///
/// Fetches the public frontend engineer survey and prints descriptive
/// statistics: satisfaction by age, tenure and industry, education and
/// regional distribution, work arrangements.
///
/// Examples:
///   fe-survey
///   fe-survey --analysis tenure-salary,region --format json
///   fe-survey --input ./frontend_data.json --age-ranges "26~30 歲,31~35 歲"
///   fe-survey --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Analyses to run (comma-separated, default: all)
    #[arg(short, long, value_name = "NAMES", value_delimiter = ',')]
    pub analysis: Option<Vec<Analysis>>,

    /// Dataset URL
    ///
    /// Defaults to the published survey JSON on GitHub.
    #[arg(long, value_name = "URL", env = "FE_SURVEY_URL")]
    pub url: Option<String>,

    /// Read the dataset from a local JSON file instead of fetching it
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .fe-survey.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Age brackets for age-salary (comma-separated, default: every bracket found)
    #[arg(long, value_name = "RANGES", value_delimiter = ',')]
    pub age_ranges: Option<Vec<String>>,

    /// Work arrangements compared by tenure-salary (comma-separated)
    #[arg(long, value_name = "MODES", value_delimiter = ',')]
    pub work_modes: Option<Vec<String>>,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only, no progress spinner)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .fe-survey.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Dataset URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref analyses) = self.analysis {
            if analyses.is_empty() {
                return Err("At least one analysis must be selected".to_string());
            }
        }

        if let Some(ref modes) = self.work_modes {
            if modes.iter().any(|m| m.trim().is_empty()) {
                return Err("Work modes must not be blank".to_string());
            }
        }

        if let Some(ref input) = self.input {
            if !input.is_file() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_args() -> Args {
        Args {
            analysis: None,
            url: None,
            input: None,
            config: None,
            format: None,
            output: None,
            age_ranges: None,
            work_modes: None,
            timeout: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_analysis_list() {
        let args = Args::parse_from([
            "fe-survey",
            "--analysis",
            "tenure-salary,region",
            "--format",
            "json",
        ]);
        assert_eq!(
            args.analysis,
            Some(vec![Analysis::TenureSalary, Analysis::Region])
        );
        assert_eq!(args.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_parse_age_ranges() {
        let args = Args::parse_from(["fe-survey", "--age-ranges", "26~30 歲,31~35 歲"]);
        assert_eq!(
            args.age_ranges,
            Some(vec!["26~30 歲".to_string(), "31~35 歲".to_string()])
        );
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.url = Some("ftp://example.com/data.json".to_string());
        assert!(args.validate().is_err());

        args.url = Some("https://example.com/data.json".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_blank_work_mode() {
        let args = Args::parse_from(["fe-survey", "--work-modes", ",遠端工作"]);
        assert!(args.validate().is_err());

        let args = Args::parse_from(["fe-survey", "--work-modes", "實體辦公室,遠端工作"]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = make_args();
        args.input = Some(dir.path().join("missing.json"));
        assert!(args.validate().is_err());
    }
}
