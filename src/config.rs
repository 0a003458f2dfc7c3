//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.fe-survey.toml` files.

use crate::analysis::Analysis;
use crate::cli::OutputFormat;
use crate::models::{WORK_HYBRID, WORK_OFFICE, WORK_REMOTE};
use crate::source::{DatasetSource, DEFAULT_DATASET_URL};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".fe-survey.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Write the report to this file instead of stdout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// Where the dataset is read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Dataset URL.
    #[serde(default = "default_url")]
    pub url: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Local JSON file to read instead of fetching `url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_seconds: default_timeout(),
            input: None,
        }
    }
}

fn default_url() -> String {
    DEFAULT_DATASET_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl SourceConfig {
    /// The dataset source these settings describe. A local file wins over the URL.
    pub fn dataset_source(&self) -> DatasetSource {
        match self.input {
            Some(ref path) => DatasetSource::File(path.clone()),
            None => DatasetSource::Http {
                url: self.url.clone(),
                timeout: Duration::from_secs(self.timeout_seconds),
            },
        }
    }
}

/// Analysis selection and parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Analyses to run, in output order.
    #[serde(default = "default_analyses")]
    pub analyses: Vec<Analysis>,

    /// Age brackets for `age-salary`. Empty means every bracket in the data.
    #[serde(default)]
    pub age_ranges: Vec<String>,

    /// Work arrangements compared by `tenure-salary`.
    #[serde(default = "default_work_modes")]
    pub work_modes: Vec<String>,

    /// Work arrangements always listed by `workplace`.
    #[serde(default = "default_workplace_labels")]
    pub workplace_labels: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            analyses: default_analyses(),
            age_ranges: Vec::new(),
            work_modes: default_work_modes(),
            workplace_labels: default_workplace_labels(),
        }
    }
}

fn default_analyses() -> Vec<Analysis> {
    Analysis::ALL.to_vec()
}

fn default_work_modes() -> Vec<String> {
    vec![WORK_OFFICE.to_string(), WORK_REMOTE.to_string()]
}

fn default_workplace_labels() -> Vec<String> {
    vec![
        WORK_OFFICE.to_string(),
        WORK_REMOTE.to_string(),
        WORK_HYBRID.to_string(),
    ]
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.fe-survey.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref analyses) = args.analysis {
            self.analysis.analyses = analyses.clone();
        }
        if let Some(ref ranges) = args.age_ranges {
            self.analysis.age_ranges = ranges.clone();
        }
        if let Some(ref modes) = args.work_modes {
            self.analysis.work_modes = modes.clone();
        }

        if let Some(ref url) = args.url {
            self.source.url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = timeout;
        }
        if let Some(ref input) = args.input {
            self.source.input = Some(input.clone());
        }

        if let Some(format) = args.format {
            self.general.format = format;
        }
        if let Some(ref output) = args.output {
            self.general.output = Some(output.clone());
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
        if args.quiet {
            self.general.verbose = false;
        }
    }

    /// Check settings that may have come from the config file.
    ///
    /// Runs after [`Config::merge_with_args`], so it covers values that never
    /// passed through the command-line checks.
    pub fn validate(&self) -> Result<()> {
        if self.source.timeout_seconds == 0 {
            anyhow::bail!("source.timeout_seconds must be at least 1");
        }
        if self.analysis.analyses.is_empty() {
            anyhow::bail!("analysis.analyses must select at least one analysis");
        }
        if self.analysis.work_modes.is_empty() {
            anyhow::bail!("analysis.work_modes must name at least one work mode");
        }
        if self.analysis.work_modes.iter().any(|m| m.trim().is_empty()) {
            anyhow::bail!("analysis.work_modes must not contain blank entries");
        }
        Ok(())
    }

    /// Log level after merging: quiet beats verbose.
    pub fn log_level(&self, quiet: bool) -> tracing::Level {
        if quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
