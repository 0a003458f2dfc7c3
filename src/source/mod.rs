//! Dataset retrieval.
//!
//! The survey is published as a single JSON array. It can be fetched over
//! HTTP or read from a local copy; either way the raw JSON value is handed
//! back untouched and validation is left to the pipeline.

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Public location of the frontend engineer survey.
pub const DEFAULT_DATASET_URL: &str =
    "https://raw.githubusercontent.com/hexschool/2021-ui-frontend-job/master/frontend_data.json";

/// Failures while fetching or validating the dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode dataset from {origin}: {reason}")]
    Decode { origin: String, reason: String },

    #[error("dataset is not a JSON array (found {0})")]
    NotASequence(&'static str),

    #[error("dataset contains no records")]
    Empty,
}

impl DatasetError {
    /// Whether the data arrived but had the wrong shape.
    pub fn is_validation(&self) -> bool {
        matches!(self, DatasetError::NotASequence(_) | DatasetError::Empty)
    }
}

/// Where the survey records come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetSource {
    /// HTTP GET of a JSON document.
    Http { url: String, timeout: Duration },
    /// A JSON file on disk.
    File(PathBuf),
}

impl DatasetSource {
    /// Human-readable origin, used in logs and report metadata.
    pub fn describe(&self) -> String {
        match self {
            DatasetSource::Http { url, .. } => url.clone(),
            DatasetSource::File(path) => path.display().to_string(),
        }
    }

    /// Retrieve the raw JSON document.
    pub async fn fetch(&self) -> Result<Value, DatasetError> {
        match self {
            DatasetSource::Http { url, timeout } => fetch_url(url, *timeout).await,
            DatasetSource::File(path) => read_file(path).await,
        }
    }

    /// [`fetch`](Self::fetch) with a spinner on stderr while it runs.
    pub async fn fetch_with_progress(&self, show_progress: bool) -> Result<Value, DatasetError> {
        let spinner = show_progress.then(|| {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
                pb.set_style(style);
            }
            pb.set_message(format!("Fetching {}", self.describe()));
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });

        let result = self.fetch().await;

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        result
    }
}

async fn fetch_url(url: &str, timeout: Duration) -> Result<Value, DatasetError> {
    info!("Fetching dataset: {}", url);

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(DatasetError::Client)?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| DatasetError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(DatasetError::Status {
            url: url.to_string(),
            status,
        });
    }

    let value = response
        .json::<Value>()
        .await
        .map_err(|e| DatasetError::Decode {
            origin: url.to_string(),
            reason: e.to_string(),
        })?;

    debug!("Fetched dataset from {}", url);
    Ok(value)
}

async fn read_file(path: &Path) -> Result<Value, DatasetError> {
    info!("Reading dataset: {}", path.display());

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;

    serde_json::from_str(&content).map_err(|e| DatasetError::Decode {
        origin: path.display().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_read_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"age": "26~30 歲"}}]"#).unwrap();

        let source = DatasetSource::File(file.path().to_path_buf());
        let value = source.fetch().await.unwrap();
        assert!(value.is_array());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = DatasetSource::File(dir.path().join("missing.json"));
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
        assert!(!err.is_validation());
    }

    #[tokio::test]
    async fn test_malformed_file_is_decode_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[{{not json").unwrap();

        let source = DatasetSource::File(file.path().to_path_buf());
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, DatasetError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_url_is_request_error() {
        let source = DatasetSource::Http {
            url: "http://127.0.0.1:9/frontend_data.json".to_string(),
            timeout: Duration::from_secs(2),
        };
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, DatasetError::Request { .. }));
    }

    #[test]
    fn test_describe() {
        let source = DatasetSource::Http {
            url: DEFAULT_DATASET_URL.to_string(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(source.describe(), DEFAULT_DATASET_URL);
        assert_eq!(
            DatasetSource::File(PathBuf::from("data.json")).describe(),
            "data.json"
        );
    }
}
