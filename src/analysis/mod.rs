//! Survey analyses.
//!
//! Bucketing and ordering, grouping primitives, display formatting, the
//! individual analyses, and the pipeline that runs them.

pub mod aggregator;
pub mod buckets;
pub mod format;
pub mod pipeline;
pub mod reports;

pub use pipeline::{load_records, Analysis, AnalysisOutput, AnalysisPipeline, AnalysisResult};
