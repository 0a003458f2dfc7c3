//! Report generation.
//!
//! This module renders a [`SurveyReport`] as console text or JSON and
//! writes it to stdout or a file.

use crate::analysis::{AnalysisOutput, AnalysisResult};
use crate::analysis::format::{self, NO_DATA};
use crate::models::{ReportMetadata, SurveyReport};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Generate the plain-text report.
pub fn generate_text_report(report: &SurveyReport) -> String {
    let mut output = String::new();

    output.push_str(&generate_metadata_section(&report.metadata));

    for result in &report.results {
        output.push_str(&generate_result_section(result));
    }

    output
}

/// Generate the metadata header.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str(&format!("Source: {}\n", metadata.source));
    section.push_str(&format!("Records: {}\n", metadata.records));
    section.push_str(&format!(
        "Generated: {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push('\n');

    section
}

/// Generate the section for one analysis.
fn generate_result_section(result: &AnalysisResult) -> String {
    let mut section = String::new();

    section.push_str(&format!("{}:\n", result.title));

    let lines = result_lines(&result.output);
    if lines.is_empty() {
        section.push_str(&format!("  {}\n", NO_DATA));
    }
    for line in lines {
        section.push_str(&format!("  {}\n", line));
    }
    section.push('\n');

    section
}

/// Body lines for an analysis output, empty when there is nothing to show.
fn result_lines(output: &AnalysisOutput) -> Vec<String> {
    match output {
        AnalysisOutput::AgeSalary(averages) => averages
            .iter()
            .map(|(range, avg)| format!("{}族群的平均薪水滿意度: {:.2}", range, avg))
            .collect(),
        AnalysisOutput::Education(distribution) => {
            if distribution.counts.is_empty() {
                return Vec::new();
            }
            let mut lines: Vec<String> = distribution
                .counts
                .iter()
                .map(|(education, count)| format!("{}: {}", education, format::people(*count)))
                .collect();
            lines.push(format!("總計: {}", format::people(distribution.total)));
            lines
        }
        AnalysisOutput::IndustryGender(industries) => industries
            .iter()
            .map(|(industry, stats)| {
                format!(
                    "{}: 男性比例 {}, 女性比例 {}, 男性產業滿意度 {}, 女性產業滿意度 {}",
                    industry,
                    stats.male_ratio,
                    stats.female_ratio,
                    stats.male_avg_score,
                    stats.female_avg_score
                )
            })
            .collect(),
        AnalysisOutput::IndustryMessage(status) => {
            vec![format!("{}, {}", status.0, status.1.no)]
        }
        AnalysisOutput::Workplace(industries) => industries
            .iter()
            .map(|(industry, counts)| format!("{}: {}", industry, join_pairs(counts)))
            .collect(),
        AnalysisOutput::TenureSalary(rows) => rows
            .iter()
            .map(|row| format!("{}: {}", row.label, join_pairs(&row.averages)))
            .collect(),
        AnalysisOutput::Region(shares) => shares
            .iter()
            .map(|(area, share)| format!("{}: {}", area, share))
            .collect(),
    }
}

fn join_pairs<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| format!("{} {}", key, value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Generate a JSON report.
pub fn generate_json_report(report: &SurveyReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content to `path`, or to stdout when no path is given.
pub fn write_report(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write report to {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .and_then(|_| stdout.flush())
                .context("Failed to write report to stdout")
        }
    }
}
