//! Analysis orchestration.
//!
//! A run goes fetch → validate → analyze. Fetch and validation failures
//! are logged and turn into an empty record set; every analysis maps an
//! empty record set to its neutral result, so nothing past this module
//! ever sees an error from the data.

use super::reports::{self, EducationDistribution, IndustryGender, MessageStatus, TenureSalary};
use crate::config::AnalysisConfig;
use crate::models::Respondent;
use crate::source::{DatasetError, DatasetSource};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, info, warn};

/// The available analyses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Analysis {
    /// Mean salary satisfaction per age bracket
    AgeSalary,
    /// Education level distribution
    Education,
    /// Gender ratio and satisfaction per industry
    IndustryGender,
    /// Completion of the free-text industry comment
    IndustryMessage,
    /// Work arrangement counts per industry
    Workplace,
    /// Salary satisfaction by tenure and work arrangement
    TenureSalary,
    /// Share of respondents per region
    Region,
}

impl Analysis {
    pub const ALL: [Analysis; 7] = [
        Analysis::AgeSalary,
        Analysis::Education,
        Analysis::IndustryGender,
        Analysis::IndustryMessage,
        Analysis::Workplace,
        Analysis::TenureSalary,
        Analysis::Region,
    ];

    /// Command-line name.
    pub fn name(&self) -> &'static str {
        match self {
            Analysis::AgeSalary => "age-salary",
            Analysis::Education => "education",
            Analysis::IndustryGender => "industry-gender",
            Analysis::IndustryMessage => "industry-message",
            Analysis::Workplace => "workplace",
            Analysis::TenureSalary => "tenure-salary",
            Analysis::Region => "region",
        }
    }

    /// Heading shown above the result.
    pub fn title(&self) -> &'static str {
        match self {
            Analysis::AgeSalary => "各年齡層的平均薪水滿意度",
            Analysis::Education => "教育程度統計結果",
            Analysis::IndustryGender => "各產業的男女比例與滿意度分析結果",
            Analysis::IndustryMessage => "產業心得填寫狀況",
            Analysis::Workplace => "各產業的實體辦公室與遠端工作公司數量",
            Analysis::TenureSalary => "各年資的實體與遠端工作，平均薪水滿意度",
            Analysis::Region => "各地區工作人士佔比",
        }
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisOutput {
    AgeSalary(IndexMap<String, f64>),
    Education(EducationDistribution),
    IndustryGender(IndexMap<String, IndustryGender>),
    IndustryMessage(MessageStatus),
    Workplace(IndexMap<String, IndexMap<String, String>>),
    TenureSalary(Vec<TenureSalary>),
    Region(IndexMap<String, String>),
}

impl AnalysisOutput {
    /// The result reported when there is no data to analyze.
    pub fn neutral(analysis: Analysis) -> Self {
        match analysis {
            Analysis::AgeSalary => AnalysisOutput::AgeSalary(IndexMap::new()),
            Analysis::Education => AnalysisOutput::Education(EducationDistribution::default()),
            Analysis::IndustryGender => AnalysisOutput::IndustryGender(IndexMap::new()),
            Analysis::IndustryMessage => AnalysisOutput::IndustryMessage(MessageStatus::default()),
            Analysis::Workplace => AnalysisOutput::Workplace(IndexMap::new()),
            Analysis::TenureSalary => AnalysisOutput::TenureSalary(Vec::new()),
            Analysis::Region => AnalysisOutput::Region(IndexMap::new()),
        }
    }
}

/// One analysis with its heading and output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub analysis: Analysis,
    pub title: String,
    pub output: AnalysisOutput,
}

/// Check that the fetched document is a non-empty array and decode it.
///
/// Array elements that are not objects are dropped.
pub fn validate(value: Value) -> Result<Vec<Respondent>, DatasetError> {
    let items = match value {
        Value::Array(items) => items,
        other => return Err(DatasetError::NotASequence(json_kind(&other))),
    };

    if items.is_empty() {
        return Err(DatasetError::Empty);
    }

    let total = items.len();
    let records: Vec<Respondent> = items
        .into_iter()
        .filter(|item| item.is_object())
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();

    if records.len() < total {
        debug!("Dropped {} malformed records", total - records.len());
    }
    if records.is_empty() {
        return Err(DatasetError::Empty);
    }

    Ok(records)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Fetch and validate the dataset, falling back to no records on failure.
pub async fn load_records(source: &DatasetSource, show_progress: bool) -> Vec<Respondent> {
    let fetched = source.fetch_with_progress(show_progress).await;

    match fetched.and_then(validate) {
        Ok(records) => {
            info!("Loaded {} records from {}", records.len(), source.describe());
            records
        }
        Err(e) if e.is_validation() => {
            warn!("Unusable dataset from {}: {}", source.describe(), e);
            Vec::new()
        }
        Err(e) => {
            warn!("Could not load dataset: {}", e);
            Vec::new()
        }
    }
}

/// Runs analyses over a loaded record set.
#[derive(Debug, Clone, Default)]
pub struct AnalysisPipeline {
    settings: AnalysisConfig,
}

impl AnalysisPipeline {
    pub fn new(settings: AnalysisConfig) -> Self {
        Self { settings }
    }

    /// Run one analysis. Pure: the same records always give the same result.
    pub fn analyze(&self, analysis: Analysis, records: &[Respondent]) -> AnalysisResult {
        let output = if records.is_empty() {
            debug!("No records, {} returns its neutral result", analysis);
            AnalysisOutput::neutral(analysis)
        } else {
            debug!("Running {} over {} records", analysis, records.len());
            self.compute(analysis, records)
        };

        AnalysisResult {
            analysis,
            title: analysis.title().to_string(),
            output,
        }
    }

    /// Run several analyses, in the order given, over the same records.
    pub fn analyze_all(&self, analyses: &[Analysis], records: &[Respondent]) -> Vec<AnalysisResult> {
        analyses
            .iter()
            .map(|analysis| self.analyze(*analysis, records))
            .collect()
    }

    fn compute(&self, analysis: Analysis, records: &[Respondent]) -> AnalysisOutput {
        let settings = &self.settings;
        match analysis {
            Analysis::AgeSalary => {
                AnalysisOutput::AgeSalary(reports::age_salary(records, &settings.age_ranges))
            }
            Analysis::Education => AnalysisOutput::Education(reports::education(records)),
            Analysis::IndustryGender => {
                AnalysisOutput::IndustryGender(reports::industry_gender(records))
            }
            Analysis::IndustryMessage => {
                AnalysisOutput::IndustryMessage(reports::industry_message(records))
            }
            Analysis::Workplace => {
                AnalysisOutput::Workplace(reports::workplace(records, &settings.workplace_labels))
            }
            Analysis::TenureSalary => {
                let rows = reports::tenure_salary(records, &settings.work_modes);
                debug!(
                    "Tenure buckets in order: {:?}",
                    rows.iter().map(|row| row.tenure.as_str()).collect::<Vec<_>>()
                );
                AnalysisOutput::TenureSalary(rows)
            }
            Analysis::Region => AnalysisOutput::Region(reports::region(records)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;
    use serde_json::json;
    use std::io::Write;

    fn sample() -> Value {
        json!([
            {
                "age": "26~30 歲", "gender": "男性", "education": "大學",
                "company": {
                    "industry": "軟體業", "score": "4", "salary_score": "3",
                    "work": "實體辦公室", "job_tenure": "1~2 年", "area": "台北市",
                    "industry_message": "還不錯"
                }
            },
            {
                "age": "21~25 歲", "gender": "女性", "education": "碩士",
                "company": {
                    "industry": "軟體業", "score": "5", "salary_score": "5",
                    "work": "遠端工作", "job_tenure": "1 年以下", "area": "台中市",
                    "industry_message": ""
                }
            },
            { "age": "31~35 歲", "gender": "男性", "education": "大學" },
            42
        ])
    }

    #[test]
    fn test_validate_rejects_non_array() {
        let err = validate(json!({ "data": [] })).unwrap_err();
        assert!(matches!(err, DatasetError::NotASequence("object")));
        assert!(err.is_validation());
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert!(matches!(validate(json!([])), Err(DatasetError::Empty)));
        assert!(matches!(validate(json!([1, "x"])), Err(DatasetError::Empty)));
        assert!(matches!(validate(json!([[]])), Err(DatasetError::Empty)));
    }

    #[test]
    fn test_validate_ignores_positional_arrays() {
        let records = validate(json!([
            ["26~30 歲", "男性", "大學"],
            [],
            { "age": "21~25 歲" }
        ]))
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get(Field::Age), Some("21~25 歲"));
    }

    #[test]
    fn test_age_salary_with_extreme_scores() {
        let records = validate(json!([
            { "age": "26~30 歲", "company": { "salary_score": "9223372036854775807" } },
            { "age": "26~30 歲", "company": { "salary_score": "1" } }
        ]))
        .unwrap();
        let result = AnalysisPipeline::default().analyze(Analysis::AgeSalary, &records);
        match result.output {
            AnalysisOutput::AgeSalary(averages) => assert!(averages["26~30 歲"] > 1.0),
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[test]
    fn test_validate_drops_non_objects() {
        let records = validate(sample()).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_empty_input_gives_neutral_results() {
        let pipeline = AnalysisPipeline::default();
        for analysis in Analysis::ALL {
            let result = pipeline.analyze(analysis, &[]);
            assert_eq!(result.output, AnalysisOutput::neutral(analysis));
        }

        let message = pipeline.analyze(Analysis::IndustryMessage, &[]);
        assert_eq!(
            serde_json::to_value(&message.output).unwrap(),
            json!(["有寫0人", { "no": "沒寫0人" }])
        );
        let tenure = pipeline.analyze(Analysis::TenureSalary, &[]);
        assert_eq!(serde_json::to_value(&tenure.output).unwrap(), json!([]));
    }

    #[test]
    fn test_analyses_are_idempotent() {
        let records = validate(sample()).unwrap();
        let pipeline = AnalysisPipeline::default();

        let first = serde_json::to_string(&pipeline.analyze_all(&Analysis::ALL, &records)).unwrap();
        let second = serde_json::to_string(&pipeline.analyze_all(&Analysis::ALL, &records)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_analyze_all_keeps_order() {
        let records = validate(sample()).unwrap();
        let pipeline = AnalysisPipeline::default();
        let order = [Analysis::Region, Analysis::Education];

        let results = pipeline.analyze_all(&order, &records);
        assert_eq!(results[0].analysis, Analysis::Region);
        assert_eq!(results[0].title, "各地區工作人士佔比");
        assert_eq!(results[1].analysis, Analysis::Education);
    }

    #[test]
    fn test_tenure_salary_through_pipeline() {
        let records = validate(sample()).unwrap();
        let result = AnalysisPipeline::default().analyze(Analysis::TenureSalary, &records);
        assert_eq!(
            serde_json::to_value(&result.output).unwrap(),
            json!([
                { "工作經驗1年以下": {
                    "實體辦公室的平均薪水滿意度": "無資料",
                    "遠端工作的平均薪水滿意度": "5.0分"
                }},
                { "工作經驗1~2年": {
                    "實體辦公室的平均薪水滿意度": "3.0分",
                    "遠端工作的平均薪水滿意度": "無資料"
                }}
            ])
        );
    }

    #[tokio::test]
    async fn test_load_records_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", sample()).unwrap();

        let records = load_records(&DatasetSource::File(file.path().to_path_buf()), false).await;
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn test_load_records_degrades_to_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"error": "rate limited"}}"#).unwrap();
        let not_array = load_records(&DatasetSource::File(file.path().to_path_buf()), false).await;
        assert!(not_array.is_empty());

        let dir = tempfile::tempdir().unwrap();
        let missing = load_records(&DatasetSource::File(dir.path().join("none.json")), false).await;
        assert!(missing.is_empty());
    }
}
