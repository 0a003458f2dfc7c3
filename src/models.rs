//! Data models for the survey dataset.
//!
//! A [`Respondent`] is one interview record as published in the survey JSON.
//! Every field is optional: the dataset is hand-entered and records with a
//! missing or partial `company` object are common enough that the analyses
//! must keep going when they meet one. Field lookup goes through [`Field`]
//! so that callers never have to walk the nested structure themselves.

use crate::analysis::AnalysisResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Gender label for male respondents.
pub const MALE: &str = "男性";
/// Gender label for female respondents.
pub const FEMALE: &str = "女性";

/// Work arrangement: on-site office.
pub const WORK_OFFICE: &str = "實體辦公室";
/// Work arrangement: fully remote.
pub const WORK_REMOTE: &str = "遠端工作";
/// Work arrangement: hybrid.
pub const WORK_HYBRID: &str = "混合制";

/// One survey participant.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Respondent {
    /// Age bracket, e.g. `"26~30 歲"`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub education: Option<String>,
    /// Employer details. Absent or malformed objects decode as `None`.
    #[serde(default, deserialize_with = "lenient_company")]
    pub company: Option<Company>,
}

/// The `company` sub-record of a respondent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Company {
    #[serde(default, deserialize_with = "lenient_string")]
    pub industry: Option<String>,
    /// Overall job satisfaction, an integer encoded as a string.
    #[serde(default, deserialize_with = "lenient_string")]
    pub score: Option<String>,
    /// Compensation satisfaction, an integer encoded as a string.
    #[serde(default, deserialize_with = "lenient_string")]
    pub salary_score: Option<String>,
    /// Work arrangement label.
    #[serde(default, deserialize_with = "lenient_string")]
    pub work: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub job_tenure: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub area: Option<String>,
    /// Free-text comment about the industry.
    #[serde(default, deserialize_with = "lenient_string")]
    pub industry_message: Option<String>,
}

/// Accept strings as-is and numbers in their decimal form; anything else is absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(number_text(&n)),
        _ => None,
    })
}

/// Decimal text of a JSON number. Whole floats such as `3.0` are written as
/// integers so they still parse as scores.
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

fn lenient_company<'de, D>(deserializer: D) -> Result<Option<Company>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(v @ Value::Object(_)) => serde_json::from_value(v).ok(),
        _ => None,
    })
}

/// Addressable fields of a [`Respondent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Age,
    Gender,
    Education,
    Industry,
    Score,
    SalaryScore,
    Work,
    JobTenure,
    Area,
    IndustryMessage,
}

impl Field {
    /// Every field, in record order.
    pub const ALL: [Field; 10] = [
        Field::Age,
        Field::Gender,
        Field::Education,
        Field::Industry,
        Field::Score,
        Field::SalaryScore,
        Field::Work,
        Field::JobTenure,
        Field::Area,
        Field::IndustryMessage,
    ];

    /// Dotted path of the field in the source JSON.
    pub fn path(&self) -> &'static str {
        match self {
            Field::Age => "age",
            Field::Gender => "gender",
            Field::Education => "education",
            Field::Industry => "company.industry",
            Field::Score => "company.score",
            Field::SalaryScore => "company.salary_score",
            Field::Work => "company.work",
            Field::JobTenure => "company.job_tenure",
            Field::Area => "company.area",
            Field::IndustryMessage => "company.industry_message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Returned when a dotted path names no known field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field path: {0}")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.trim();
        Field::ALL
            .into_iter()
            .find(|field| field.path() == path)
            .ok_or_else(|| UnknownField(path.to_string()))
    }
}

impl Respondent {
    /// Raw value of a field, `None` when the field or its parent object is missing.
    fn raw(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::Age => &self.age,
            Field::Gender => &self.gender,
            Field::Education => &self.education,
            company_field => {
                let company = self.company.as_ref()?;
                match company_field {
                    Field::Industry => &company.industry,
                    Field::Score => &company.score,
                    Field::SalaryScore => &company.salary_score,
                    Field::Work => &company.work,
                    Field::JobTenure => &company.job_tenure,
                    Field::Area => &company.area,
                    Field::IndustryMessage => &company.industry_message,
                    Field::Age | Field::Gender | Field::Education => return None,
                }
            }
        };
        value.as_deref()
    }

    /// Value of a field, treating blank strings the same as a missing field.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.raw(field).filter(|v| !v.trim().is_empty())
    }

    /// Integer value of a numeric field.
    ///
    /// Values that do not parse as an integer are reported as absent, so the
    /// record drops out of whichever aggregate asked for the number.
    pub fn get_int(&self, field: Field) -> Option<i64> {
        let raw = self.get(field)?;
        match raw.trim().parse::<i64>() {
            Ok(n) => Some(n),
            Err(_) => {
                debug!("Ignoring non-numeric {} value: {:?}", field, raw);
                None
            }
        }
    }

    /// Whether the field holds a non-blank value.
    pub fn has(&self, field: Field) -> bool {
        self.get(field).is_some()
    }
}

/// Metadata about a report run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Where the dataset was read from.
    pub source: String,
    /// Date and time of the run.
    pub generated_at: DateTime<Utc>,
    /// Number of usable records.
    pub records: usize,
}

/// The complete survey report.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyReport {
    pub metadata: ReportMetadata,
    /// Analysis results, in the order they were requested.
    pub results: Vec<AnalysisResult>,
}

impl SurveyReport {
    pub fn new(source: String, records: usize, results: Vec<AnalysisResult>) -> Self {
        Self {
            metadata: ReportMetadata {
                source,
                generated_at: Utc::now(),
                records,
            },
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_record() {
        let record: Respondent = serde_json::from_value(json!({
            "age": "26~30 歲",
            "gender": "女性",
            "education": "大學",
            "major": "資訊工程",
            "company": {
                "industry": "軟體業",
                "score": "4",
                "salary_score": 3,
                "work": "遠端工作",
                "job_tenure": "1~2 年",
                "area": "台北市",
                "industry_message": ""
            }
        }))
        .unwrap();

        assert_eq!(record.get(Field::Age), Some("26~30 歲"));
        assert_eq!(record.get(Field::Industry), Some("軟體業"));
        assert_eq!(record.get_int(Field::Score), Some(4));
        assert_eq!(record.get_int(Field::SalaryScore), Some(3));
        assert_eq!(record.get(Field::IndustryMessage), None);
    }

    #[test]
    fn test_missing_company_is_absent_not_error() {
        let record: Respondent = serde_json::from_value(json!({ "age": "21~25 歲" })).unwrap();
        assert!(record.company.is_none());
        assert_eq!(record.get(Field::JobTenure), None);
        assert_eq!(record.get_int(Field::SalaryScore), None);

        let malformed: Respondent =
            serde_json::from_value(json!({ "age": "21~25 歲", "company": "n/a" })).unwrap();
        assert!(malformed.company.is_none());
    }

    #[test]
    fn test_non_scalar_values_are_absent() {
        let record: Respondent = serde_json::from_value(json!({
            "gender": ["男性"],
            "company": { "area": null, "score": true }
        }))
        .unwrap();
        assert_eq!(record.get(Field::Gender), None);
        assert_eq!(record.get(Field::Area), None);
        assert_eq!(record.get(Field::Score), None);
    }

    #[test]
    fn test_get_int_rejects_non_numeric() {
        let record: Respondent = serde_json::from_value(json!({
            "company": { "score": "4分", "salary_score": " 5 " }
        }))
        .unwrap();
        assert_eq!(record.get(Field::Score), Some("4分"));
        assert_eq!(record.get_int(Field::Score), None);
        assert_eq!(record.get_int(Field::SalaryScore), Some(5));
    }

    #[test]
    fn test_json_number_scores() {
        let record: Respondent = serde_json::from_value(json!({
            "company": { "score": 3.0, "salary_score": 4 }
        }))
        .unwrap();
        assert_eq!(record.get(Field::Score), Some("3"));
        assert_eq!(record.get_int(Field::Score), Some(3));
        assert_eq!(record.get_int(Field::SalaryScore), Some(4));

        let record: Respondent = serde_json::from_value(json!({
            "company": { "score": 3.5 }
        }))
        .unwrap();
        assert_eq!(record.get(Field::Score), Some("3.5"));
        assert_eq!(record.get_int(Field::Score), None);
    }

    #[test]
    fn test_field_paths_round_trip() {
        for field in Field::ALL {
            assert_eq!(field.path().parse::<Field>(), Ok(field));
        }
        assert_eq!(
            "company.salary".parse::<Field>(),
            Err(UnknownField("company.salary".to_string()))
        );
    }
}
