//! The survey analyses.
//!
//! Each function here is a pure computation over an immutable slice of
//! records and returns a display-ready, insertion-ordered structure.
//! Records that lack a field an analysis needs are skipped by that analysis
//! only.

use super::aggregator::{
    bucketed_means, count_by, mean_by, records_where, sort_by_count_desc, Mean,
};
use super::buckets::ordered_buckets;
use super::format;
use crate::models::{Field, Respondent, FEMALE, MALE};
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Mean salary satisfaction per age bracket.
///
/// With no brackets given, every bracket present in the data is reported
/// in range order. A bracket with no usable scores reports 0.
pub fn age_salary(records: &[Respondent], age_ranges: &[String]) -> IndexMap<String, f64> {
    let ranges = if age_ranges.is_empty() {
        ordered_buckets(records, Field::Age)
    } else {
        age_ranges.to_vec()
    };

    ranges
        .into_iter()
        .map(|range| {
            let group = records_where(records, Field::Age, &range);
            let average = mean_by(group, Field::SalaryScore).value().unwrap_or(0.0);
            (range, average)
        })
        .collect()
}

/// Headcount per education level.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EducationDistribution {
    /// Counts, highest first.
    pub counts: IndexMap<String, usize>,
    /// Number of records with an education level.
    pub total: usize,
}

pub fn education(records: &[Respondent]) -> EducationDistribution {
    let counts = sort_by_count_desc(count_by(records, Field::Education));
    let total = counts.values().sum();
    EducationDistribution { counts, total }
}

/// Gender split and mean satisfaction within one industry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryGender {
    #[serde(rename = "男性比例")]
    pub male_ratio: String,
    #[serde(rename = "女性比例")]
    pub female_ratio: String,
    #[serde(rename = "男性產業滿意度")]
    pub male_avg_score: String,
    #[serde(rename = "女性產業滿意度")]
    pub female_avg_score: String,
}

#[derive(Default)]
struct GenderTally {
    male: usize,
    female: usize,
    male_score: Mean,
    female_score: Mean,
}

/// Per-industry gender ratio and mean overall satisfaction.
///
/// Ratios are over respondents reporting either gender label. A record
/// without a parseable score still counts toward the ratio.
pub fn industry_gender(records: &[Respondent]) -> IndexMap<String, IndustryGender> {
    let mut tallies: IndexMap<String, GenderTally> = IndexMap::new();

    for record in records {
        let Some(industry) = record.get(Field::Industry) else {
            continue;
        };
        let tally = tallies.entry(industry.to_string()).or_default();
        let score = record.get_int(Field::Score);

        match record.get(Field::Gender) {
            Some(MALE) => {
                tally.male += 1;
                if let Some(score) = score {
                    tally.male_score.push(score);
                }
            }
            Some(FEMALE) => {
                tally.female += 1;
                if let Some(score) = score {
                    tally.female_score.push(score);
                }
            }
            _ => {}
        }
    }

    tallies
        .into_iter()
        .map(|(industry, tally)| {
            let total = tally.male + tally.female;
            let stats = IndustryGender {
                male_ratio: format::percent(tally.male, total),
                female_ratio: format::percent(tally.female, total),
                male_avg_score: format::score(&tally.male_score),
                female_avg_score: format::score(&tally.female_score),
            };
            (industry, stats)
        })
        .collect()
}

/// Unfilled half of [`MessageStatus`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unfilled {
    pub no: String,
}

/// Completion of the free-text industry comment, serialized as
/// `["有寫<n>人", {"no": "沒寫<m>人"}]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageStatus(pub String, pub Unfilled);

impl MessageStatus {
    pub fn from_counts(filled: usize, unfilled: usize) -> Self {
        MessageStatus(
            format::filled(filled),
            Unfilled {
                no: format::unfilled(unfilled),
            },
        )
    }
}

impl Default for MessageStatus {
    fn default() -> Self {
        Self::from_counts(0, 0)
    }
}

pub fn industry_message(records: &[Respondent]) -> MessageStatus {
    let filled = records
        .iter()
        .filter(|r| r.has(Field::IndustryMessage))
        .count();
    MessageStatus::from_counts(filled, records.len() - filled)
}

/// Establishment count per industry and work arrangement.
///
/// Every label in `labels` appears for each industry, zero or not. Other
/// arrangements found in the data are appended after them.
pub fn workplace(
    records: &[Respondent],
    labels: &[String],
) -> IndexMap<String, IndexMap<String, String>> {
    let mut counts: IndexMap<String, IndexMap<String, usize>> = IndexMap::new();

    for record in records {
        let Some(industry) = record.get(Field::Industry) else {
            continue;
        };
        let row = counts
            .entry(industry.to_string())
            .or_insert_with(|| labels.iter().map(|l| (l.clone(), 0)).collect());
        if let Some(work) = record.get(Field::Work) {
            *row.entry(work.to_string()).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .map(|(industry, row)| {
            let row = row
                .into_iter()
                .map(|(label, n)| (label, format::establishments(n)))
                .collect();
            (industry, row)
        })
        .collect()
}

/// Mean salary satisfaction per work arrangement within one tenure bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct TenureSalary {
    /// Bucket value as found in the data.
    pub tenure: String,
    /// Display label, e.g. `"工作經驗1年以下"`.
    pub label: String,
    /// Formatted mean per arrangement key, in the requested order.
    pub averages: IndexMap<String, String>,
}

impl Serialize for TenureSalary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.label, &self.averages)?;
        map.end()
    }
}

/// Salary satisfaction by tenure, compared across work arrangements.
///
/// Tenure buckets are discovered from the data and put in range order;
/// an arrangement with no usable scores in a bucket reports the no-data
/// sentinel.
pub fn tenure_salary(records: &[Respondent], work_modes: &[String]) -> Vec<TenureSalary> {
    let buckets = ordered_buckets(records, Field::JobTenure);

    bucketed_means(
        records,
        &buckets,
        Field::JobTenure,
        Field::Work,
        work_modes,
        Field::SalaryScore,
    )
    .into_iter()
    .map(|(tenure, cells)| TenureSalary {
        label: format::tenure_label(&tenure),
        averages: cells
            .iter()
            .map(|(mode, mean)| (format::work_mode_key(mode), format::score(mean)))
            .collect(),
        tenure,
    })
    .collect()
}

/// Share of respondents per region, highest first.
pub fn region(records: &[Respondent]) -> IndexMap<String, String> {
    let counts = sort_by_count_desc(count_by(records, Field::Area));
    let total: usize = counts.values().sum();

    counts
        .into_iter()
        .map(|(area, n)| (area, format::percent(n, total)))
        .collect()
}
