//! Grouping and aggregation primitives.
//!
//! Every analysis is built from the small set of pure functions in this
//! module: partition records by a categorical field, count partitions, and
//! take means of a numeric field. Groups are keyed in the order their key
//! first appears in the data.

use crate::models::{Field, Respondent};
use indexmap::IndexMap;

/// Running arithmetic mean over integer samples.
///
/// The sum and count are kept exact so that formatting can round without
/// going through a float. The sum is wider than a sample so any number of
/// `i64` samples fits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mean {
    pub sum: i128,
    pub count: usize,
}

impl Mean {
    /// Add one sample.
    pub fn push(&mut self, value: i64) {
        self.sum += i128::from(value);
        self.count += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The mean, or `None` when no sample was pushed.
    pub fn value(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.sum as f64 / self.count as f64)
        }
    }
}

impl FromIterator<i64> for Mean {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let mut mean = Mean::default();
        for value in iter {
            mean.push(value);
        }
        mean
    }
}

/// Count records per value of `field`. Records without the field are skipped.
pub fn count_by(records: &[Respondent], field: Field) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();

    for value in records.iter().filter_map(|r| r.get(field)) {
        *counts.entry(value.to_string()).or_default() += 1;
    }

    counts
}

/// Partition records by the value of `field`. Records without the field are skipped.
pub fn partition_by<'a, I>(records: I, field: Field) -> IndexMap<String, Vec<&'a Respondent>>
where
    I: IntoIterator<Item = &'a Respondent>,
{
    let mut groups: IndexMap<String, Vec<&'a Respondent>> = IndexMap::new();

    for record in records {
        if let Some(key) = record.get(field) {
            groups.entry(key.to_string()).or_default().push(record);
        }
    }

    groups
}

/// Records whose `field` equals `value` exactly.
pub fn records_where<'a>(records: &'a [Respondent], field: Field, value: &str) -> Vec<&'a Respondent> {
    records
        .iter()
        .filter(|r| r.get(field) == Some(value))
        .collect()
}

/// Mean of the numeric `field` over the records that carry a parseable value.
pub fn mean_by<'a, I>(records: I, field: Field) -> Mean
where
    I: IntoIterator<Item = &'a Respondent>,
{
    records.into_iter().filter_map(|r| r.get_int(field)).collect()
}

/// Two-key aggregation: for each bucket of `bucket_field`, the mean of
/// `value_field` within each requested value of `sub_field`.
///
/// Buckets are visited in the given order and every requested sub-key is
/// present in each row, with an empty [`Mean`] when no record matched.
/// Buckets with no records at all are left out.
pub fn bucketed_means(
    records: &[Respondent],
    buckets: &[String],
    bucket_field: Field,
    sub_field: Field,
    sub_keys: &[String],
    value_field: Field,
) -> Vec<(String, IndexMap<String, Mean>)> {
    let mut rows = Vec::with_capacity(buckets.len());

    for bucket in buckets {
        let selected = records_where(records, bucket_field, bucket);
        if selected.is_empty() {
            continue;
        }

        let groups = partition_by(selected, sub_field);
        let cells = sub_keys
            .iter()
            .map(|key| {
                let mean = groups
                    .get(key)
                    .map(|group| mean_by(group.iter().copied(), value_field))
                    .unwrap_or_default();
                (key.clone(), mean)
            })
            .collect();

        rows.push((bucket.clone(), cells));
    }

    rows
}

/// Sort `(key, count)` entries by count, highest first. Equal counts keep their order.
pub fn sort_by_count_desc(counts: IndexMap<String, usize>) -> IndexMap<String, usize> {
    let mut entries: Vec<_> = counts.into_iter().collect();
    entries.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    entries.into_iter().collect()
}
