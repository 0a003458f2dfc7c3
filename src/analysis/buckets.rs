//! Bucket discovery and range-label ordering.
//!
//! Bucket values are never hard-coded: they are read from the data, then
//! put in range order. Range labels mix three shapes, e.g. `"1 年以下"`,
//! `"3~5 年"` and `"10 年以上"`, which neither lexical nor numeric sorting
//! puts in the right order on its own.

use crate::models::{Field, Respondent};
use indexmap::IndexSet;
use std::cmp::Ordering;

/// Marks an "N or fewer" bucket.
pub const CEILING_MARKER: &str = "以下";
/// Marks an "N or more" bucket.
pub const FLOOR_MARKER: &str = "以上";

/// Distinct non-blank values of `field`, in the order they first appear.
pub fn discover_buckets(records: &[Respondent], field: Field) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.get(field))
        .map(str::to_string)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Class of a range label. Variant order is the sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum RangeKind {
    Ceiling,
    Bounded,
    Floor,
}

fn range_kind(label: &str) -> RangeKind {
    if label.contains(CEILING_MARKER) {
        RangeKind::Ceiling
    } else if label.contains(FLOOR_MARKER) {
        RangeKind::Floor
    } else {
        RangeKind::Bounded
    }
}

/// First run of ASCII digits in `label`, or 0 when there is none.
pub fn leading_number(label: &str) -> u64 {
    label
        .split(|c: char| !c.is_ascii_digit())
        .find(|part| !part.is_empty())
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

/// Range-label comparator.
///
/// Ceiling buckets come first and floor buckets last; within a class,
/// labels compare by their first embedded number.
pub fn compare_ranges(a: &str, b: &str) -> Ordering {
    range_kind(a)
        .cmp(&range_kind(b))
        .then_with(|| leading_number(a).cmp(&leading_number(b)))
}

/// Sort discovered buckets into range order. Ties keep discovery order.
pub fn order_buckets(mut buckets: Vec<String>) -> Vec<String> {
    buckets.sort_by(|a, b| compare_ranges(a, b));
    buckets
}

/// Discover and order the buckets of `field` in one step.
pub fn ordered_buckets(records: &[Respondent], field: Field) -> Vec<String> {
    order_buckets(discover_buckets(records, field))
}
