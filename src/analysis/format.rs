//! Display formatting for aggregates.
//!
//! All rounding is half-up and done in integer arithmetic, so the same
//! aggregate always renders to the same string.

use super::aggregator::Mean;

/// Rendered in place of a mean when the group had no usable samples.
pub const NO_DATA: &str = "無資料";

/// Integer percentage of `count` in `total`, e.g. `"13%"` for 1 of 8.
pub fn percent(count: usize, total: usize) -> String {
    format!("{}%", percent_value(count, total))
}

/// `round_half_up(count * 100 / total)`; 0 when `total` is 0.
pub fn percent_value(count: usize, total: usize) -> u64 {
    if total == 0 {
        return 0;
    }
    let (count, total) = (count as u64, total as u64);
    (200 * count + total) / (2 * total)
}

/// Mean rounded half-up to one decimal place, e.g. `"4.3"` for 13 / 3.
///
/// Returns `None` for an empty mean.
pub fn one_decimal(mean: &Mean) -> Option<String> {
    if mean.is_empty() {
        return None;
    }
    let count = mean.count as i128;
    let tenths = (20 * mean.sum + count).div_euclid(2 * count);
    let sign = if tenths < 0 { "-" } else { "" };
    let tenths = tenths.unsigned_abs();
    Some(format!("{}{}.{}", sign, tenths / 10, tenths % 10))
}

/// Satisfaction score with unit, or [`NO_DATA`].
pub fn score(mean: &Mean) -> String {
    match one_decimal(mean) {
        Some(value) => format!("{}分", value),
        None => NO_DATA.to_string(),
    }
}

/// Count of establishments.
pub fn establishments(count: usize) -> String {
    format!("{}間", count)
}

/// Count of people.
pub fn people(count: usize) -> String {
    format!("{}人", count)
}

pub fn filled(count: usize) -> String {
    format!("有寫{}人", count)
}

pub fn unfilled(count: usize) -> String {
    format!("沒寫{}人", count)
}

/// Display label for a tenure bucket: whitespace dropped, prefixed with "工作經驗".
pub fn tenure_label(tenure: &str) -> String {
    let compact: String = tenure.split_whitespace().collect();
    format!("工作經驗{}", compact)
}

/// Result key for the mean salary satisfaction of one work arrangement.
pub fn work_mode_key(mode: &str) -> String {
    format!("{}的平均薪水滿意度", mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounds_half_up() {
        assert_eq!(percent(1, 8), "13%");
        assert_eq!(percent(2, 4), "50%");
        assert_eq!(percent(1, 3), "33%");
        assert_eq!(percent(2, 3), "67%");
        assert_eq!(percent(1, 200), "1%");
        assert_eq!(percent(1, 201), "0%");
    }

    #[test]
    fn test_percent_of_empty_total() {
        assert_eq!(percent(0, 0), "0%");
    }

    #[test]
    fn test_percentages_of_partition_sum_near_100() {
        let counts = [1usize, 1, 1];
        let total: usize = counts.iter().sum();
        let sum: u64 = counts.iter().map(|c| percent_value(*c, total)).sum();
        assert!((100 - (counts.len() as u64 - 1)..=100 + (counts.len() as u64 - 1)).contains(&sum));
    }

    #[test]
    fn test_score() {
        assert_eq!(score(&Mean { sum: 8, count: 2 }), "4.0分");
        assert_eq!(score(&Mean { sum: 13, count: 3 }), "4.3分");
        assert_eq!(score(&Mean { sum: 9, count: 4 }), "2.3分");
        assert_eq!(score(&Mean { sum: 7, count: 4 }), "1.8分");
        assert_eq!(score(&Mean::default()), NO_DATA);
    }

    #[test]
    fn test_one_decimal_negative() {
        assert_eq!(one_decimal(&Mean { sum: -3, count: 2 }).as_deref(), Some("-1.5"));
    }

    #[test]
    fn test_labels() {
        assert_eq!(establishments(3), "3間");
        assert_eq!(people(12), "12人");
        assert_eq!(filled(5), "有寫5人");
        assert_eq!(unfilled(0), "沒寫0人");
        assert_eq!(tenure_label("3~5 年"), "工作經驗3~5年");
        assert_eq!(tenure_label(" 1 年 以下 "), "工作經驗1年以下");
        assert_eq!(work_mode_key("遠端工作"), "遠端工作的平均薪水滿意度");
    }
}
