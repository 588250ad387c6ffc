//! Threshold filters over company rows.
//!
//! Absent values never pass a filter. Synthetic average rows are never
//! candidates either: only company rows are filtered.

use serde::{Deserialize, Serialize};
use sectorlens_data::CompanyRecord;
use tracing::debug;

/// Open interval `low < value < high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    /// Exclusive lower bound
    pub low: f64,
    /// Exclusive upper bound
    pub high: f64,
}

impl RangeFilter {
    /// Create a range filter.
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Whether `value` lies strictly inside the range.
    pub fn contains(&self, value: f64) -> bool {
        self.low < value && value < self.high
    }
}

/// A company row that passed the below-sector-average filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredRecord {
    /// The company row.
    pub record: CompanyRecord,
    /// Metric column the filter ran on.
    pub column: String,
    /// The row's value in that column.
    pub value: f64,
    /// Sector average the value was compared against.
    pub baseline: f64,
}

/// Keep company rows whose `column` value lies strictly between `low` and
/// `high`.
pub fn filter_by_absolute_range(
    records: &[CompanyRecord],
    column: &str,
    low: f64,
    high: f64,
) -> Vec<CompanyRecord> {
    let range = RangeFilter::new(low, high);
    records
        .iter()
        .filter(|r| !r.is_sector_average())
        .filter(|r| r.metric(column).is_some_and(|v| range.contains(v)))
        .cloned()
        .collect()
}

/// Keep company rows inside `(low, high)` whose `column` value is also below
/// `baseline`, annotating each with the baseline.
///
/// `baseline` is the sector average reported by the source page. Without
/// one the sector contributes nothing.
pub fn filter_relative_to_baseline(
    records: &[CompanyRecord],
    column: &str,
    baseline: Option<f64>,
    low: f64,
    high: f64,
) -> Vec<FilteredRecord> {
    let Some(baseline) = baseline else {
        debug!(column, "no baseline, nothing retained");
        return Vec::new();
    };

    filter_by_absolute_range(records, column, low, high)
        .into_iter()
        .filter_map(|record| {
            let value = record.metric(column)?;
            (value < baseline).then(|| FilteredRecord {
                column: column.to_string(),
                value,
                baseline,
                record,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use sectorlens_data::Metric;

    fn pe(name: &str, value: Option<f64>) -> CompanyRecord {
        CompanyRecord::company(name, "", "OIL&GAS", vec![Metric::new("P/E", value)])
    }

    fn sample() -> Vec<CompanyRecord> {
        vec![
            pe("a", Some(5.2)),
            pe("b", Some(20.0)),
            pe("c", None),
            pe("d", Some(0.0)),
            pe("e", Some(15.0)),
            pe("f", Some(-3.0)),
            pe("g", Some(14.9)),
            pe("h", Some(f64::MIN_POSITIVE)),
        ]
    }

    #[rstest]
    #[case(0.0, false)]
    #[case(15.0, false)]
    #[case(0.01, true)]
    #[case(14.99, true)]
    #[case(-1.0, false)]
    fn test_range_is_open(#[case] value: f64, #[case] inside: bool) {
        assert_eq!(RangeFilter::new(0.0, 15.0).contains(value), inside);
    }

    #[test]
    fn test_absolute_range() {
        let kept = filter_by_absolute_range(&sample(), "P/E", 0.0, 15.0);
        let names: Vec<&str> = kept.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "g", "h"]);

        for record in &kept {
            let value = record.metric("P/E").expect("retained rows have a value");
            assert!(0.0 < value && value < 15.0);
        }
    }

    #[test]
    fn test_absolute_range_skips_average_row() {
        let mut records = sample();
        records.push(CompanyRecord::sector_average(
            "OIL&GAS",
            vec![Metric::new("P/E", Some(7.0))],
        ));
        let kept = filter_by_absolute_range(&records, "P/E", 0.0, 15.0);
        assert!(kept.iter().all(|r| !r.is_sector_average()));
    }

    #[test]
    fn test_unknown_column_keeps_nothing() {
        assert!(filter_by_absolute_range(&sample(), "Debt/EBITDA", 0.0, 15.0).is_empty());
    }

    #[test]
    fn test_relative_to_baseline() {
        let kept = filter_relative_to_baseline(&sample(), "P/E", Some(10.0), 0.0, 15.0);
        let names: Vec<&str> = kept.iter().map(|r| r.record.name.as_str()).collect();
        assert_eq!(names, vec!["a", "h"]);

        for filtered in &kept {
            assert!(0.0 < filtered.value && filtered.value < 15.0);
            assert!(filtered.value < filtered.baseline);
            assert_eq!(filtered.baseline, 10.0);
            assert_eq!(filtered.column, "P/E");
        }
    }

    #[test]
    fn test_value_equal_to_baseline_dropped() {
        let records = vec![pe("a", Some(10.0))];
        assert!(filter_relative_to_baseline(&records, "P/E", Some(10.0), 0.0, 15.0).is_empty());
    }

    #[test]
    fn test_missing_baseline_keeps_nothing() {
        assert!(filter_relative_to_baseline(&sample(), "P/E", None, 0.0, 15.0).is_empty());
    }
}
