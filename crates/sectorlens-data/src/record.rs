//! Typed company rows and per-sector datasets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name used for the synthetic sector-average row.
pub const SECTOR_AVERAGE_LABEL: &str = "СРЕДНЕЕ ПО СЕКТОРУ";

/// A sector as listed by the data source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectorDescriptor {
    /// Source sector id (`sector_id[]` query parameter).
    pub id: u32,
    /// Human-readable sector name.
    pub display_name: String,
}

impl SectorDescriptor {
    /// Create a new sector descriptor.
    pub fn new(id: u32, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}

impl fmt::Display for SectorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.display_name, self.id)
    }
}

/// What a record stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// A listed company.
    Company,
    /// The synthetic per-sector average appended by the aggregator.
    SectorAverage,
}

/// One metric cell: a column key and its value, if the cell held a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Column key, e.g. `"P/E"` or a year label such as `"2023"`.
    pub key: String,
    /// Finite value, or `None` when the cell was empty or not numeric.
    pub value: Option<f64>,
}

impl Metric {
    /// Create a new metric cell.
    pub fn new(key: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// A row of a sector table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Company name.
    pub name: String,
    /// Exchange ticker; empty when the source has none.
    pub ticker: String,
    /// Display name of the sector the row was fetched for.
    pub sector: String,
    /// Company row or synthetic average.
    pub kind: RecordKind,
    /// Metric cells in source column order.
    pub metrics: Vec<Metric>,
}

impl CompanyRecord {
    /// Create a company row.
    pub fn company(
        name: impl Into<String>,
        ticker: impl Into<String>,
        sector: impl Into<String>,
        metrics: Vec<Metric>,
    ) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
            sector: sector.into(),
            kind: RecordKind::Company,
            metrics,
        }
    }

    /// Create the synthetic sector-average row.
    pub fn sector_average(sector: impl Into<String>, metrics: Vec<Metric>) -> Self {
        Self {
            name: SECTOR_AVERAGE_LABEL.to_string(),
            ticker: String::new(),
            sector: sector.into(),
            kind: RecordKind::SectorAverage,
            metrics,
        }
    }

    /// Value of the metric column `key`, if present and numeric.
    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics
            .iter()
            .find(|m| m.key == key)
            .and_then(|m| m.value)
    }

    /// Whether this is the synthetic sector-average row.
    pub fn is_sector_average(&self) -> bool {
        self.kind == RecordKind::SectorAverage
    }
}

/// Company rows parsed from one sector page, in table order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorDataset {
    /// Sector the page was fetched for.
    pub sector: SectorDescriptor,
    /// Metric column keys in source order.
    pub columns: Vec<String>,
    /// Rows in table order.
    pub records: Vec<CompanyRecord>,
}

impl SectorDataset {
    /// Create a dataset.
    pub const fn new(
        sector: SectorDescriptor,
        columns: Vec<String>,
        records: Vec<CompanyRecord>,
    ) -> Self {
        Self {
            sector,
            columns,
            records,
        }
    }

    /// Dataset with no rows, used when a page could not be loaded.
    pub const fn empty(sector: SectorDescriptor, columns: Vec<String>) -> Self {
        Self::new(sector, columns, Vec::new())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_lookup() {
        let record = CompanyRecord::company(
            "Лукойл",
            "LKOH",
            "НЕФТЕГАЗ",
            vec![Metric::new("2022", Some(4.1)), Metric::new("2023", None)],
        );

        assert_eq!(record.metric("2022"), Some(4.1));
        assert_eq!(record.metric("2023"), None);
        assert_eq!(record.metric("2024"), None);
        assert!(!record.is_sector_average());
    }

    #[test]
    fn test_sector_average_row() {
        let record = CompanyRecord::sector_average("БАНКИ", vec![Metric::new("P/E", Some(6.0))]);

        assert_eq!(record.name, SECTOR_AVERAGE_LABEL);
        assert!(record.ticker.is_empty());
        assert!(record.is_sector_average());
    }

    #[test]
    fn test_descriptor_display() {
        let sector = SectorDescriptor::new(2, "БАНКИ");
        assert_eq!(format!("{sector}"), "БАНКИ (#2)");
    }
}
