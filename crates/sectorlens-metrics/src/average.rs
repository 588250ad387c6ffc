//! Sector averages.
//!
//! The mean of each metric column is taken over present values only, via a
//! polars frame whose null-skipping `mean` matches that rule directly. A
//! column without a single value averages to `None`, never to zero.

use crate::error::{MetricsError, Result};
use polars::prelude::*;
use sectorlens_data::{CompanyRecord, Metric, SectorDataset, SectorDescriptor};
use tracing::debug;

/// A sector dataset with its synthetic average row.
///
/// Only [`average`] builds one, and it cannot be turned back into a
/// [`SectorDataset`], so a dataset is averaged at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedSectorDataset {
    dataset: SectorDataset,
    average: Option<CompanyRecord>,
}

impl AggregatedSectorDataset {
    /// Sector the rows belong to.
    pub const fn sector(&self) -> &SectorDescriptor {
        &self.dataset.sector
    }

    /// Metric column keys in source order.
    pub fn columns(&self) -> &[String] {
        &self.dataset.columns
    }

    /// Company rows, without the average.
    pub fn companies(&self) -> &[CompanyRecord] {
        &self.dataset.records
    }

    /// The synthetic average row; `None` for an empty dataset.
    pub const fn average(&self) -> Option<&CompanyRecord> {
        self.average.as_ref()
    }

    /// All rows in sheet order: companies, then the average.
    pub fn rows(&self) -> impl Iterator<Item = &CompanyRecord> {
        self.dataset.records.iter().chain(self.average.iter())
    }

    /// Number of rows including the average.
    pub fn len(&self) -> usize {
        self.dataset.len() + usize::from(self.average.is_some())
    }

    /// Whether there are no company rows.
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }
}

/// Average every metric column of `dataset`.
pub fn average_all(dataset: SectorDataset) -> Result<AggregatedSectorDataset> {
    let columns = dataset.columns.clone();
    average(dataset, &columns)
}

/// Append the sector average of `columns` to `dataset`.
///
/// Columns of the dataset that are not requested stay absent on the average
/// row. An empty dataset is returned without an average row.
///
/// # Errors
/// - `MetricsError::AlreadyAveraged` if the dataset already holds an average row
/// - `MetricsError::UnknownColumn` if a requested column is not in the dataset
pub fn average(dataset: SectorDataset, columns: &[String]) -> Result<AggregatedSectorDataset> {
    if dataset.records.iter().any(CompanyRecord::is_sector_average) {
        return Err(MetricsError::AlreadyAveraged {
            sector: dataset.sector.display_name,
        });
    }
    if let Some(unknown) = columns.iter().find(|c| !dataset.columns.contains(*c)) {
        return Err(MetricsError::UnknownColumn(unknown.clone()));
    }
    if dataset.is_empty() {
        return Ok(AggregatedSectorDataset {
            dataset,
            average: None,
        });
    }

    let means = column_means(&dataset.records, columns)?;
    let metrics = dataset
        .columns
        .iter()
        .map(|key| {
            let value = columns
                .iter()
                .position(|c| c == key)
                .and_then(|i| means[i]);
            Metric::new(key.as_str(), value)
        })
        .collect();

    debug!(
        sector = %dataset.sector,
        rows = dataset.len(),
        "computed sector average"
    );

    let average = CompanyRecord::sector_average(dataset.sector.display_name.as_str(), metrics);
    Ok(AggregatedSectorDataset {
        dataset,
        average: Some(average),
    })
}

/// Null-skipping mean of each column, in `columns` order.
fn column_means(records: &[CompanyRecord], columns: &[String]) -> Result<Vec<Option<f64>>> {
    // Positional names: header labels are not guaranteed to be unique.
    let series = columns
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let values: Vec<Option<f64>> = records.iter().map(|r| r.metric(key)).collect();
            Series::new(format!("c{i}").into(), values).into()
        })
        .collect::<Vec<Column>>();

    let frame = DataFrame::new(series)?;
    Ok(frame
        .get_columns()
        .iter()
        .map(|column| column.as_materialized_series().mean())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sectorlens_data::record::SECTOR_AVERAGE_LABEL;

    fn sector() -> SectorDescriptor {
        SectorDescriptor::new(9, "МАШИНОСТРОЕНИЕ")
    }

    fn company(name: &str, values: &[(&str, Option<f64>)]) -> CompanyRecord {
        CompanyRecord::company(
            name,
            "",
            "МАШИНОСТРОЕНИЕ",
            values.iter().map(|(k, v)| Metric::new(*k, *v)).collect(),
        )
    }

    fn keys(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_mean_of_present_values() {
        let dataset = SectorDataset::new(
            sector(),
            keys(&["2022", "2023"]),
            vec![
                company("КАМАЗ", &[("2022", Some(10.0)), ("2023", None)]),
                company("Соллерс", &[("2022", Some(4.0)), ("2023", Some(3.0))]),
                company("ОАК", &[("2022", None), ("2023", Some(5.0))]),
            ],
        );

        let aggregated = average_all(dataset).unwrap();
        let avg = aggregated.average().expect("average row");

        assert_eq!(avg.name, SECTOR_AVERAGE_LABEL);
        assert!(avg.ticker.is_empty());
        assert_eq!(avg.sector, "МАШИНОСТРОЕНИЕ");
        assert_relative_eq!(avg.metric("2022").unwrap(), 7.0);
        assert_relative_eq!(avg.metric("2023").unwrap(), 4.0);
        assert_eq!(aggregated.len(), 4);
        assert_eq!(aggregated.rows().last(), Some(avg));
    }

    #[test]
    fn test_all_absent_column_is_absent() {
        let dataset = SectorDataset::new(
            sector(),
            keys(&["P/E"]),
            vec![
                company("КАМАЗ", &[("P/E", None)]),
                company("Соллерс", &[("P/E", None)]),
            ],
        );

        let aggregated = average_all(dataset).unwrap();
        let avg = aggregated.average().expect("average row");
        assert_eq!(avg.metric("P/E"), None);
        assert_eq!(avg.metrics.len(), 1);
    }

    #[test]
    fn test_empty_dataset_unchanged() {
        let dataset = SectorDataset::empty(sector(), keys(&["P/E"]));
        let aggregated = average_all(dataset).unwrap();

        assert!(aggregated.is_empty());
        assert!(aggregated.average().is_none());
        assert_eq!(aggregated.len(), 0);
    }

    #[test]
    fn test_double_average_rejected() {
        let dataset = SectorDataset::new(
            sector(),
            keys(&["P/E"]),
            vec![company("КАМАЗ", &[("P/E", Some(8.0))])],
        );
        let aggregated = average_all(dataset).unwrap();

        let replayed = SectorDataset::new(
            aggregated.sector().clone(),
            aggregated.columns().to_vec(),
            aggregated.rows().cloned().collect(),
        );
        let result = average_all(replayed);
        assert!(matches!(result, Err(MetricsError::AlreadyAveraged { .. })));
    }

    #[test]
    fn test_unknown_column_rejected() {
        let dataset = SectorDataset::new(
            sector(),
            keys(&["P/E"]),
            vec![company("КАМАЗ", &[("P/E", Some(8.0))])],
        );
        let result = average(dataset, &keys(&["EV/EBITDA"]));
        assert!(matches!(result, Err(MetricsError::UnknownColumn(c)) if c == "EV/EBITDA"));
    }

    #[test]
    fn test_unrequested_column_stays_absent() {
        let dataset = SectorDataset::new(
            sector(),
            keys(&["2022", "2023"]),
            vec![company("КАМАЗ", &[("2022", Some(8.0)), ("2023", Some(6.0))])],
        );
        let aggregated = average(dataset, &keys(&["2023"])).unwrap();
        let avg = aggregated.average().unwrap();

        assert_eq!(avg.metric("2022"), None);
        assert_relative_eq!(avg.metric("2023").unwrap(), 6.0);
    }

    #[test]
    fn test_mean_matches_arithmetic_mean() {
        let values = [3.5, -1.25, 12.0, 0.0, 7.75, 100.5];
        let records = values
            .iter()
            .enumerate()
            .map(|(i, v)| company(&format!("c{i}"), &[("P/E", Some(*v))]))
            .collect();
        let dataset = SectorDataset::new(sector(), keys(&["P/E"]), records);

        let aggregated = average_all(dataset).unwrap();
        let expected = values.iter().sum::<f64>() / values.len() as f64;
        assert_relative_eq!(
            aggregated.average().unwrap().metric("P/E").unwrap(),
            expected,
            epsilon = 1e-12
        );
    }
}
