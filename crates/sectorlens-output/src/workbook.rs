//! Workbook assembly.
//!
//! Sheets are rendered as soon as they are added, each into its own
//! worksheet. A sheet that fails to render is dropped whole and never
//! reaches the workbook; the rest of the report is unaffected.

use crate::error::{OutputError, Result};
use crate::sheet::SheetNames;
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, Worksheet};
use sectorlens_data::CompanyRecord;
use sectorlens_metrics::{AggregatedSectorDataset, FilteredRecord};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Leading columns of every sheet.
pub const BASE_HEADERS: [&str; 3] = ["Name", "Ticker", "Sector"];

/// Header of the baseline column on the summary sheet.
pub const BASELINE_HEADER: &str = "Sector average";

/// A written workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookArtifact {
    /// Where the workbook was saved.
    pub path: PathBuf,
    /// Sheet names in workbook order.
    pub sheets: Vec<String>,
}

/// Builds the report workbook for one run.
///
/// [`finalize`](Self::finalize) consumes the builder, so the workbook is
/// written exactly once and nothing can be added afterwards.
pub struct ReportBuilder {
    path: PathBuf,
    names: SheetNames,
    summary: Option<(String, Worksheet)>,
    sectors: Vec<(String, Worksheet)>,
    header: Format,
    text: Format,
    number: Format,
    average: Format,
    average_number: Format,
}

impl ReportBuilder {
    /// Start a workbook to be saved at `path`.
    ///
    /// # Errors
    /// Returns `OutputError::OutputDir` if the parent directory does not
    /// exist.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        if !dir.is_dir() {
            return Err(OutputError::OutputDir(dir.to_path_buf()));
        }

        Ok(Self {
            path,
            names: SheetNames::new(),
            summary: None,
            sectors: Vec::new(),
            header: Format::new().set_bold(),
            text: Format::new(),
            number: Format::new().set_num_format("0.00"),
            average: Format::new().set_bold(),
            average_number: Format::new().set_bold().set_num_format("0.00"),
        })
    }

    /// Output path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of the sheets added so far, in insertion order.
    pub fn sheet_names(&self) -> &[String] {
        self.names.names()
    }

    /// Add the sheet of one sector, named after `sector_name`.
    ///
    /// Returns the sheet name actually used.
    ///
    /// # Errors
    /// - `OutputError::EmptySheet` if the sector has no company rows
    /// - `OutputError::Xlsx` if the sheet cannot be rendered
    pub fn add_sector_sheet(
        &mut self,
        sector_name: &str,
        dataset: AggregatedSectorDataset,
    ) -> Result<String> {
        if dataset.is_empty() {
            return Err(OutputError::EmptySheet(sector_name.to_string()));
        }

        let name = self.names.next_free(sector_name);
        let sheet = self.render_sector(&name, &dataset)?;
        self.names.insert(name.clone());
        debug!(sheet = %name, rows = dataset.len(), "sector sheet added");
        self.sectors.push((name.clone(), sheet));
        Ok(name)
    }

    /// Add the cross-sector summary sheet. It is placed first in the
    /// workbook.
    ///
    /// # Errors
    /// - `OutputError::EmptySheet` if `records` is empty
    /// - `OutputError::DuplicateSummary` if a summary sheet was already added
    /// - `OutputError::Xlsx` if the sheet cannot be rendered
    pub fn add_filtered_sheet(&mut self, name: &str, records: Vec<FilteredRecord>) -> Result<String> {
        if let Some((existing, _)) = &self.summary {
            return Err(OutputError::DuplicateSummary(existing.clone()));
        }
        if records.is_empty() {
            return Err(OutputError::EmptySheet(name.to_string()));
        }

        let name = self.names.next_free(name);
        let sheet = self.render_filtered(&name, &records)?;
        self.names.insert(name.clone());
        debug!(sheet = %name, rows = records.len(), "summary sheet added");
        self.summary = Some((name.clone(), sheet));
        Ok(name)
    }

    /// Save the workbook.
    ///
    /// # Errors
    /// - `OutputError::NoSheets` if no sheet was added; nothing is written
    /// - `OutputError::Xlsx` if the file cannot be written
    pub fn finalize(self) -> Result<WorkbookArtifact> {
        if self.summary.is_none() && self.sectors.is_empty() {
            return Err(OutputError::NoSheets(self.path));
        }

        let mut workbook = Workbook::new();
        let mut sheets = Vec::with_capacity(self.sectors.len() + 1);

        for (name, sheet) in self.summary.into_iter().chain(self.sectors) {
            workbook.push_worksheet(sheet);
            sheets.push(name);
        }

        workbook.save(&self.path)?;
        info!(path = %self.path.display(), sheets = sheets.len(), "workbook saved");

        Ok(WorkbookArtifact {
            path: self.path,
            sheets,
        })
    }

    fn render_sector(&self, name: &str, dataset: &AggregatedSectorDataset) -> Result<Worksheet> {
        let mut sheet = Worksheet::new();
        sheet.set_name(name)?;

        let headers = BASE_HEADERS
            .iter()
            .copied()
            .chain(dataset.columns().iter().map(String::as_str));
        self.write_header(&mut sheet, headers)?;

        for (i, record) in dataset.rows().enumerate() {
            let values = dataset.columns().iter().map(|key| record.metric(key));
            self.write_record(&mut sheet, i + 1, record, values)?;
        }

        sheet.set_freeze_panes(1, 0)?;
        sheet.autofit();
        Ok(sheet)
    }

    fn render_filtered(&self, name: &str, records: &[FilteredRecord]) -> Result<Worksheet> {
        let mut sheet = Worksheet::new();
        sheet.set_name(name)?;

        let metric = records.first().map_or("Value", |r| r.column.as_str());
        let headers = BASE_HEADERS
            .iter()
            .copied()
            .chain([metric, BASELINE_HEADER]);
        self.write_header(&mut sheet, headers)?;

        for (i, filtered) in records.iter().enumerate() {
            let values = [Some(filtered.value), Some(filtered.baseline)];
            self.write_record(&mut sheet, i + 1, &filtered.record, values.into_iter())?;
        }

        sheet.set_freeze_panes(1, 0)?;
        sheet.autofit();
        Ok(sheet)
    }

    fn write_header<'a>(
        &self,
        sheet: &mut Worksheet,
        headers: impl Iterator<Item = &'a str>,
    ) -> Result<()> {
        for (col, title) in headers.enumerate() {
            let (row, col) = cell(0, col)?;
            sheet.write_string_with_format(row, col, title, &self.header)?;
        }
        Ok(())
    }

    fn write_record(
        &self,
        sheet: &mut Worksheet,
        row: usize,
        record: &CompanyRecord,
        values: impl Iterator<Item = Option<f64>>,
    ) -> Result<()> {
        let (text, number) = if record.is_sector_average() {
            (&self.average, &self.average_number)
        } else {
            (&self.text, &self.number)
        };

        for (col, field) in [&record.name, &record.ticker, &record.sector]
            .into_iter()
            .enumerate()
        {
            if field.is_empty() {
                continue;
            }
            let (r, c) = cell(row, col)?;
            sheet.write_string_with_format(r, c, field.as_str(), text)?;
        }

        for (offset, value) in values.enumerate() {
            // Absent values stay blank.
            if let Some(value) = value {
                let (r, c) = cell(row, BASE_HEADERS.len() + offset)?;
                sheet.write_number_with_format(r, c, value, number)?;
            }
        }
        Ok(())
    }
}

fn cell(row: usize, col: usize) -> Result<(RowNum, ColNum)> {
    match (RowNum::try_from(row), ColNum::try_from(col)) {
        (Ok(r), Ok(c)) => Ok((r, c)),
        _ => Err(OutputError::CellRange { row, col }),
    }
}

impl fmt::Debug for ReportBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportBuilder")
            .field("path", &self.path)
            .field("sheets", &self.names.names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sectorlens_data::{Metric, SectorDataset, SectorDescriptor};
    use sectorlens_metrics::average_all;

    fn aggregated(id: u32, name: &str, values: &[Option<f64>]) -> AggregatedSectorDataset {
        let records = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                CompanyRecord::company(format!("Компания {i}"), "", name, vec![Metric::new("P/E", *v)])
            })
            .collect();
        let dataset = SectorDataset::new(SectorDescriptor::new(id, name), vec!["P/E".into()], records);
        average_all(dataset).unwrap()
    }

    fn temp_path(file: &str) -> PathBuf {
        std::env::temp_dir().join(file)
    }

    #[test]
    fn test_missing_output_dir() {
        let result = ReportBuilder::create("/definitely/not/a/dir/report.xlsx");
        assert!(matches!(result, Err(OutputError::OutputDir(_))));
    }

    #[test]
    fn test_relative_path_uses_current_dir() {
        assert!(ReportBuilder::create("report.xlsx").is_ok());
    }

    #[test]
    fn test_empty_sector_sheet_rejected() {
        let mut builder = ReportBuilder::create(temp_path("sectorlens_empty.xlsx")).unwrap();
        let result = builder.add_sector_sheet("БАНКИ", aggregated(2, "БАНКИ", &[]));
        assert!(matches!(result, Err(OutputError::EmptySheet(_))));
        assert!(builder.sheet_names().is_empty());
    }

    #[test]
    fn test_sheet_names_sanitized_and_unique() {
        let mut builder = ReportBuilder::create(temp_path("sectorlens_names.xlsx")).unwrap();
        let first = builder
            .add_sector_sheet("Э/ГЕНЕРАЦИЯ", aggregated(4, "Э/ГЕНЕРАЦИЯ", &[Some(3.0)]))
            .unwrap();
        let second = builder
            .add_sector_sheet("Э:ГЕНЕРАЦИЯ", aggregated(40, "Э:ГЕНЕРАЦИЯ", &[Some(4.0)]))
            .unwrap();

        assert_eq!(first, "Э ГЕНЕРАЦИЯ");
        assert_eq!(second, "Э ГЕНЕРАЦИЯ (2)");
    }

    #[test]
    fn test_duplicate_summary_rejected() {
        let record = FilteredRecord {
            record: CompanyRecord::company("Лукойл", "LKOH", "НЕФТЕГАЗ", Vec::new()),
            column: "P/E".to_string(),
            value: 5.2,
            baseline: 10.0,
        };
        let mut builder = ReportBuilder::create(temp_path("sectorlens_summary.xlsx")).unwrap();
        builder.add_filtered_sheet("P_E < 15", vec![record.clone()]).unwrap();
        let again = builder.add_filtered_sheet("P_E < 15", vec![record]);
        assert!(matches!(again, Err(OutputError::DuplicateSummary(_))));
    }

    #[test]
    fn test_finalize_orders_summary_first() {
        let path = temp_path("sectorlens_order.xlsx");
        let mut builder = ReportBuilder::create(&path).unwrap();
        builder
            .add_sector_sheet("НЕФТЕГАЗ", aggregated(1, "НЕФТЕГАЗ", &[Some(5.2), None]))
            .unwrap();
        builder
            .add_filtered_sheet(
                "P_E < 15",
                vec![FilteredRecord {
                    record: CompanyRecord::company("Лукойл", "LKOH", "НЕФТЕГАЗ", Vec::new()),
                    column: "P/E".to_string(),
                    value: 5.2,
                    baseline: 10.0,
                }],
            )
            .unwrap();

        let artifact = builder.finalize().unwrap();
        assert_eq!(artifact.sheets, vec!["P_E < 15", "НЕФТЕГАЗ"]);
        assert!(artifact.path.exists());

        std::fs::remove_file(path).ok();
    }
}
