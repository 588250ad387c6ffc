//! The report run.
//!
//! For each sector of the catalog, strictly in order:
//!
//! 1. load the sheet view; when the table is there, parse it, append the
//!    sector average and add the sector's sheet
//! 2. when the plan has a filter, load the filter view and keep the
//!    companies inside the range and below the page's own sector average
//!
//! A missing table, an empty sector or a sheet that fails to render is
//! logged and counted; the run always carries on to the next sector.
//! After the last sector the collected rows become the summary sheet.
//! Saving the workbook is left to the caller.

use crate::error::Result;
use crate::universe::SectorCatalog;
use crate::view::{FilterSpec, ReportPlan, ViewSpec};
use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use sectorlens_data::{
    FetchOutcome, PageSession, ParsedSector, SectorDescriptor, SectorFetcher, SectorTableParser,
};
use sectorlens_metrics::{AggregatedSectorDataset, FilteredRecord, average_all, filter_relative_to_baseline};
use sectorlens_output::{OutputError, ReportBuilder, WorkbookArtifact};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Largest difference at which the source and recomputed averages are
/// considered equal.
const AVERAGE_TOLERANCE: f64 = 1e-6;

/// A sector sheet added to the workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenSheet {
    /// Sheet name.
    pub name: String,
    /// Company rows on the sheet, not counting the average row.
    pub companies: usize,
}

/// Outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Report name.
    pub report: &'static str,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the last sector was done.
    pub finished_at: DateTime<Utc>,
    /// Sectors in the catalog.
    pub sectors: usize,
    /// Sector sheets written, in order.
    pub sheets: Vec<WrittenSheet>,
    /// Sectors whose sheet view had no table.
    pub not_found: Vec<String>,
    /// Sectors whose table had no company rows.
    pub empty: Vec<String>,
    /// Sheets that failed to render.
    pub failed_sheets: Vec<String>,
    /// Sectors whose filter view had no table.
    pub filter_not_found: Vec<String>,
    /// Sectors whose filter view had no source average.
    pub missing_baseline: Vec<String>,
    /// Rows on the summary sheet.
    pub filtered: Vec<FilteredRecord>,
    /// Name of the summary sheet, if one was added.
    pub summary_sheet: Option<String>,
    /// Saved workbook, once the caller has finalized it.
    pub output: Option<PathBuf>,
}

impl RunSummary {
    fn start(report: &'static str, sectors: usize) -> Self {
        let now = Utc::now();
        Self {
            report,
            started_at: now,
            finished_at: now,
            sectors,
            sheets: Vec::new(),
            not_found: Vec::new(),
            empty: Vec::new(),
            failed_sheets: Vec::new(),
            filter_not_found: Vec::new(),
            missing_baseline: Vec::new(),
            filtered: Vec::new(),
            summary_sheet: None,
            output: None,
        }
    }

    /// Wall time of the run.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Record where the workbook was saved.
    pub fn record_output(&mut self, artifact: &WorkbookArtifact) {
        self.output = Some(artifact.path.clone());
    }

    /// Finalize `builder` and record the saved path.
    ///
    /// A run that produced no sheet writes no file; `output` stays `None`.
    ///
    /// # Errors
    /// Returns `PipelineError::Output` if the workbook cannot be saved.
    pub fn save(&mut self, builder: ReportBuilder) -> Result<()> {
        match builder.finalize() {
            Ok(artifact) => {
                self.record_output(&artifact);
                Ok(())
            }
            Err(OutputError::NoSheets(path)) => {
                warn!(path = %path.display(), "no sheets, nothing to write");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Names of the sector sheets written, in order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Rows on the summary sheet.
    pub fn filtered_rows(&self) -> usize {
        self.filtered.len()
    }

    /// Whether every sector produced its sheet.
    pub fn is_complete(&self) -> bool {
        self.not_found.is_empty() && self.empty.is_empty() && self.failed_sheets.is_empty()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Report: {}", self.report)?;
        writeln!(f, "  Sectors:        {}", self.sectors)?;
        writeln!(f, "  Sheets written: {}", self.sheets.len())?;
        if !self.not_found.is_empty() {
            writeln!(f, "  No table:       {}", self.not_found.join(", "))?;
        }
        if !self.empty.is_empty() {
            writeln!(f, "  Empty:          {}", self.empty.join(", "))?;
        }
        if !self.failed_sheets.is_empty() {
            writeln!(f, "  Failed sheets:  {}", self.failed_sheets.join(", "))?;
        }
        if let Some(sheet) = &self.summary_sheet {
            writeln!(f, "  {sheet}: {} companies", self.filtered_rows())?;
        }
        write!(f, "  Elapsed:        {:.1}s", self.elapsed().num_milliseconds() as f64 / 1000.0)?;
        match &self.output {
            Some(path) => write!(f, "\n  Saved to:       {}", path.display()),
            None => write!(f, "\n  Nothing to write, no workbook saved"),
        }
    }
}

/// Drives one report over a sector catalog.
///
/// The fetcher, and the session inside it, is borrowed for the run and
/// stays with the caller.
#[derive(Debug)]
pub struct Pipeline<'a, S> {
    fetcher: &'a mut SectorFetcher<S>,
    plan: ReportPlan,
    progress: Option<ProgressBar>,
}

impl<'a, S: PageSession> Pipeline<'a, S> {
    /// Create a pipeline for `plan`.
    pub const fn new(fetcher: &'a mut SectorFetcher<S>, plan: ReportPlan) -> Self {
        Self {
            fetcher,
            plan,
            progress: None,
        }
    }

    /// Advance `progress` by one per sector.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Process every sector of `catalog` into `builder`.
    pub async fn run(&mut self, catalog: &SectorCatalog, builder: &mut ReportBuilder) -> RunSummary {
        let mut summary = RunSummary::start(self.plan.title, catalog.len());
        let mut filtered = Vec::new();

        info!(report = self.plan.title, sectors = catalog.len(), "starting run");

        for sector in catalog {
            if let Some(pb) = &self.progress {
                pb.set_message(sector.display_name.clone());
            }

            self.sector_sheet(sector, builder, &mut summary).await;
            if let Some(filter) = self.plan.filter {
                filtered.extend(self.filter_sector(sector, &filter, &mut summary).await);
            }

            if let Some(pb) = &self.progress {
                pb.inc(1);
            }
        }

        if let Some(filter) = self.plan.filter {
            add_summary_sheet(builder, &filter, filtered, &mut summary);
        }

        summary.finished_at = Utc::now();
        info!(
            report = self.plan.title,
            sheets = summary.sheets.len(),
            skipped = summary.not_found.len() + summary.empty.len(),
            failed = summary.failed_sheets.len(),
            "run complete"
        );
        summary
    }

    async fn load(&mut self, sector: &SectorDescriptor, view: &ViewSpec) -> Option<ParsedSector> {
        match self.fetcher.fetch(sector, &view.page).await {
            FetchOutcome::Found(table) => {
                Some(SectorTableParser::new(view.kind).parse(&table, sector))
            }
            FetchOutcome::NotFound => None,
        }
    }

    async fn sector_sheet(
        &mut self,
        sector: &SectorDescriptor,
        builder: &mut ReportBuilder,
        summary: &mut RunSummary,
    ) {
        let name = &sector.display_name;
        let view = self.plan.sheet;
        let Some(parsed) = self.load(sector, &view).await else {
            summary.not_found.push(name.clone());
            return;
        };

        let reported: Vec<(String, f64)> = parsed
            .dataset
            .columns
            .iter()
            .filter_map(|c| parsed.baseline(c).map(|v| (c.clone(), v)))
            .collect();
        let aggregated = match average_all(parsed.dataset) {
            Ok(aggregated) => aggregated,
            Err(e) => {
                warn!(sector = %sector, error = %e, "averaging failed, sheet skipped");
                summary.failed_sheets.push(name.clone());
                return;
            }
        };
        log_average_divergence(&reported, &aggregated);

        let companies = aggregated.companies().len();
        match builder.add_sector_sheet(name, aggregated) {
            Ok(sheet) => {
                info!(sector = %sector, %sheet, companies, "sector sheet written");
                summary.sheets.push(WrittenSheet {
                    name: sheet,
                    companies,
                });
            }
            Err(OutputError::EmptySheet(_)) => {
                info!(sector = %sector, "no company rows, no sheet");
                summary.empty.push(name.clone());
            }
            Err(e) => {
                warn!(sector = %sector, error = %e, "failed to write sector sheet");
                summary.failed_sheets.push(name.clone());
            }
        }
    }

    async fn filter_sector(
        &mut self,
        sector: &SectorDescriptor,
        filter: &FilterSpec,
        summary: &mut RunSummary,
    ) -> Vec<FilteredRecord> {
        let Some(parsed) = self.load(sector, &filter.view).await else {
            summary.filter_not_found.push(sector.display_name.clone());
            return Vec::new();
        };

        let baseline = parsed.baseline(filter.column);
        if baseline.is_none() {
            info!(sector = %sector, column = filter.column, "no source average, sector left out of summary");
            summary.missing_baseline.push(sector.display_name.clone());
        }

        let kept = filter_relative_to_baseline(
            &parsed.dataset.records,
            filter.column,
            baseline,
            filter.range.low,
            filter.range.high,
        );
        debug!(sector = %sector, kept = kept.len(), ?baseline, "filtered sector");
        kept
    }
}

fn add_summary_sheet(
    builder: &mut ReportBuilder,
    filter: &FilterSpec,
    filtered: Vec<FilteredRecord>,
    summary: &mut RunSummary,
) {
    if filtered.is_empty() {
        info!(sheet = filter.sheet_name, "no company passed the filter, no summary sheet");
        return;
    }

    let rows = filtered.len();
    match builder.add_filtered_sheet(filter.sheet_name, filtered.clone()) {
        Ok(sheet) => {
            info!(%sheet, rows, "summary sheet written");
            summary.filtered = filtered;
            summary.summary_sheet = Some(sheet);
        }
        Err(e) => {
            warn!(sheet = filter.sheet_name, error = %e, "failed to write summary sheet");
            summary.failed_sheets.push(filter.sheet_name.to_string());
        }
    }
}

/// The sheet shows the recomputed average; the filter uses the page's own.
/// Surface the cases where they disagree.
fn log_average_divergence(reported: &[(String, f64)], aggregated: &AggregatedSectorDataset) {
    let Some(average) = aggregated.average() else {
        return;
    };
    for (column, reported) in reported {
        if let Some(computed) = average.metric(column) {
            if (reported - computed).abs() > AVERAGE_TOLERANCE {
                debug!(
                    sector = %aggregated.sector(),
                    column = column.as_str(),
                    reported,
                    computed,
                    "source average differs from recomputed average"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct NoTables {
        calls: usize,
    }

    impl PageSession for NoTables {
        async fn fetch_table(&mut self, _url: &str, _class: &str, _wait: Duration) -> FetchOutcome {
            self.calls += 1;
            FetchOutcome::NotFound
        }
    }

    #[tokio::test]
    async fn test_all_sectors_missing() {
        let mut fetcher = SectorFetcher::new(NoTables::default());
        let catalog = SectorCatalog::builtin();
        let path = std::env::temp_dir().join("sectorlens_pipeline_missing.xlsx");
        std::fs::remove_file(&path).ok();
        let mut builder = ReportBuilder::create(&path).unwrap();

        let mut summary = Pipeline::new(&mut fetcher, ReportPlan::pe())
            .run(&catalog, &mut builder)
            .await;

        assert_eq!(fetcher.session().calls, 2 * catalog.len());
        assert_eq!(summary.not_found.len(), catalog.len());
        assert_eq!(summary.filter_not_found.len(), catalog.len());
        assert!(summary.sheets.is_empty());
        assert!(summary.summary_sheet.is_none());
        assert!(!summary.is_complete());
        assert!(builder.sheet_names().is_empty());

        summary.save(builder).unwrap();
        assert!(summary.output.is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_summary_display() {
        let mut summary = RunSummary::start("pe", 2);
        summary.sheets.push(WrittenSheet {
            name: "НЕФТЕГАЗ".into(),
            companies: 3,
        });
        summary.not_found.push("БАНКИ".into());
        summary.summary_sheet = Some("P_E < 15".into());
        summary.filtered.push(FilteredRecord {
            record: sectorlens_data::CompanyRecord::company("Лукойл", "LKOH", "НЕФТЕГАЗ", Vec::new()),
            column: "P/E".into(),
            value: 5.2,
            baseline: 10.0,
        });
        summary.record_output(&WorkbookArtifact {
            path: PathBuf::from("/tmp/pe_all_sectors.xlsx"),
            sheets: Vec::new(),
        });

        let text = summary.to_string();
        assert!(text.contains("Sheets written: 1"));
        assert!(text.contains("No table:       БАНКИ"));
        assert!(text.contains("P_E < 15: 1 companies"));
        assert!(text.contains("pe_all_sectors.xlsx"));

        summary.output = None;
        assert!(summary.to_string().contains("Nothing to write"));
    }
}
