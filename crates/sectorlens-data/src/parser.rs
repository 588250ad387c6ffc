//! Sector table parsing.
//!
//! Turns a [`RenderedTable`] into a [`SectorDataset`]. Every body row is
//! classified exactly once into a [`RowClass`]; only [`RowClass::Data`] rows
//! become records, and the source's own "average" row is kept aside as the
//! page's reported baseline.

use crate::numeric::parse_number;
use crate::record::{CompanyRecord, Metric, SectorDataset, SectorDescriptor};
use crate::table::RenderedTable;
use tracing::debug;

/// Label of the source's "total" summary row.
pub const SUMMARY_TOTAL_LABEL: &str = "Всего:";

/// Label of the source's "average" summary row.
pub const SUMMARY_AVERAGE_LABEL: &str = "Среднее:";

/// Shape of the metric columns on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// A single metric column (trailing twelve months view).
    Trailing {
        /// Column key used for the metric, e.g. `"P/E"`.
        metric: &'static str,
    },
    /// One column per reporting year, labelled from the header row.
    ByYear,
}

/// Header cells around the year columns that are not years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSlice {
    /// Fixed columns before the first year.
    pub skip_leading: usize,
    /// Fixed columns after the last year.
    pub skip_trailing: usize,
}

/// Cell positions of a source table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSchema {
    /// Cell holding the company name.
    pub name_cell: usize,
    /// Cell holding the ticker.
    pub ticker_cell: usize,
    /// Cell holding the metric, or the first year value.
    pub first_value_cell: usize,
    /// Rows with fewer cells are structural.
    pub min_cells: usize,
    /// Where the year labels sit in the header row, for by-year views.
    pub year_header: Option<HeaderSlice>,
}

impl RowSchema {
    /// Layout of the trailing (single metric) pages.
    pub const TRAILING: Self = Self {
        name_cell: 1,
        ticker_cell: 2,
        first_value_cell: 5,
        min_cells: 6,
        year_header: None,
    };

    /// Layout of the by-year pages.
    pub const BY_YEAR: Self = Self {
        year_header: Some(HeaderSlice {
            skip_leading: 5,
            skip_trailing: 2,
        }),
        ..Self::TRAILING
    };

    /// Schema for a view kind.
    pub const fn for_view(kind: ViewKind) -> Self {
        match kind {
            ViewKind::Trailing { .. } => Self::TRAILING,
            ViewKind::ByYear => Self::BY_YEAR,
        }
    }

    /// Classify a body row.
    ///
    /// Full-width rows are matched on the name cell. Short rows are
    /// structural unless one of their cells carries a summary label; such a
    /// row is still a summary and never becomes a record.
    pub fn classify(&self, cells: &[String]) -> RowClass {
        if cells.len() >= self.min_cells {
            return RowClass::from_label(&cells[self.name_cell]).unwrap_or(RowClass::Data);
        }
        cells
            .iter()
            .find_map(|cell| RowClass::from_label(cell))
            .unwrap_or(RowClass::Structural)
    }
}

/// Classification of a body row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowClass {
    /// A company row.
    Data,
    /// The source's "total" row.
    SectorTotal,
    /// The source's "average" row.
    SectorAverage,
    /// Header, footer or spacer row.
    Structural,
}

impl RowClass {
    fn from_label(text: &str) -> Option<Self> {
        match text.trim() {
            SUMMARY_TOTAL_LABEL => Some(Self::SectorTotal),
            SUMMARY_AVERAGE_LABEL => Some(Self::SectorAverage),
            _ => None,
        }
    }
}

/// Result of parsing one sector page.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSector {
    /// Company rows.
    pub dataset: SectorDataset,
    /// Values of the source's own average row, if the page had one.
    pub source_average: Option<Vec<Metric>>,
}

impl ParsedSector {
    /// Source-reported sector average for `column`.
    ///
    /// `None` when the page had no average row or the row had no number
    /// for that column.
    pub fn baseline(&self, column: &str) -> Option<f64> {
        self.source_average
            .as_ref()?
            .iter()
            .find(|m| m.key == column)
            .and_then(|m| m.value)
    }
}

/// Parser for one view kind.
#[derive(Debug, Clone, Copy)]
pub struct SectorTableParser {
    kind: ViewKind,
    schema: RowSchema,
}

impl SectorTableParser {
    /// Create a parser with the source layout for `kind`.
    pub const fn new(kind: ViewKind) -> Self {
        Self {
            kind,
            schema: RowSchema::for_view(kind),
        }
    }

    /// Create a parser with a custom layout.
    pub const fn with_schema(kind: ViewKind, schema: RowSchema) -> Self {
        Self { kind, schema }
    }

    /// Metric column keys for `table`.
    ///
    /// Trailing views have one fixed key; by-year views take the header
    /// cells between the fixed leading and trailing columns.
    pub fn columns(&self, table: &RenderedTable) -> Vec<String> {
        match (self.kind, self.schema.year_header) {
            (ViewKind::Trailing { metric }, _) => vec![metric.to_string()],
            (ViewKind::ByYear, Some(slice)) => {
                let header = table.header();
                let end = header.len().saturating_sub(slice.skip_trailing);
                header
                    .get(slice.skip_leading..end)
                    .map(<[String]>::to_vec)
                    .unwrap_or_default()
            }
            (ViewKind::ByYear, None) => Vec::new(),
        }
    }

    /// Parse `table` into the dataset for `sector`.
    pub fn parse(&self, table: &RenderedTable, sector: &SectorDescriptor) -> ParsedSector {
        let columns = self.columns(table);
        let mut records = Vec::new();
        let mut source_average = None;

        for cells in table.rows() {
            match self.schema.classify(cells) {
                RowClass::Data => records.push(self.record(cells, &columns, sector)),
                RowClass::SectorAverage => {
                    source_average = Some(self.summary_metrics(cells, &columns));
                }
                RowClass::SectorTotal => debug!(sector = %sector, "dropping source total row"),
                RowClass::Structural => {}
            }
        }

        debug!(
            sector = %sector,
            rows = records.len(),
            columns = columns.len(),
            "parsed sector table"
        );

        ParsedSector {
            dataset: SectorDataset::new(sector.clone(), columns, records),
            source_average,
        }
    }

    fn record(
        &self,
        cells: &[String],
        columns: &[String],
        sector: &SectorDescriptor,
    ) -> CompanyRecord {
        CompanyRecord::company(
            cells[self.schema.name_cell].trim(),
            cells[self.schema.ticker_cell].trim(),
            sector.display_name.as_str(),
            self.values(cells, columns),
        )
    }

    /// Pair each column key with the value cell at the same offset from the
    /// first value cell. Keys without a matching cell are absent.
    fn values(&self, cells: &[String], columns: &[String]) -> Vec<Metric> {
        columns
            .iter()
            .enumerate()
            .map(|(offset, key)| {
                let value = cells
                    .get(self.schema.first_value_cell + offset)
                    .and_then(|cell| parse_number(cell));
                Metric::new(key.as_str(), value)
            })
            .collect()
    }

    /// Values of a summary row, read at the same positions as a company
    /// row. Merged cells are already expanded by table extraction, so a row
    /// too short to reach a value cell has no value for it.
    fn summary_metrics(&self, cells: &[String], columns: &[String]) -> Vec<Metric> {
        self.values(cells, columns)
    }
}
