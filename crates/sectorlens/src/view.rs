//! Report definitions: which pages a report reads and how it filters them.

use sectorlens_data::{PageView, ViewKind};
use sectorlens_metrics::RangeFilter;
use std::time::Duration;

/// Wait for the result table on the sheet views.
pub const SHEET_VIEW_WAIT: Duration = Duration::from_secs(25);

/// Wait for the result table on the P/E filter view.
pub const FILTER_VIEW_WAIT: Duration = Duration::from_secs(20);

/// Name of the cross-sector P/E summary sheet.
pub const PE_SUMMARY_SHEET: &str = "P_E < 15";

/// Default file name of the Debt/EBITDA report.
pub const DEBT_EBITDA_FILE: &str = "debt_ebitda_all_sectors.xlsx";

/// Default file name of the P/E report.
pub const PE_FILE: &str = "pe_all_sectors.xlsx";

/// A source page together with the shape of its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSpec {
    /// Page and query to load.
    pub page: PageView,
    /// How the table's metric columns are laid out.
    pub kind: ViewKind,
}

impl ViewSpec {
    /// Trailing Debt/EBITDA.
    pub const DEBT_EBITDA: Self = Self {
        page: PageView::new("shares_fundamental2", "debt_ebitda", SHEET_VIEW_WAIT),
        kind: ViewKind::Trailing {
            metric: "Debt/EBITDA",
        },
    };

    /// P/E per reporting year.
    pub const PE_BY_YEAR: Self = Self {
        page: PageView::new("shares_fundamental4", "p_e", SHEET_VIEW_WAIT),
        kind: ViewKind::ByYear,
    };

    /// Trailing P/E, read for the summary filter.
    pub const PE_TRAILING: Self = Self {
        page: PageView::new("shares_fundamental2", "p_e", FILTER_VIEW_WAIT),
        kind: ViewKind::Trailing { metric: "P/E" },
    };
}

/// Cross-sector filter producing the summary sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    /// Page the filtered values come from.
    pub view: ViewSpec,
    /// Metric column compared.
    pub column: &'static str,
    /// Absolute bounds, both exclusive.
    pub range: RangeFilter,
    /// Name of the summary sheet.
    pub sheet_name: &'static str,
}

impl FilterSpec {
    /// Companies with `0 < P/E < 15` and below their sector's average.
    pub const PE_BELOW_SECTOR: Self = Self {
        view: ViewSpec::PE_TRAILING,
        column: "P/E",
        range: RangeFilter::new(0.0, 15.0),
        sheet_name: PE_SUMMARY_SHEET,
    };
}

/// Everything a run produces: one sheet per sector, plus an optional
/// summary sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportPlan {
    /// Short report name used in logs.
    pub title: &'static str,
    /// View rendered into the per-sector sheets.
    pub sheet: ViewSpec,
    /// Filter feeding the summary sheet.
    pub filter: Option<FilterSpec>,
    /// Default output file name.
    pub file_name: &'static str,
}

impl ReportPlan {
    /// Debt/EBITDA per sector.
    pub const fn debt_ebitda() -> Self {
        Self {
            title: "debt-ebitda",
            sheet: ViewSpec::DEBT_EBITDA,
            filter: None,
            file_name: DEBT_EBITDA_FILE,
        }
    }

    /// P/E by year per sector, with the below-average summary sheet.
    pub const fn pe() -> Self {
        Self {
            title: "pe",
            sheet: ViewSpec::PE_BY_YEAR,
            filter: Some(FilterSpec::PE_BELOW_SECTOR),
            file_name: PE_FILE,
        }
    }
}
