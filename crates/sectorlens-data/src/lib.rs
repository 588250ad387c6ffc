#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sectorlens/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod fetch;
pub mod numeric;
pub mod parser;
pub mod record;
pub mod table;

pub use error::{DataError, Result};
pub use fetch::{FetchOutcome, PageSession, PageView, SectorFetcher};
pub use numeric::parse_number;
pub use parser::{ParsedSector, RowClass, RowSchema, SectorTableParser, ViewKind};
pub use record::{CompanyRecord, Metric, RecordKind, SectorDataset, SectorDescriptor};
pub use table::RenderedTable;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
