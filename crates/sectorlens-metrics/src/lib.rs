#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sectorlens/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod average;
pub mod error;
pub mod filter;

pub use average::{AggregatedSectorDataset, average, average_all};
pub use error::{MetricsError, Result};
pub use filter::{FilteredRecord, RangeFilter, filter_by_absolute_range, filter_relative_to_baseline};
