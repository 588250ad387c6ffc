#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sectorlens/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod pipeline;
pub mod universe;
pub mod view;

// Re-export main types from sub-crates
pub use sectorlens_data as data;
pub use sectorlens_metrics as metrics;
pub use sectorlens_output as output;

pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, RunSummary, WrittenSheet};
pub use universe::SectorCatalog;
pub use view::{FilterSpec, ReportPlan, ViewSpec};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
