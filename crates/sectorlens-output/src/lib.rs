#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sectorlens/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod sheet;
pub mod workbook;

pub use error::{OutputError, Result};
pub use sheet::{MAX_SHEET_NAME_LEN, SheetNames, sanitize_sheet_name};
pub use workbook::{ReportBuilder, WorkbookArtifact};
