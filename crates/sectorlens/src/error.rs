//! Fatal run errors.

use thiserror::Error;

/// Result type for a report run.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that abort a run.
///
/// Per-sector problems (a missing table, an empty or unwritable sheet) are
/// not errors; they are counted in the [`RunSummary`](crate::RunSummary).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Session or catalog failure.
    #[error(transparent)]
    Data(#[from] sectorlens_data::DataError),

    /// Workbook could not be created or saved.
    #[error(transparent)]
    Output(#[from] sectorlens_output::OutputError),

    /// Catalog file could not be read.
    #[error("Failed to read sector catalog {path}: {source}")]
    Catalog {
        /// Catalog file path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Catalog file is not a valid sector list.
    #[error("Invalid sector catalog: {0}")]
    InvalidCatalog(String),
}
