//! Error types for sector aggregation.

use thiserror::Error;

/// Result type for aggregation operations.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Errors that can occur while aggregating a sector dataset.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The dataset already carries a sector-average row.
    #[error("Sector {sector} already has an average row")]
    AlreadyAveraged {
        /// Display name of the sector
        sector: String,
    },

    /// Requested column is not part of the dataset
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
