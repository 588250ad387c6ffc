//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while acquiring a page session or loading
/// configuration.
///
/// Page-level problems (timeouts, missing tables, unparseable cells) are not
/// errors: they surface as [`FetchOutcome::NotFound`](crate::fetch::FetchOutcome)
/// or as absent metric values.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Browser session error
    #[error("Browser error: {0}")]
    Browser(String),

    /// Invalid CSS selector
    #[error("Invalid selector `{selector}`: {reason}")]
    Selector {
        /// Selector text
        selector: String,
        /// Reason reported by the selector parser
        reason: String,
    },

    /// Blocking task failed to complete
    #[error("Task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

