//! Error types for report output.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for report output.
pub type Result<T> = std::result::Result<T, OutputError>;

/// Errors that can occur while building or writing the workbook.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Spreadsheet library error.
    #[error("Workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The directory for the output file does not exist.
    #[error("Output directory does not exist: {}", .0.display())]
    OutputDir(PathBuf),

    /// A sheet would have no rows.
    #[error("Refusing to write empty sheet `{0}`")]
    EmptySheet(String),

    /// Finalizing a workbook no sheet was added to.
    #[error("No sheets to write to {}", .0.display())]
    NoSheets(PathBuf),

    /// The summary sheet was already added.
    #[error("Summary sheet already added as `{0}`")]
    DuplicateSummary(String),

    /// Too many rows or columns for a worksheet.
    #[error("Cell out of range: row {row}, column {col}")]
    CellRange {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        col: usize,
    },
}
