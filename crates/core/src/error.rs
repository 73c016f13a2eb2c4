//! Error types for qtally-core.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while exporting or serializing aggregates.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Export requested for an empty aggregate.
    #[error("No data to export")]
    NothingToExport,

    /// CSV writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error (should not happen).
    #[error("Internal error: {0}")]
    Internal(String),
}
