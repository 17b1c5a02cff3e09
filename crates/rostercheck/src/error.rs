//! Error types for the rostercheck library.
//!
//! Data-level problems (bad cells, violated invariants) are never errors;
//! they become [`crate::ValidationIssue`]s in the result. Only misuse of the
//! engine itself is fatal.

use thiserror::Error;

/// Main error type for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A table argument contained no rows at all.
    #[error("empty table: {0}")]
    EmptyTable(String),

    /// A key or join column named in the call does not exist in the table.
    #[error("unknown column '{column}' in table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// Configuration error (invalid threshold rule, malformed relationship).
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
