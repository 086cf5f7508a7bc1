//! Error types for the record model.

use thiserror::Error;

/// Errors raised while transforming or exporting records.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A collection the operation needs is not in the model.
    #[error("collection not found: {0}")]
    MissingCollection(String),

    /// Malformed fixes document.
    #[error("XML error: {0}")]
    Xml(String),

    /// A fix could not be applied.
    #[error("invalid fix for {target}: {reason}")]
    InvalidFix { target: String, reason: String },

    /// Export error.
    #[error("export error: {0}")]
    Export(String),
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, Error>;
