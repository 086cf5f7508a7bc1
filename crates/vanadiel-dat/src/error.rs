//! Error types for DAT parsing.

use thiserror::Error;

/// Errors that can occur when parsing DAT files.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] vanadiel_common::Error),

    /// Malformed data: inconsistent sizes, bad tags, offsets outside the file.
    #[error("format error: {0}")]
    Format(String),

    /// Unsupported string table version.
    #[error("unsupported string table version: {0:#018x}")]
    UnsupportedVersion(u64),

    /// The file matches none of the known DAT layouts.
    #[error("unknown DAT format (leading bytes {0:#018x})")]
    UnknownFormat(u64),

    /// A parser needs a field name that the mapping does not provide.
    #[error("no field name mapped for index {0}")]
    MissingField(usize),
}

impl Error {
    /// Whether the error describes malformed input rather than an I/O failure.
    pub fn is_format(&self) -> bool {
        match self {
            Error::Io(_) => false,
            Error::Common(e) => e.is_format(),
            _ => true,
        }
    }
}

/// Result type for DAT operations.
pub type Result<T> = std::result::Result<T, Error>;
