//! Error types for the extraction pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while locating, decoding or writing resources.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] vanadiel_common::Error),

    /// Model, fixes or emitter error.
    #[error("{0}")]
    Model(#[from] vanadiel_model::Error),

    /// DAT parsing error.
    #[error("{0}")]
    Dat(#[from] vanadiel_dat::Error),

    /// Image decoding error.
    #[error("{0}")]
    Image(#[from] vanadiel_image::Error),

    /// Map lookup table could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// PNG encoding error.
    #[error("PNG error: {0}")]
    Png(#[from] image::ImageError),

    /// The installation directory lacks a file table.
    #[error("not an installation directory: {0}")]
    InstallDir(PathBuf),

    /// A file id has no entry in the file tables.
    #[error("file id {0:#06x} is not in the file table")]
    UnknownFileId(u32),

    /// A resolved DAT file could not be read.
    #[error("failed to read file {file_id:#06x} at {path}: {source}")]
    Read {
        file_id: u32,
        path: PathBuf,
        source: std::io::Error,
    },

    /// A step depends on data that an earlier step did not produce.
    #[error("missing input: {0}")]
    MissingInput(&'static str),
}

impl Error {
    /// Whether the error describes malformed input data.
    pub fn is_format(&self) -> bool {
        match self {
            Error::Common(e) => e.is_format(),
            Error::Dat(e) => e.is_format(),
            Error::Image(e) => e.is_format(),
            Error::Json(_) => true,
            _ => false,
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
