//! Error types for image decoding.

use thiserror::Error;

/// Errors that can occur when decoding images.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] vanadiel_common::Error),

    /// The header's type field names no known encoding.
    #[error("unknown image type: {0:#010x}")]
    UnknownImageType(u32),

    /// Invalid image header.
    #[error("invalid image header: {0}")]
    InvalidHeader(String),

    /// Bitmap pixel depth without a decoder.
    #[error("unsupported bitmap depth: {0} bits")]
    UnsupportedBitCount(u16),
}

impl Error {
    /// Whether the error describes malformed input.
    pub fn is_format(&self) -> bool {
        match self {
            Error::Common(e) => e.is_format(),
            _ => true,
        }
    }
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, Error>;
