//! Error types for vanadiel-common.

use thiserror::Error;

/// Common error type for Vanadiel operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer: needed {needed} bytes but only {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// A range addressed by an offset taken from the data lies outside the buffer.
    #[error("range {offset}..{offset}+{length} is outside a buffer of {size} bytes")]
    OutOfBounds {
        offset: usize,
        length: usize,
        size: usize,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error means the input bytes are malformed, as opposed to an I/O failure.
    pub fn is_format(&self) -> bool {
        !matches!(self, Error::Io(_))
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
