//! Error types for level handling.

use thiserror::Error;

/// Errors that can occur when working with level files.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error (truncation, magic, format, name width).
    #[error("{0}")]
    Common(#[from] elma_common::Error),

    /// Level magic names a version this codec does not know.
    #[error("unsupported level version: {0:?}")]
    UnsupportedVersion(String),

    /// Stored integrity value disagrees with the level contents.
    #[error("integrity mismatch: stored {expected}, computed {actual}")]
    IntegrityMismatch { expected: f64, actual: f64 },
}

/// Result type for level operations.
pub type Result<T> = std::result::Result<T, Error>;
