//! Error types for LGR handling.

use thiserror::Error;

/// Errors that can occur when working with LGR archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error (truncation, magic, format, name width).
    #[error("{0}")]
    Common(#[from] elma_common::Error),

    /// Embedded raster is malformed.
    #[error("invalid raster: {0}")]
    InvalidRaster(String),

    /// Embedded raster uses a pixel layout the codec does not handle.
    #[error("unsupported raster layout: {bits} bits per pixel, {planes} planes")]
    UnsupportedRaster { bits: u8, planes: u8 },
}

/// Result type for LGR operations.
pub type Result<T> = std::result::Result<T, Error>;
