//! Error types for elma-common.

use thiserror::Error;

/// Common error type for Elma codec operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A declared length or count runs past the end of the input.
    #[error("truncated input: needed {needed} bytes but only {available} available")]
    TruncatedInput { needed: usize, available: usize },

    /// Wrong format signature.
    #[error("bad magic: expected {expected:?}, got {actual:?}")]
    BadMagic {
        expected: Vec<u8>,
        actual: Vec<u8>,
    },

    /// A structurally required value did not match.
    #[error("bad format: {0}")]
    BadFormat(String),

    /// Identifier does not fit its fixed on-disk slot.
    #[error("name {name:?} is too long: at most {max} bytes allowed")]
    NameTooLong { name: String, max: usize },

    /// String contains characters that have no Latin-1 encoding.
    #[error("string {0:?} cannot be encoded as Latin-1")]
    NotLatin1(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::BadFormat`] describing an unexpected value.
    pub fn unexpected(what: &str, expected: impl std::fmt::Debug, actual: impl std::fmt::Debug) -> Self {
        Error::BadFormat(format!("{what}: expected {expected:?}, got {actual:?}"))
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
