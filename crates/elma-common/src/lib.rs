//! Common utilities for the Elma codecs.
//!
//! This crate provides the byte-layout primitives shared by the LGR and LEV
//! crates:
//!
//! - [`BinaryReader`] - Bounds-checked little-endian reading from byte slices
//! - [`WriteExt`] - Little-endian writing and fixed-width string slots
//! - [`strings`] - Latin-1 fixed-width, NUL-padded string encoding
//! - [`Error`] - The shared error taxonomy (truncation, magic, format, names)

mod error;
mod reader;
mod writer;

pub mod strings;

pub use error::{Error, Result};
pub use reader::BinaryReader;
pub use writer::WriteExt;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Re-export byteorder so writers agree on the endianness marker
pub use byteorder::{LittleEndian, WriteBytesExt};
