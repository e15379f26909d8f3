//! Little-endian writing helpers.
//!
//! Integers and floats are written through [`byteorder::WriteBytesExt`];
//! this module adds the fixed-width string slots and zerocopy structs both
//! formats need.

use std::io::Write;

use zerocopy::{Immutable, IntoBytes};

use crate::strings::{encode_fixed_string, encode_terminated_string};
use crate::Result;

/// Extension trait for writing Elma binary layouts.
pub trait WriteExt: Write {
    /// Write `s` into an `N`-byte NUL-padded slot that may be completely filled.
    fn write_fixed_string<const N: usize>(&mut self, s: &str) -> Result<()> {
        let slot: [u8; N] = encode_fixed_string(s)?;
        self.write_all(&slot)?;
        Ok(())
    }

    /// Write `s` into an `N`-byte slot that keeps a NUL terminator.
    fn write_terminated_string<const N: usize>(&mut self, s: &str) -> Result<()> {
        let slot: [u8; N] = encode_terminated_string(s)?;
        self.write_all(&slot)?;
        Ok(())
    }

    /// Write a zerocopy structure verbatim.
    fn write_struct<T: IntoBytes + Immutable>(&mut self, value: &T) -> Result<()> {
        self.write_all(value.as_bytes())?;
        Ok(())
    }
}

impl<W: Write + ?Sized> WriteExt for W {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use byteorder::{LittleEndian, WriteBytesExt};

    #[test]
    fn test_write_layout() {
        let mut out = Vec::new();
        out.write_all(b"LGR12").unwrap();
        out.write_u32::<LittleEndian>(0x3EA).unwrap();
        out.write_fixed_string::<8>("barrel").unwrap();

        assert_eq!(&out[..5], b"LGR12");
        assert_eq!(&out[5..9], &[0xEA, 0x03, 0x00, 0x00]);
        assert_eq!(&out[9..], b"barrel\0\0");
    }

    #[test]
    fn test_write_terminated_rejects_full_slot() {
        let mut out = Vec::new();
        let result = out.write_terminated_string::<4>("abcd");
        assert!(matches!(result, Err(Error::NameTooLong { max: 3, .. })));
        assert!(out.is_empty());
    }
}
