//! Binary reader for bounds-checked parsing of byte slices.
//!
//! This module provides [`BinaryReader`], a cursor over a byte slice. Every
//! read checks the remaining length first, so a short buffer surfaces as
//! [`Error::TruncatedInput`] instead of a panic or a silent wrong read.

use zerocopy::FromBytes;

use crate::strings::decode_fixed_string;
use crate::{Error, Result};

/// A little-endian reader over a byte slice.
///
/// # Example
///
/// ```
/// use elma_common::BinaryReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x04030201);
/// assert_eq!(reader.read_u32().unwrap(), 0x08070605);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Fail unless `count` records of `size` bytes each are still available.
    ///
    /// Used before count-driven loops so an absurd declared count is rejected
    /// up front rather than after allocating for it.
    pub fn ensure_remaining(&self, count: usize, size: usize) -> Result<()> {
        let needed = count.saturating_mul(size);
        if needed > self.remaining() {
            return Err(Error::TruncatedInput {
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::TruncatedInput {
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a fixed-size byte array.
    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a little-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// Read a little-endian i32.
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_array().map(i32::from_le_bytes)
    }

    /// Read a little-endian f64.
    #[inline]
    pub fn read_f64(&mut self) -> Result<f64> {
        self.read_array().map(f64::from_le_bytes)
    }

    /// Read a Latin-1 string from a fixed-size, NUL-padded slot.
    pub fn read_fixed_string(&mut self, slot_size: usize) -> Result<String> {
        self.read_bytes(slot_size).map(decode_fixed_string)
    }

    /// Read a struct using zerocopy.
    ///
    /// The struct must implement `FromBytes` from the zerocopy crate.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::TruncatedInput {
            needed: size,
            available: bytes.len(),
        })
    }

    /// Expect a specific u32 value or return [`Error::BadFormat`].
    pub fn expect_u32(&mut self, what: &str, expected: u32) -> Result<()> {
        let actual = self.read_u32()?;
        if actual != expected {
            return Err(Error::unexpected(what, expected, actual));
        }
        Ok(())
    }

    /// Expect specific magic bytes.
    pub fn expect_magic(&mut self, expected: &[u8]) -> Result<()> {
        let actual = self.read_bytes(expected.len())?;
        if actual != expected {
            return Err(Error::BadMagic {
                expected: expected.to_vec(),
                actual: actual.to_vec(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let data = [
            0x01u8, 0x02, 0x03, 0x04, // u32: 0x04030201
            0xFF, 0xFF, 0xFF, 0xFF, // u32: 0xFFFFFFFF
        ];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert_eq!(reader.read_u32().unwrap(), 0xFFFFFFFF);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_f64() {
        let data = 1.5f64.to_le_bytes();
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_f64().unwrap(), 1.5);
    }

    #[test]
    fn test_fixed_string() {
        let data = b"barrel\0\0\0\0next";
        let mut reader = BinaryReader::new(data);

        assert_eq!(reader.read_fixed_string(10).unwrap(), "barrel");
        assert_eq!(reader.position(), 10);
    }

    #[test]
    fn test_truncated_input() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);

        match reader.read_u32() {
            Err(Error::TruncatedInput { needed, available }) => {
                assert_eq!(needed, 4);
                assert_eq!(available, 2);
            }
            other => panic!("expected TruncatedInput, got {other:?}"),
        }
    }

    #[test]
    fn test_ensure_remaining() {
        let data = [0u8; 16];
        let reader = BinaryReader::new(&data);

        assert!(reader.ensure_remaining(4, 4).is_ok());
        assert!(matches!(
            reader.ensure_remaining(5, 4),
            Err(Error::TruncatedInput { needed: 20, available: 16 })
        ));
        assert!(reader.ensure_remaining(usize::MAX, 8).is_err());
    }

    #[test]
    fn test_expect_magic_and_value() {
        let mut data = b"LGR12".to_vec();
        data.extend_from_slice(&7u32.to_le_bytes());
        let mut reader = BinaryReader::new(&data);

        assert!(reader.expect_magic(b"LGR12").is_ok());
        assert!(matches!(
            reader.expect_u32("section id", 8),
            Err(Error::BadFormat(_))
        ));

        let mut reader = BinaryReader::new(b"POT14");
        assert!(matches!(
            reader.expect_magic(b"LGR12"),
            Err(Error::BadMagic { .. })
        ));
    }
}
