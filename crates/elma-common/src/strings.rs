//! Latin-1 fixed-width string slots.
//!
//! Both file formats store names as Latin-1 bytes in fixed-size slots padded
//! with NUL. Encoding never truncates: a name that does not fit its slot is an
//! [`Error::NameTooLong`].

use crate::{Error, Result};

/// Decode a NUL-padded Latin-1 slot, stopping at the first NUL.
///
/// Bytes after that NUL are ignored, even when they are not NUL. Stored slots
/// often keep stale bytes from a longer name past the terminator, so a slot
/// decodes to the same name no matter what follows it.
pub fn decode_fixed_string(bytes: &[u8]) -> String {
    let end = memchr::memchr(0, bytes).unwrap_or(bytes.len());
    bytes[..end].iter().map(|&b| char::from(b)).collect()
}

/// Encode a string as Latin-1 bytes.
pub fn encode_latin1(s: &str) -> Result<Vec<u8>> {
    s.chars()
        .map(|c| u8::try_from(u32::from(c)).map_err(|_| Error::NotLatin1(s.to_string())))
        .collect()
}

/// Encode `s` into an `N`-byte slot, right-padded with NUL.
///
/// The whole slot may be used; no terminator is guaranteed.
pub fn encode_fixed_string<const N: usize>(s: &str) -> Result<[u8; N]> {
    encode_into_slot(s, N)
}

/// Encode `s` into an `N`-byte slot that must keep at least one NUL terminator.
pub fn encode_terminated_string<const N: usize>(s: &str) -> Result<[u8; N]> {
    encode_into_slot(s, N.saturating_sub(1))
}

fn encode_into_slot<const N: usize>(s: &str, max: usize) -> Result<[u8; N]> {
    let bytes = encode_latin1(s)?;
    if bytes.len() > max {
        return Err(Error::NameTooLong {
            name: s.to_string(),
            max,
        });
    }
    let mut slot = [0u8; N];
    slot[..bytes.len()].copy_from_slice(&bytes);
    Ok(slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_strips_padding() {
        assert_eq!(decode_fixed_string(b"sky\0\0\0\0\0\0\0"), "sky");
        assert_eq!(decode_fixed_string(b"abcdefgh"), "abcdefgh");
        assert_eq!(decode_fixed_string(b"\0garbage"), "");
    }

    #[test]
    fn test_decode_ignores_bytes_after_terminator() {
        assert_eq!(decode_fixed_string(b"qup_0\0ld\0\xff\x01"), "qup_0");
        assert_eq!(decode_fixed_string(b"ab\0cd"), decode_fixed_string(b"ab\0\0\0"));
    }

    #[test]
    fn test_latin1_round_trip() {
        let slot: [u8; 10] = encode_fixed_string("Kuski\u{e9}").unwrap();
        assert_eq!(slot[5], 0xE9);
        assert_eq!(decode_fixed_string(&slot), "Kuski\u{e9}");
    }

    #[test]
    fn test_fixed_slot_uses_full_width() {
        let slot: [u8; 8] = encode_fixed_string("abcdefgh").unwrap();
        assert_eq!(&slot, b"abcdefgh");
        assert!(matches!(
            encode_fixed_string::<8>("abcdefghi"),
            Err(Error::NameTooLong { max: 8, .. })
        ));
    }

    #[test]
    fn test_terminated_slot_reserves_nul() {
        let slot: [u8; 10] = encode_terminated_string("ground").unwrap();
        assert_eq!(&slot, b"ground\0\0\0\0");
        assert!(encode_terminated_string::<10>("123456789").is_ok());
        assert!(matches!(
            encode_terminated_string::<10>("1234567890"),
            Err(Error::NameTooLong { max: 9, .. })
        ));
    }

    #[test]
    fn test_rejects_non_latin1() {
        assert!(matches!(
            encode_fixed_string::<10>("\u{263a}"),
            Err(Error::NotLatin1(_))
        ));
    }
}
