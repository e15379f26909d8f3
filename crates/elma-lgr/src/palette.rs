//! 256-colour RGB palettes.

use std::fmt;

/// Number of colours in a palette.
pub const PALETTE_COLORS: usize = 256;

/// Size of a palette in bytes (`r, g, b` per colour).
pub const PALETTE_SIZE: usize = PALETTE_COLORS * 3;

/// A 256-entry RGB palette stored as `[r, g, b, r, g, b, ...]`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Palette([u8; PALETTE_SIZE]);

impl Palette {
    /// Built-in palette used when an archive carries no bike palette.
    ///
    /// Indices 0-215 form a 6x6x6 colour cube, 216-255 a grey ramp.
    pub const DEFAULT: Self = Self(build_default_palette());

    /// Create a palette from its raw bytes.
    #[inline]
    pub const fn new(bytes: [u8; PALETTE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create a palette from a slice, which must be exactly 768 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    /// Greyscale ramp palette (index `i` maps to `(i, i, i)`).
    pub fn grayscale() -> Self {
        let mut bytes = [0u8; PALETTE_SIZE];
        for (index, color) in bytes.chunks_exact_mut(3).enumerate() {
            color.fill(index as u8);
        }
        Self(bytes)
    }

    /// Get the raw palette bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; PALETTE_SIZE] {
        &self.0
    }

    /// Get the colour at a palette index.
    #[inline]
    pub fn color(&self, index: u8) -> [u8; 3] {
        let offset = usize::from(index) * 3;
        [self.0[offset], self.0[offset + 1], self.0[offset + 2]]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Shows the first and last colour plus an FNV-1a digest of all entries, so
/// palettes that differ anywhere print differently.
impl fmt::Debug for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digest = self.0.iter().fold(0xcbf2_9ce4_8422_2325u64, |hash, byte| {
            (hash ^ u64::from(*byte)).wrapping_mul(0x0000_0100_0000_01b3)
        });
        let [r0, g0, b0] = self.color(0);
        let [r1, g1, b1] = self.color(u8::MAX);
        write!(
            f,
            "Palette(#{r0:02x}{g0:02x}{b0:02x}..#{r1:02x}{g1:02x}{b1:02x}, {digest:016x})"
        )
    }
}

const fn build_default_palette() -> [u8; PALETTE_SIZE] {
    let mut bytes = [0u8; PALETTE_SIZE];
    let mut index = 0;
    while index < 216 {
        bytes[index * 3] = (index / 36 * 51) as u8;
        bytes[index * 3 + 1] = (index / 6 % 6 * 51) as u8;
        bytes[index * 3 + 2] = (index % 6 * 51) as u8;
        index += 1;
    }
    while index < PALETTE_COLORS {
        let level = ((index - 216) * 255 / 39) as u8;
        bytes[index * 3] = level;
        bytes[index * 3 + 1] = level;
        bytes[index * 3 + 2] = level;
        index += 1;
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_reflects_every_colour() {
        let mut bytes = *Palette::DEFAULT.as_bytes();
        bytes[400] ^= 0x01;
        let changed = Palette::new(bytes);

        let before = format!("{:?}", Palette::DEFAULT);
        let after = format!("{changed:?}");
        assert!(before.starts_with("Palette(#"));
        assert_ne!(before, after);
    }

    #[test]
    fn test_default_palette_layout() {
        let palette = Palette::DEFAULT;
        assert_eq!(palette.color(0), [0, 0, 0]);
        assert_eq!(palette.color(215), [255, 255, 255]);
        assert_eq!(palette.color(216), [0, 0, 0]);
        assert_eq!(palette.color(255), [255, 255, 255]);
        assert_eq!(palette.color(1), [0, 0, 51]);
    }

    #[test]
    fn test_from_slice_requires_full_palette() {
        assert!(Palette::from_slice(&[0u8; 767]).is_none());
        let palette = Palette::from_slice(&[7u8; PALETTE_SIZE]).unwrap();
        assert_eq!(palette.color(200), [7, 7, 7]);
    }

    #[test]
    fn test_grayscale() {
        assert_eq!(Palette::grayscale().color(128), [128, 128, 128]);
    }
}
