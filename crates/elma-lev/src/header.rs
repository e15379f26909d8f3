//! Level on-disk structures and constants.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Elma level magic.
pub const ELMA_MAGIC: &[u8; 5] = b"POT14";

/// Across level magic.
pub const ACROSS_MAGIC: &[u8; 5] = b"POT06";

/// Marker after the picture section.
pub const END_OF_DATA: u32 = 0x0067_103A;

/// Marker after the top10 block.
pub const END_OF_FILE: u32 = 0x0084_5D52;

/// Added to polygon and object counts, which are stored as f64.
pub const POLYGON_COUNT_OFFSET: f64 = 0.464_364_3;

/// See [`POLYGON_COUNT_OFFSET`].
pub const OBJECT_COUNT_OFFSET: f64 = 0.464_364_3;

/// Added to the picture count.
pub const PICTURE_COUNT_OFFSET: f64 = 0.234_567_2;

/// Scales the content checksum into the first integrity value.
pub const INTEGRITY_FACTOR: f64 = 3_247.764_325_643;

/// Slot widths (all NUL terminated).
pub const NAME_SLOT: usize = 51;
pub const ACROSS_NAME_SLOT: usize = 59;
pub const LGR_SLOT: usize = 16;
pub const TEXTURE_SLOT: usize = 10;
pub const PICTURE_NAME_SLOT: usize = 10;

/// Polygon header: grass flag + vertex count.
pub const POLYGON_HEADER_SIZE: usize = 8;
/// Across polygon header: vertex count only.
pub const ACROSS_POLYGON_HEADER_SIZE: usize = 4;
pub const VERTEX_SIZE: usize = 16;
/// x, y, kind, gravity, animation.
pub const OBJECT_SIZE: usize = 28;
/// x, y, kind.
pub const ACROSS_OBJECT_SIZE: usize = 20;
/// Three names, x, y, distance, clipping.
pub const PICTURE_SIZE: usize = 3 * PICTURE_NAME_SLOT + 16 + 8;

/// Header of an Elma (`POT14`) level.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct ElmaHeader {
    pub magic: [u8; 5],
    /// Low 16 bits of `link`.
    pub link_low: u16,
    pub link: u32,
    pub integrity: [f64; 4],
    pub name: [u8; NAME_SLOT],
    pub lgr: [u8; LGR_SLOT],
    pub ground: [u8; TEXTURE_SLOT],
    pub sky: [u8; TEXTURE_SLOT],
}

/// Header of an Across (`POT06`) level.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct AcrossHeader {
    pub magic: [u8; 5],
    pub link: u32,
    pub integrity: [f64; 4],
    pub name: [u8; ACROSS_NAME_SLOT],
}
