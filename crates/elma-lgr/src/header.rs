//! LGR on-disk structures and constants.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Magic bytes at the start of every LGR file.
pub const LGR_MAGIC: &[u8; 5] = b"LGR12";

/// Section id that introduces the `pictures.lst` table.
pub const PICTURES_LST_ID: u32 = 0x0000_03EA;

/// Marker after the last embedded image.
pub const END_OF_FILE: u32 = 0x0B2E_05E7;

/// Name slot of a `pictures.lst` row: 8 significant bytes + 2 reserved.
pub const LIST_NAME_SLOT: usize = 10;

/// Significant bytes of a `pictures.lst` name.
pub const LIST_NAME_MAX: usize = 8;

/// Bytes per `pictures.lst` row across the name table and four columns.
pub const LIST_ROW_SIZE: usize = LIST_NAME_SLOT + 4 * 4;

/// Extension appended to names in the image table.
pub const IMAGE_EXTENSION: &str = ".pcx";

/// Entry name with its extension must leave room for a NUL in the 13-byte slot.
pub const IMAGE_NAME_MAX: usize = 13 - 1 - IMAGE_EXTENSION.len();

/// Fixed-size LGR file header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct LgrHeader {
    /// `LGR12`.
    pub magic: [u8; 5],
    /// Number of embedded images.
    pub image_count: u32,
    /// Always [`PICTURES_LST_ID`].
    pub pictures_lst_id: u32,
    /// Number of `pictures.lst` rows.
    pub listed_count: u32,
}

/// Header preceding each embedded image.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct ImageRecordHeader {
    /// `name.pcx`, NUL terminated.
    pub name: [u8; 13],
    /// Opaque bytes, preserved verbatim.
    pub padding: [u8; 7],
    /// Length of the raster that follows.
    pub length: u32,
}
