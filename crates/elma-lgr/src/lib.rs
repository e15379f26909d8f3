//! LGR asset archive codec for Elasto Mania.
//!
//! An LGR file bundles the images a level is drawn with: bike parts, food,
//! killers, textures, masks and decorative pictures. Each image is an embedded
//! PCX file; regular images additionally have a `pictures.lst` row describing
//! their type, default distance, clipping and transparency.
//!
//! # File Format
//!
//! - 5 bytes: Magic (`LGR12`)
//! - 4 bytes: Number of embedded images
//! - 4 bytes: `pictures.lst` section id (0x3EA)
//! - 4 bytes: Number of `pictures.lst` rows (L)
//! - L × 10 bytes: Row names
//! - 4 × L × 4 bytes: Image type, distance, clipping and transparency columns
//! - Per image: 13-byte name (`name.pcx`), 7 padding bytes, u32 length, PCX data
//! - 4 bytes: End-of-file marker (0x0B2E05E7)
//!
//! # Example
//!
//! ```no_run
//! use elma_lgr::{LgrArchive, ImageType};
//!
//! let mut lgr = LgrArchive::from_file("default.lgr")?;
//!
//! for entry in lgr.iter() {
//!     match entry.info() {
//!         Some(info) => println!("{}: {:?} at {}", entry.name(), info.image_type, info.distance),
//!         None => println!("{}: special", entry.name()),
//!     }
//! }
//!
//! if let Some(index) = lgr.find("barrel") {
//!     if let Some(info) = lgr.get_mut(index).and_then(|e| e.info_mut()) {
//!         info.image_type = ImageType::Picture;
//!         info.distance = 450;
//!     }
//! }
//!
//! lgr.write_to_file("custom.lgr")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod archive;
mod entry;
mod error;
mod header;
mod palette;
mod pcx;
mod raster;

pub use archive::{LgrArchive, BIKE_PALETTE_ENTRY};
pub use entry::{
    is_excluded_name, is_food_name, is_qup_qdown_name, is_special_name, same_name, Clipping,
    EntryKind, ImageType, LgrEntry, PictureInfo, Transparency, DEFAULT_PADDING,
};
pub use error::{Error, Result};
pub use header::{
    ImageRecordHeader, LgrHeader, END_OF_FILE, IMAGE_NAME_MAX, LGR_MAGIC, LIST_NAME_MAX,
    PICTURES_LST_ID,
};
pub use palette::{Palette, PALETTE_COLORS, PALETTE_SIZE};
pub use pcx::Pcx;
pub use raster::{Raster, RasterCodec, RasterMode};
