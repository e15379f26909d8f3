//! LEV level codec for Elasto Mania.
//!
//! A level is a set of polygons (ground and grass), objects (flowers, apples,
//! killers and the start position) and pictures, together with the names of
//! the LGR, ground and sky textures it is drawn with. Elma levels also carry
//! an obfuscated table of best times; older Across levels carry neither
//! pictures nor times.
//!
//! # File Format (`POT14`)
//!
//! - 5 bytes: Version magic
//! - 2 bytes: Low bits of the link, then 4 bytes: link
//! - 4 × f64: Integrity values
//! - 51 + 16 + 10 + 10 bytes: Level name, LGR, ground and sky names
//! - f64 polygon count (+0.4643643), then per polygon: u32 grass, u32 n, n × (f64 x, f64 y)
//! - f64 object count (+0.4643643), then per object: x, y, kind, gravity, animation
//! - f64 picture count (+0.2345672), then per picture: three 10-byte names, x, y, distance, clipping
//! - 4 bytes: End-of-data marker, 688 bytes: encrypted top10, 4 bytes: end-of-file marker
//!
//! # Example
//!
//! ```no_run
//! use elma_lev::{Level, Object, ObjectKind, Polygon, Position, TimeEntry};
//!
//! let mut level = Level::new();
//! level.name = "First steps".to_string();
//! level.polygons.push(Polygon::new(vec![
//!     Position::new(-20.0, -10.0),
//!     Position::new(20.0, -10.0),
//!     Position::new(20.0, 10.0),
//!     Position::new(-20.0, 10.0),
//! ]));
//! level.objects.push(Object::new(Position::new(-15.0, 8.0), ObjectKind::Start));
//! level.objects.push(Object::new(Position::new(15.0, 8.0), ObjectKind::Flower));
//! level.top10.insert(TimeEntry::single(1379, "rider"));
//!
//! level.write_to_file("first.lev")?;
//! let back = Level::from_file("first.lev")?;
//! assert_eq!(back.top10.single[0].time, 1379);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod header;
mod level;
mod top10;
mod types;

pub use error::{Error, Result};
pub use header::{
    AcrossHeader, ElmaHeader, ACROSS_MAGIC, ELMA_MAGIC, END_OF_DATA, END_OF_FILE, INTEGRITY_FACTOR,
    OBJECT_COUNT_OFFSET, PICTURE_COUNT_OFFSET, POLYGON_COUNT_OFFSET,
};
pub use level::{DecodeOptions, Level, Version};
pub use top10::{
    crypt_top10, RawTimeList, RawTop10, TimeEntry, Top10, PLAYER_NAME_SLOT, TOP10_CAPACITY,
    TOP10_SIZE,
};
pub use types::{
    Clipping, Gravity, Object, ObjectKind, Picture, Polygon, Position, MAX_ANIMATION,
};
