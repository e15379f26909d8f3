//! Elma - Elasto Mania level and LGR file library.
//!
//! This crate provides a unified interface to the Elma library ecosystem
//! for reading, editing and writing Elasto Mania game files.
//!
//! # Crates
//!
//! - [`elma_common`] - Common utilities (binary reading, fixed-width strings, errors)
//! - [`elma_lgr`] - LGR asset archives and their embedded PCX images
//! - [`elma_lev`] - Levels (`POT14` and Across `POT06`) and best-time tables
//!
//! # Example
//!
//! ```no_run
//! use elma::prelude::*;
//!
//! let mut level = Level::from_file("QWQUU001.LEV")?;
//! let lgr = LgrArchive::from_file(format!("{}.lgr", level.lgr))?;
//!
//! for picture in &level.pictures {
//!     if lgr.find(&picture.name).is_none() {
//!         println!("missing picture {}", picture.name);
//!     }
//! }
//!
//! level.top10.insert(TimeEntry::single(1450, "rider"));
//! level.write_to_file("QWQUU001.LEV")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use elma_common as common;
pub use elma_lev as lev;
pub use elma_lgr as lgr;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use elma_common::BinaryReader;
    pub use elma_lev::{
        DecodeOptions, Gravity, Level, Object, ObjectKind, Picture, Polygon, Position, TimeEntry,
        Top10, Version,
    };
    pub use elma_lgr::{
        EntryKind, ImageType, LgrArchive, LgrEntry, Palette, Pcx, PictureInfo, Raster, RasterCodec,
        Transparency,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
