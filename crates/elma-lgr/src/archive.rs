//! LGR archive reading and writing.
//!
//! Layout:
//! - 17-byte header: `LGR12`, image count, `pictures.lst` id, row count
//! - `pictures.lst`: row names (10 bytes each), then four u32 columns
//!   (image type, distance, clipping, transparency)
//! - embedded images: 24-byte record header followed by the raster bytes
//! - end-of-file marker

use std::fs;
use std::io::Write;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use elma_common::strings::{decode_fixed_string, encode_latin1};
use elma_common::{BinaryReader, WriteExt};

use crate::entry::{same_name, Clipping, ImageType, LgrEntry, PictureInfo, Transparency};
use crate::header::{
    ImageRecordHeader, LgrHeader, END_OF_FILE, IMAGE_EXTENSION, IMAGE_NAME_MAX, LGR_MAGIC,
    LIST_NAME_MAX, LIST_NAME_SLOT, LIST_ROW_SIZE, PICTURES_LST_ID,
};
use crate::palette::Palette;
use crate::pcx::Pcx;
use crate::raster::RasterCodec;
use crate::{Error, Result};

/// Entry whose palette becomes the archive palette.
pub const BIKE_PALETTE_ENTRY: &str = "q1bike";

/// A `pictures.lst` row as read from disk, before it is joined to an image.
#[derive(Debug)]
struct ListRow {
    name: String,
    info: PictureInfo,
}

/// An LGR archive: ordered images.
///
/// Entry order is the order images are stored and rendered in, and is kept
/// exactly across a decode/encode round trip. The archive palette is not
/// stored separately; it is read from the images (see [`LgrArchive::palette`]).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LgrArchive {
    entries: Vec<LgrEntry>,
}

impl LgrArchive {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an LGR file from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        Self::decode(&data)
    }

    /// Write the archive to disk.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.encode()?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Decode an archive whose images are PCX files.
    pub fn decode(data: &[u8]) -> Result<Self> {
        Self::decode_with(data, &Pcx)
    }

    /// Decode an archive, handing each embedded image to `codec`.
    pub fn decode_with<C: RasterCodec + ?Sized>(data: &[u8], codec: &C) -> Result<Self> {
        let mut reader = BinaryReader::new(data);

        reader.expect_magic(LGR_MAGIC)?;
        let image_count = reader.read_u32()? as usize;
        reader.expect_u32("pictures.lst id", PICTURES_LST_ID)?;
        let listed_count = reader.read_u32()? as usize;

        let mut rows: Vec<Option<ListRow>> = read_pictures_lst(&mut reader, listed_count)?
            .into_iter()
            .map(Some)
            .collect();

        reader.ensure_remaining(image_count, std::mem::size_of::<ImageRecordHeader>())?;
        let mut entries = Vec::with_capacity(image_count);

        for _ in 0..image_count {
            let record: ImageRecordHeader = reader.read_struct()?;
            let name = image_name(&record.name);
            let length = record.length as usize;
            let raster = codec.decode(reader.read_bytes(length)?)?;

            let info = rows
                .iter_mut()
                .find(|row| matches!(row, Some(row) if same_name(&row.name, &name)))
                .and_then(Option::take)
                .map(|row| row.info);

            let entry = LgrEntry::from_parts(name, raster, record.padding, info);
            if info.is_some() && entry.is_special() {
                log::warn!("dropping pictures.lst row for special image {}", entry.name());
            }
            entries.push(entry);
        }

        for row in rows.into_iter().flatten() {
            log::warn!("pictures.lst row {} has no matching image", row.name);
        }

        if reader.remaining() < 4 {
            return Err(elma_common::Error::BadFormat("missing end of file marker".to_string()).into());
        }
        reader.expect_u32("end of file marker", END_OF_FILE)?;

        log::debug!(
            "decoded LGR: {} images, {} listed",
            entries.len(),
            entries.iter().filter(|e| e.is_listed()).count()
        );

        Ok(Self { entries })
    }

    /// Encode the archive with PCX images.
    pub fn encode(&self) -> Result<Vec<u8>> {
        self.encode_with(&Pcx)
    }

    /// Encode the archive, producing image bytes with `codec`.
    pub fn encode_with<C: RasterCodec + ?Sized>(&self, codec: &C) -> Result<Vec<u8>> {
        let listed: Vec<(&str, &PictureInfo)> = self
            .entries
            .iter()
            .filter_map(|entry| entry.info().map(|info| (entry.name(), info)))
            .collect();

        let header = LgrHeader {
            magic: *LGR_MAGIC,
            image_count: count_u32(self.entries.len())?,
            pictures_lst_id: PICTURES_LST_ID,
            listed_count: count_u32(listed.len())?,
        };

        let mut output = Vec::new();
        output.write_struct(&header)?;

        for (name, _) in &listed {
            output.write_fixed_string::<LIST_NAME_MAX>(name)?;
            output.write_all(&[0u8; LIST_NAME_SLOT - LIST_NAME_MAX])?;
        }
        for (_, info) in &listed {
            output.write_u32::<LittleEndian>(info.image_type.as_u32())?;
        }
        for (_, info) in &listed {
            output.write_u32::<LittleEndian>(info.distance)?;
        }
        for (_, info) in &listed {
            output.write_u32::<LittleEndian>(info.clipping.as_u32())?;
        }
        for (_, info) in &listed {
            output.write_u32::<LittleEndian>(info.transparency.as_u32())?;
        }

        for entry in &self.entries {
            let name = image_name_slot(entry.name())?;
            let raster = codec.encode(entry.raster())?;

            output.write_struct(&ImageRecordHeader {
                name,
                padding: *entry.padding(),
                length: count_u32(raster.len())?,
            })?;
            output.write_all(&raster)?;
        }

        output.write_u32::<LittleEndian>(END_OF_FILE)?;

        log::debug!(
            "encoded LGR: {} images, {} listed, {} bytes",
            self.entries.len(),
            listed.len(),
            output.len()
        );

        Ok(output)
    }

    /// Index of the entry with this name (case-insensitive).
    pub fn find(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.matches(name))
    }

    /// Get entry by index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&LgrEntry> {
        self.entries.get(index)
    }

    /// Get mutable entry by index.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut LgrEntry> {
        self.entries.get_mut(index)
    }

    /// Append an entry at the end of the render order.
    pub fn push(&mut self, entry: LgrEntry) {
        self.entries.push(entry);
    }

    /// Insert an entry at a position in the render order.
    pub fn insert(&mut self, index: usize, entry: LgrEntry) {
        self.entries.insert(index, entry);
    }

    /// Remove and return the entry at `index`.
    pub fn remove(&mut self, index: usize) -> Option<LgrEntry> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Iterate over entries in render order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &LgrEntry> + '_ {
        self.entries.iter()
    }

    /// All entries in render order.
    #[inline]
    pub fn entries(&self) -> &[LgrEntry] {
        &self.entries
    }

    /// Get the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The archive palette: the `q1bike` image's palette, else the first
    /// image's, else [`Palette::DEFAULT`].
    pub fn palette(&self) -> &Palette {
        let bike = self
            .entries
            .iter()
            .find(|entry| entry.matches(BIKE_PALETTE_ENTRY))
            .and_then(|entry| entry.raster().palette());
        bike.or_else(|| self.entries.first().and_then(|entry| entry.raster().palette()))
            .unwrap_or(&Palette::DEFAULT)
    }

    /// Give every indexed image `palette`, keeping pixel indices.
    ///
    /// Returns the number of images changed. Archives without indexed images
    /// keep reporting [`Palette::DEFAULT`].
    pub fn set_palette(&mut self, palette: &Palette) -> usize {
        let mut changed = 0;
        for entry in &mut self.entries {
            let raster = entry.raster_mut();
            if raster.palette().is_some() && raster.set_palette(palette.clone()).is_ok() {
                changed += 1;
            }
        }
        changed
    }
}

/// Read the `pictures.lst` name table and its four columns.
fn read_pictures_lst(reader: &mut BinaryReader<'_>, count: usize) -> Result<Vec<ListRow>> {
    reader.ensure_remaining(count, LIST_ROW_SIZE)?;

    let mut names = Vec::with_capacity(count);
    for _ in 0..count {
        let slot = reader.read_bytes(LIST_NAME_SLOT)?;
        names.push(decode_fixed_string(&slot[..LIST_NAME_MAX]));
    }

    let image_types = read_column(reader, count)?;
    let distances = read_column(reader, count)?;
    let clippings = read_column(reader, count)?;
    let transparencies = read_column(reader, count)?;

    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| -> Result<ListRow> {
            let info = PictureInfo {
                image_type: ImageType::try_from(image_types[i])
                    .map_err(|v| bad_value("image type", &name, v))?,
                distance: distances[i],
                clipping: Clipping::try_from(clippings[i])
                    .map_err(|v| bad_value("clipping", &name, v))?,
                transparency: Transparency::try_from(transparencies[i])
                    .map_err(|v| bad_value("transparency", &name, v))?,
            };
            Ok(ListRow { name, info })
        })
        .collect()
}

fn read_column(reader: &mut BinaryReader<'_>, count: usize) -> Result<Vec<u32>> {
    (0..count)
        .map(|_| reader.read_u32().map_err(Error::from))
        .collect()
}

fn bad_value(field: &str, name: &str, value: u32) -> Error {
    elma_common::Error::BadFormat(format!("unknown {field} {value} for {name}")).into()
}

/// Entry name from an image record slot, without its `.pcx` extension.
fn image_name(slot: &[u8; 13]) -> String {
    let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
    let mut name = &slot[..end];
    let ext = IMAGE_EXTENSION.as_bytes();
    if name.len() >= ext.len() && name[name.len() - ext.len()..].eq_ignore_ascii_case(ext) {
        name = &name[..name.len() - ext.len()];
    }
    decode_fixed_string(name)
}

/// Image record slot for an entry name: `name.pcx` plus NUL padding.
fn image_name_slot(name: &str) -> Result<[u8; 13]> {
    let mut bytes = encode_latin1(name)?;
    if bytes.len() > IMAGE_NAME_MAX {
        return Err(elma_common::Error::NameTooLong {
            name: name.to_string(),
            max: IMAGE_NAME_MAX,
        }
        .into());
    }
    bytes.extend_from_slice(IMAGE_EXTENSION.as_bytes());
    let mut slot = [0u8; 13];
    slot[..bytes.len()].copy_from_slice(&bytes);
    Ok(slot)
}

fn count_u32(count: usize) -> Result<u32> {
    u32::try_from(count)
        .map_err(|_| elma_common::Error::BadFormat(format!("count {count} exceeds u32")).into())
}
