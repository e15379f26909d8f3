//! Level model and codec.

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use byteorder::{LittleEndian, WriteBytesExt};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use elma_common::strings::{decode_fixed_string, encode_terminated_string};
use elma_common::{BinaryReader, Error as CommonError, WriteExt};

use crate::header::*;
use crate::top10::{Top10, TOP10_SIZE};
use crate::types::{Clipping, Object, ObjectKind, Picture, Polygon, Position};
use crate::{Error, Result};

/// Level file version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Version {
    /// Elasto Mania (`POT14`).
    #[default]
    Elma,
    /// Across (`POT06`).
    Across,
}

impl Version {
    pub const fn magic(self) -> &'static [u8; 5] {
        match self {
            Version::Elma => ELMA_MAGIC,
            Version::Across => ACROSS_MAGIC,
        }
    }

    fn from_magic(magic: &[u8]) -> Option<Self> {
        if magic == ELMA_MAGIC {
            Some(Version::Elma)
        } else if magic == ACROSS_MAGIC {
            Some(Version::Across)
        } else {
            None
        }
    }
}

/// Options controlling [`Level::decode_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Recompute the content checksum and compare it to the stored one.
    pub verify_integrity: bool,
}

/// An Elasto Mania level.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Level {
    pub version: Version,
    /// Identifier tying best times and replays to this level.
    pub link: u32,
    pub name: String,
    /// LGR the level is drawn with, without extension.
    pub lgr: String,
    pub ground: String,
    pub sky: String,
    pub polygons: Vec<Polygon>,
    pub objects: Vec<Object>,
    pub pictures: Vec<Picture>,
    pub top10: Top10,
}

impl Default for Level {
    fn default() -> Self {
        Self {
            version: Version::Elma,
            link: 0,
            name: "Unnamed".to_string(),
            lgr: "DEFAULT".to_string(),
            ground: "ground".to_string(),
            sky: "sky".to_string(),
            polygons: Vec::new(),
            objects: Vec::new(),
            pictures: Vec::new(),
            top10: Top10::default(),
        }
    }
}

impl Level {
    /// An empty Elma level with a fresh random link.
    pub fn new() -> Self {
        Self {
            link: random_link(),
            ..Self::default()
        }
    }

    /// Parse a level.
    pub fn decode(data: &[u8]) -> Result<Self> {
        Self::decode_with(data, DecodeOptions::default())
    }

    /// Parse a level with explicit options.
    pub fn decode_with(data: &[u8], options: DecodeOptions) -> Result<Self> {
        let magic = BinaryReader::new(data).peek_bytes(ELMA_MAGIC.len())?;
        let version = Version::from_magic(magic)
            .ok_or_else(|| Error::UnsupportedVersion(decode_fixed_string(magic)))?;

        let mut reader = BinaryReader::new(data);
        let (level, stored) = match version {
            Version::Elma => decode_elma(&mut reader)?,
            Version::Across => decode_across(&mut reader)?,
        };

        if options.verify_integrity {
            let actual = level.integrity_sum() * INTEGRITY_FACTOR;
            let tolerance = 1e-9 * actual.abs().max(1.0);
            if (stored - actual).abs() > tolerance {
                return Err(Error::IntegrityMismatch {
                    expected: stored,
                    actual,
                });
            }
        }

        log::debug!(
            "Decoded {:?} level {:?}: {} polygons, {} objects, {} pictures",
            level.version,
            level.name,
            level.polygons.len(),
            level.objects.len(),
            level.pictures.len()
        );

        Ok(level)
    }

    /// Serialize in the layout selected by [`Level::version`].
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        match self.version {
            Version::Elma => self.encode_elma(&mut out)?,
            Version::Across => self.encode_across(&mut out)?,
        }
        Ok(out)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read(path)?;
        Self::decode(&data)
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.encode()?)?;
        Ok(())
    }

    /// Content checksum: coordinates of every vertex, object and picture
    /// plus each object's kind code.
    pub fn integrity_sum(&self) -> f64 {
        let polygons: f64 = self
            .polygons
            .iter()
            .flat_map(|polygon| &polygon.vertices)
            .map(|v| v.x + v.y)
            .sum();
        let objects: f64 = self
            .objects
            .iter()
            .map(|o| o.position.x + o.position.y + f64::from(o.kind.code()))
            .sum();
        let pictures: f64 = self
            .pictures
            .iter()
            .map(|p| p.position.x + p.position.y)
            .sum();
        polygons + objects + pictures
    }

    /// The four stored integrity values.
    ///
    /// The last three are offset from the first by amounts within fixed
    /// windows; the game uses them to tell internal, external and topology
    /// checked levels apart. Offsets are derived from the link so encoding is
    /// deterministic.
    pub fn integrity(&self) -> [f64; 4] {
        let sum = self.integrity_sum() * INTEGRITY_FACTOR;
        let link = self.link;
        [
            sum,
            f64::from(link % 5871) + 11877.0 - sum,
            f64::from(link % 6102) + 12112.0 - sum,
            f64::from(link % 6310) + 12993.0 - sum,
        ]
    }

    fn encode_elma(&self, out: &mut Vec<u8>) -> Result<()> {
        let header = ElmaHeader {
            magic: *ELMA_MAGIC,
            link_low: self.link as u16,
            link: self.link,
            integrity: self.integrity(),
            name: encode_terminated_string::<NAME_SLOT>(&self.name)?,
            lgr: encode_terminated_string::<LGR_SLOT>(&self.lgr)?,
            ground: encode_terminated_string::<TEXTURE_SLOT>(&self.ground)?,
            sky: encode_terminated_string::<TEXTURE_SLOT>(&self.sky)?,
        };
        out.write_struct(&header)?;

        write_count(out, self.polygons.len(), POLYGON_COUNT_OFFSET)?;
        for polygon in &self.polygons {
            out.write_u32::<LittleEndian>(u32::from(polygon.grass))?;
            write_vertices(out, &polygon.vertices)?;
        }

        write_count(out, self.objects.len(), OBJECT_COUNT_OFFSET)?;
        for object in &self.objects {
            let (gravity, animation) = object.kind.raw_food_fields();
            write_position(out, object.position)?;
            out.write_u32::<LittleEndian>(object.kind.code())?;
            out.write_u32::<LittleEndian>(gravity)?;
            out.write_u32::<LittleEndian>(animation)?;
        }

        write_count(out, self.pictures.len(), PICTURE_COUNT_OFFSET)?;
        for picture in &self.pictures {
            out.write_terminated_string::<PICTURE_NAME_SLOT>(&picture.name)?;
            out.write_terminated_string::<PICTURE_NAME_SLOT>(&picture.texture)?;
            out.write_terminated_string::<PICTURE_NAME_SLOT>(&picture.mask)?;
            write_position(out, picture.position)?;
            out.write_u32::<LittleEndian>(picture.distance)?;
            out.write_u32::<LittleEndian>(picture.clipping as u32)?;
        }

        out.write_u32::<LittleEndian>(END_OF_DATA)?;
        out.extend_from_slice(&self.top10.encode()?);
        out.write_u32::<LittleEndian>(END_OF_FILE)?;
        Ok(())
    }

    fn encode_across(&self, out: &mut Vec<u8>) -> Result<()> {
        if !self.pictures.is_empty() || !self.top10.is_empty() {
            log::warn!(
                "Across levels cannot store pictures or best times; dropping them from {:?}",
                self.name
            );
        }

        let header = AcrossHeader {
            magic: *ACROSS_MAGIC,
            link: self.link,
            integrity: self.integrity(),
            name: encode_terminated_string::<ACROSS_NAME_SLOT>(&self.name)?,
        };
        out.write_struct(&header)?;

        write_count(out, self.polygons.len(), POLYGON_COUNT_OFFSET)?;
        for polygon in &self.polygons {
            write_vertices(out, &polygon.vertices)?;
        }

        write_count(out, self.objects.len(), OBJECT_COUNT_OFFSET)?;
        for object in &self.objects {
            write_position(out, object.position)?;
            out.write_u32::<LittleEndian>(object.kind.code())?;
        }

        out.write_u32::<LittleEndian>(END_OF_DATA)?;
        Ok(())
    }
}

fn decode_elma(reader: &mut BinaryReader<'_>) -> Result<(Level, f64)> {
    let header: ElmaHeader = reader.read_struct()?;
    let link = header.link;
    let integrity = header.integrity;

    let mut level = Level {
        version: Version::Elma,
        link,
        name: decode_fixed_string(&header.name),
        lgr: decode_fixed_string(&header.lgr),
        ground: decode_fixed_string(&header.ground),
        sky: decode_fixed_string(&header.sky),
        ..Level::default()
    };

    let count = read_count(reader, POLYGON_COUNT_OFFSET, POLYGON_HEADER_SIZE, "polygon")?;
    level.polygons.reserve(count);
    for _ in 0..count {
        let grass = reader.read_u32()? != 0;
        let vertices = read_vertices(reader)?;
        level.polygons.push(Polygon { grass, vertices });
    }

    let count = read_count(reader, OBJECT_COUNT_OFFSET, OBJECT_SIZE, "object")?;
    level.objects.reserve(count);
    for _ in 0..count {
        let position = read_position(reader)?;
        let code = reader.read_u32()?;
        let gravity = reader.read_u32()?;
        let animation = reader.read_u32()?;
        let kind = ObjectKind::from_raw(code, gravity, animation)?;
        level.objects.push(Object::new(position, kind));
    }

    let count = read_count(reader, PICTURE_COUNT_OFFSET, PICTURE_SIZE, "picture")?;
    level.pictures.reserve(count);
    for _ in 0..count {
        let name = reader.read_fixed_string(PICTURE_NAME_SLOT)?;
        let texture = reader.read_fixed_string(PICTURE_NAME_SLOT)?;
        let mask = reader.read_fixed_string(PICTURE_NAME_SLOT)?;
        let position = read_position(reader)?;
        let distance = reader.read_u32()?;
        let clipping = Clipping::try_from(reader.read_u32()?)?;
        level.pictures.push(Picture {
            position,
            name,
            texture,
            mask,
            distance,
            clipping,
        });
    }

    reader.expect_u32("end of level data", END_OF_DATA)?;
    let block: [u8; TOP10_SIZE] = reader.read_array()?;
    level.top10 = Top10::decode(&block)?;
    reader.expect_u32("end of file", END_OF_FILE)?;

    Ok((level, integrity[0]))
}

fn decode_across(reader: &mut BinaryReader<'_>) -> Result<(Level, f64)> {
    let header: AcrossHeader = reader.read_struct()?;
    let link = header.link;
    let integrity = header.integrity;

    let mut level = Level {
        version: Version::Across,
        link,
        name: decode_fixed_string(&header.name),
        ..Level::default()
    };

    let count = read_count(reader, POLYGON_COUNT_OFFSET, ACROSS_POLYGON_HEADER_SIZE, "polygon")?;
    level.polygons.reserve(count);
    for _ in 0..count {
        level.polygons.push(Polygon::new(read_vertices(reader)?));
    }

    let count = read_count(reader, OBJECT_COUNT_OFFSET, ACROSS_OBJECT_SIZE, "object")?;
    level.objects.reserve(count);
    for _ in 0..count {
        let position = read_position(reader)?;
        let kind = ObjectKind::from_raw(reader.read_u32()?, 0, 0)?;
        level.objects.push(Object::new(position, kind));
    }

    reader.expect_u32("end of level data", END_OF_DATA)?;

    Ok((level, integrity[0]))
}

/// Read an f64-encoded count and make sure `count * record_size` bytes follow.
fn read_count(
    reader: &mut BinaryReader<'_>,
    offset: f64,
    record_size: usize,
    what: &str,
) -> Result<usize> {
    let raw = reader.read_f64()?;
    let count = (raw - offset).round();
    if !count.is_finite() || count < 0.0 || count > f64::from(u32::MAX) {
        return Err(CommonError::BadFormat(format!("invalid {what} count {raw}")).into());
    }
    let count = count as usize;
    reader.ensure_remaining(count, record_size)?;
    Ok(count)
}

fn read_position(reader: &mut BinaryReader<'_>) -> Result<Position> {
    let x = reader.read_f64()?;
    let y = reader.read_f64()?;
    Ok(Position::new(x, y))
}

fn read_vertices(reader: &mut BinaryReader<'_>) -> Result<Vec<Position>> {
    let count = reader.read_u32()? as usize;
    reader.ensure_remaining(count, VERTEX_SIZE)?;
    (0..count).map(|_| read_position(reader)).collect()
}

fn write_count(out: &mut Vec<u8>, count: usize, offset: f64) -> Result<()> {
    out.write_f64::<LittleEndian>(count as f64 + offset)?;
    Ok(())
}

fn write_position(out: &mut Vec<u8>, position: Position) -> Result<()> {
    out.write_f64::<LittleEndian>(position.x)?;
    out.write_f64::<LittleEndian>(position.y)?;
    Ok(())
}

fn write_vertices(out: &mut Vec<u8>, vertices: &[Position]) -> Result<()> {
    let count = u32::try_from(vertices.len())
        .map_err(|_| CommonError::BadFormat(format!("too many vertices: {}", vertices.len())))?;
    out.write_u32::<LittleEndian>(count)?;
    for vertex in vertices {
        write_position(out, *vertex)?;
    }
    Ok(())
}

/// Pseudo-random link from the clock, mixed with a 64-bit LCG.
fn random_link() -> u32 {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x2545_F491_4F6C_DD1D);
    let mixed = seed
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1_442_695_040_888_963_407);
    (mixed >> 32) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Gravity;

    fn square(size: f64) -> Polygon {
        Polygon::new(vec![
            Position::new(0.0, 0.0),
            Position::new(size, 0.0),
            Position::new(size, size),
            Position::new(0.0, size),
        ])
    }

    #[test]
    fn test_defaults() {
        let level = Level::default();
        assert_eq!(level.version, Version::Elma);
        assert_eq!(level.name, "Unnamed");
        assert_eq!(level.lgr, "DEFAULT");
        assert_eq!(level.ground, "ground");
        assert_eq!(level.sky, "sky");
        assert!(level.top10.is_empty());
    }

    #[test]
    fn test_elma_header_layout() {
        let level = Level {
            link: 0x1234_5678,
            ..Level::default()
        };
        let bytes = level.encode().unwrap();

        assert_eq!(&bytes[..5], b"POT14");
        assert_eq!(u16::from_le_bytes([bytes[5], bytes[6]]), 0x5678);
        assert_eq!(u32::from_le_bytes(bytes[7..11].try_into().unwrap()), 0x1234_5678);
        assert_eq!(&bytes[43..51], b"Unnamed\0");
        // header, three counts, end of data, top10, end of file
        assert_eq!(bytes.len(), 130 + 3 * 8 + 4 + TOP10_SIZE + 4);
    }

    #[test]
    fn test_counts_carry_offsets() {
        let mut level = Level::default();
        level.polygons.push(square(1.0));
        let bytes = level.encode().unwrap();
        let raw = f64::from_le_bytes(bytes[130..138].try_into().unwrap());
        assert_eq!(raw, 1.0 + POLYGON_COUNT_OFFSET);
    }

    #[test]
    fn test_integrity_sum() {
        let mut level = Level {
            link: 1000,
            ..Level::default()
        };
        level.polygons.push(square(2.0));
        level.objects.push(Object::new(Position::new(1.0, 1.0), ObjectKind::Start));
        level.pictures.push(Picture::new(Position::new(0.5, 0.5)));
        // 8 from the square, 1 + 1 + 4 from the start, 1 from the picture
        assert_eq!(level.integrity_sum(), 15.0);

        let integrity = level.integrity();
        assert_eq!(integrity[0], 15.0 * INTEGRITY_FACTOR);
        for (value, (low, width)) in integrity[1..]
            .iter()
            .zip([(11877.0, 5871.0), (12112.0, 6102.0), (12993.0, 6310.0)])
        {
            let offset = value + integrity[0];
            assert!(offset >= low && offset < low + width, "{offset}");
        }
    }

    #[test]
    fn test_verify_integrity() {
        let mut level = Level::default();
        level.polygons.push(square(3.0));
        let mut bytes = level.encode().unwrap();

        let options = DecodeOptions {
            verify_integrity: true,
        };
        assert_eq!(Level::decode_with(&bytes, options).unwrap(), level);

        // Nudge the first vertex: polygon count (8), grass (4), vertex count (4).
        let x = 130 + 8 + 4 + 4;
        bytes[x..x + 8].copy_from_slice(&1.0f64.to_le_bytes());
        assert!(Level::decode(&bytes).is_ok());
        assert!(matches!(
            Level::decode_with(&bytes, options),
            Err(Error::IntegrityMismatch { .. })
        ));
    }

    #[test]
    fn test_food_fields_round_trip() {
        let mut level = Level::default();
        let food = ObjectKind::Food {
            gravity: Gravity::Right,
            animation: 9,
        };
        level.objects.push(Object::new(Position::new(2.0, -3.5), food));
        let decoded = Level::decode(&level.encode().unwrap()).unwrap();
        assert_eq!(decoded.objects[0].kind, food);
    }

    #[test]
    fn test_new_only_differs_in_link() {
        let level = Level::new();
        assert_eq!(
            Level {
                link: 0,
                ..level
            },
            Level::default()
        );
    }
}
