//! ZSoft PCX raster codec.
//!
//! LGR archives embed every image as a PCX file. Only 8 bits per plane with
//! RLE encoding is handled:
//!
//! - 1 plane + trailing `0x0C` and 768-byte palette -> [`RasterMode::Indexed`]
//! - 1 plane, no palette -> [`RasterMode::Grayscale`]
//! - 3 planes -> [`RasterMode::Rgb`]

use elma_common::{BinaryReader, WriteExt};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::palette::{Palette, PALETTE_SIZE};
use crate::raster::{Raster, RasterCodec, RasterMode};
use crate::{Error, Result};

const MANUFACTURER: u8 = 0x0A;
const VERSION: u8 = 5;
const ENCODING_RLE: u8 = 1;
const PALETTE_MARKER: u8 = 0x0C;
const PALETTE_INFO_COLOR: u16 = 1;
const PALETTE_INFO_GRAYSCALE: u16 = 2;
const RUN_FLAG: u8 = 0xC0;
const MAX_RUN: usize = 0x3F;
const DPI: u16 = 72;

/// PCX file header (128 bytes).
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
struct PcxHeader {
    manufacturer: u8,
    version: u8,
    encoding: u8,
    bits_per_pixel: u8,
    x_min: u16,
    y_min: u16,
    x_max: u16,
    y_max: u16,
    h_dpi: u16,
    v_dpi: u16,
    ega_palette: [u8; 48],
    reserved: u8,
    planes: u8,
    bytes_per_line: u16,
    palette_info: u16,
    h_screen: u16,
    v_screen: u16,
    filler: [u8; 54],
}

const HEADER_SIZE: usize = std::mem::size_of::<PcxHeader>();

/// The PCX raster codec used by LGR archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pcx;

impl RasterCodec for Pcx {
    fn decode(&self, data: &[u8]) -> Result<Raster> {
        let header: PcxHeader = BinaryReader::new(data).read_struct()?;

        if header.manufacturer != MANUFACTURER {
            return Err(Error::InvalidRaster(format!(
                "bad PCX manufacturer byte {:#04x}",
                header.manufacturer
            )));
        }
        if header.encoding != ENCODING_RLE {
            return Err(Error::InvalidRaster(format!(
                "unsupported PCX encoding {}",
                header.encoding
            )));
        }
        let (bits, planes) = (header.bits_per_pixel, header.planes);
        if bits != 8 || !(planes == 1 || planes == 3) {
            return Err(Error::UnsupportedRaster { bits, planes });
        }

        // Copy packed fields out before doing arithmetic on them.
        let (x_min, y_min, x_max, y_max) = (header.x_min, header.y_min, header.x_max, header.y_max);
        let bytes_per_line = usize::from(header.bytes_per_line);
        let palette_info = header.palette_info;

        if x_max < x_min || y_max < y_min || x_max - x_min == u16::MAX || y_max - y_min == u16::MAX {
            return Err(Error::InvalidRaster(format!(
                "bad PCX window ({x_min}, {y_min})-({x_max}, {y_max})"
            )));
        }
        let width = x_max - x_min + 1;
        let height = y_max - y_min + 1;
        if bytes_per_line < usize::from(width) {
            return Err(Error::InvalidRaster(format!(
                "PCX line of {bytes_per_line} bytes cannot hold {width} pixels"
            )));
        }

        let has_palette = planes == 1
            && palette_info != PALETTE_INFO_GRAYSCALE
            && data.len() >= HEADER_SIZE + PALETTE_SIZE + 1
            && data[data.len() - PALETTE_SIZE - 1] == PALETTE_MARKER;
        let body_end = if has_palette {
            data.len() - PALETTE_SIZE - 1
        } else {
            data.len()
        };

        let planes = usize::from(planes);
        let line_count = usize::from(height) * planes;
        let scanlines = decode_rle(&data[HEADER_SIZE..body_end], line_count * bytes_per_line)?;

        let width_px = usize::from(width);
        let mut pixels = Vec::with_capacity(width_px * line_count);
        for row in scanlines.chunks_exact(bytes_per_line * planes) {
            if planes == 1 {
                pixels.extend_from_slice(&row[..width_px]);
            } else {
                let (red, rest) = row.split_at(bytes_per_line);
                let (green, blue) = rest.split_at(bytes_per_line);
                for x in 0..width_px {
                    pixels.extend_from_slice(&[red[x], green[x], blue[x]]);
                }
            }
        }

        if has_palette {
            let palette = Palette::from_slice(&data[body_end + 1..]).ok_or_else(|| {
                Error::InvalidRaster("PCX palette is not 768 bytes".to_string())
            })?;
            Raster::indexed(width, height, pixels, palette)
        } else if planes == 1 {
            Raster::grayscale(width, height, pixels)
        } else {
            Raster::rgb(width, height, pixels)
        }
    }

    fn encode(&self, raster: &Raster) -> Result<Vec<u8>> {
        let (width, height) = (raster.width(), raster.height());
        if width == 0 || height == 0 {
            return Err(Error::InvalidRaster(
                "PCX cannot store an empty image".to_string(),
            ));
        }

        let planes: u8 = match raster.mode() {
            RasterMode::Indexed | RasterMode::Grayscale => 1,
            RasterMode::Rgb => 3,
        };
        let width_px = usize::from(width);
        let bytes_per_line = (width_px + 1) & !1;
        let stored_bytes_per_line = u16::try_from(bytes_per_line).map_err(|_| {
            Error::InvalidRaster(format!("PCX cannot store a {width} pixel wide line"))
        })?;

        let header = PcxHeader {
            manufacturer: MANUFACTURER,
            version: VERSION,
            encoding: ENCODING_RLE,
            bits_per_pixel: 8,
            x_min: 0,
            y_min: 0,
            x_max: width - 1,
            y_max: height - 1,
            h_dpi: DPI,
            v_dpi: DPI,
            ega_palette: [0; 48],
            reserved: 0,
            planes,
            bytes_per_line: stored_bytes_per_line,
            palette_info: if raster.mode() == RasterMode::Grayscale {
                PALETTE_INFO_GRAYSCALE
            } else {
                PALETTE_INFO_COLOR
            },
            h_screen: 0,
            v_screen: 0,
            filler: [0; 54],
        };

        let mut output = Vec::with_capacity(HEADER_SIZE + raster.pixels().len() + PALETTE_SIZE + 1);
        output.write_struct(&header)?;

        let mut line = vec![0u8; bytes_per_line];
        let row_bytes = width_px * raster.mode().bytes_per_pixel();
        for row in raster.pixels().chunks_exact(row_bytes) {
            if planes == 1 {
                line[..width_px].copy_from_slice(row);
                encode_scanline(&line, &mut output);
            } else {
                for channel in 0..3 {
                    for (x, pixel) in row.chunks_exact(3).enumerate() {
                        line[x] = pixel[channel];
                    }
                    encode_scanline(&line, &mut output);
                }
            }
        }

        if let Some(palette) = raster.palette() {
            output.push(PALETTE_MARKER);
            output.extend_from_slice(palette.as_bytes());
        }

        Ok(output)
    }
}

/// Expand RLE data into exactly `expected` bytes.
fn decode_rle(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    let truncated = || Error::InvalidRaster("PCX image data ends early".to_string());

    let mut output = Vec::with_capacity(expected.min(data.len().saturating_mul(MAX_RUN)));
    let mut bytes = data.iter().copied();
    while output.len() < expected {
        let byte = bytes.next().ok_or_else(truncated)?;
        if byte & RUN_FLAG == RUN_FLAG {
            let value = bytes.next().ok_or_else(truncated)?;
            let count = usize::from(byte & !RUN_FLAG).min(expected - output.len());
            output.resize(output.len() + count, value);
        } else {
            output.push(byte);
        }
    }
    Ok(output)
}

/// RLE-encode one scanline. Runs never cross line boundaries.
fn encode_scanline(line: &[u8], output: &mut Vec<u8>) {
    let mut start = 0;
    while start < line.len() {
        let value = line[start];
        let run = line[start..]
            .iter()
            .take(MAX_RUN)
            .take_while(|&&b| b == value)
            .count();
        if run > 1 || value & RUN_FLAG == RUN_FLAG {
            output.push(RUN_FLAG | run as u8);
        }
        output.push(value);
        start += run;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_size() {
        assert_eq!(HEADER_SIZE, 128);
    }

    #[test]
    fn test_widest_line_is_rejected() {
        // 65535 pixels pad to a 65536 byte line, one past the header field.
        let raster = Raster::grayscale(u16::MAX, 1, vec![0; usize::from(u16::MAX)]).unwrap();
        assert!(matches!(Pcx.encode(&raster), Err(Error::InvalidRaster(_))));

        let raster = Raster::grayscale(u16::MAX - 1, 1, vec![0; usize::from(u16::MAX - 1)]).unwrap();
        assert!(Pcx.encode(&raster).is_ok());
    }

    #[test]
    fn test_scanline_runs() {
        let mut out = Vec::new();
        encode_scanline(&[5, 5, 5, 7, 0xC3, 0, 0], &mut out);
        assert_eq!(out, vec![0xC3, 5, 7, 0xC1, 0xC3, 0xC2, 0]);
        assert_eq!(decode_rle(&out, 7).unwrap(), vec![5, 5, 5, 7, 0xC3, 0, 0]);
    }

    #[test]
    fn test_long_runs_split() {
        let line = vec![9u8; 100];
        let mut out = Vec::new();
        encode_scanline(&line, &mut out);
        assert_eq!(out, vec![0xFF, 9, 0xC0 | 37, 9]);
        assert_eq!(decode_rle(&out, 100).unwrap(), line);
    }

    #[test]
    fn test_indexed_round_trip() {
        let pixels: Vec<u8> = (0..15u8).map(|i| i * 17).collect();
        let raster = Raster::indexed(5, 3, pixels, Palette::DEFAULT).unwrap();

        let bytes = Pcx.encode(&raster).unwrap();
        assert_eq!(bytes[0], MANUFACTURER);
        assert_eq!(bytes[bytes.len() - PALETTE_SIZE - 1], PALETTE_MARKER);

        assert_eq!(Pcx.decode(&bytes).unwrap(), raster);
    }

    #[test]
    fn test_rgb_round_trip() {
        let pixels: Vec<u8> = (0..3 * 3 * 2).map(|i| (i * 11) as u8).collect();
        let raster = Raster::rgb(3, 2, pixels).unwrap();
        let decoded = Pcx.decode(&Pcx.encode(&raster).unwrap()).unwrap();
        assert_eq!(decoded.mode(), RasterMode::Rgb);
        assert_eq!(decoded, raster);
    }

    #[test]
    fn test_grayscale_round_trip() {
        let raster = Raster::grayscale(1, 4, vec![0, 64, 128, 255]).unwrap();
        let decoded = Pcx.decode(&Pcx.encode(&raster).unwrap()).unwrap();
        assert_eq!(decoded, raster);
    }

    #[test]
    fn test_rejects_truncated_data() {
        let raster = Raster::grayscale(4, 4, (0..16).collect()).unwrap();
        let bytes = Pcx.encode(&raster).unwrap();
        assert!(matches!(
            Pcx.decode(&bytes[..bytes.len() - 2]),
            Err(Error::InvalidRaster(_))
        ));
        assert!(matches!(
            Pcx.decode(&bytes[..64]),
            Err(Error::Common(elma_common::Error::TruncatedInput { .. }))
        ));
    }

    #[test]
    fn test_rejects_unsupported_depth() {
        let raster = Raster::grayscale(2, 2, vec![1, 2, 3, 4]).unwrap();
        let mut bytes = Pcx.encode(&raster).unwrap();
        bytes[3] = 4;
        assert!(matches!(
            Pcx.decode(&bytes),
            Err(Error::UnsupportedRaster { bits: 4, planes: 1 })
        ));
    }
}
