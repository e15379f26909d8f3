//! Decoded rasters and the raster codec seam.
//!
//! The archive codec never looks inside raster bytes. It hands each embedded
//! blob to a [`RasterCodec`] and only accounts for its length. The built-in
//! implementation is [`Pcx`](crate::Pcx).

use crate::entry::Transparency;
use crate::palette::Palette;
use crate::{Error, Result};

/// Pixel layout of a [`Raster`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterMode {
    /// One palette index per pixel.
    Indexed,
    /// Three bytes (`r, g, b`) per pixel.
    Rgb,
    /// One luminance byte per pixel.
    Grayscale,
}

impl RasterMode {
    /// Bytes used by a single pixel.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            RasterMode::Indexed | RasterMode::Grayscale => 1,
            RasterMode::Rgb => 3,
        }
    }
}

/// Encodes and decodes the embedded raster blobs of an archive.
pub trait RasterCodec {
    /// Decode an embedded raster.
    fn decode(&self, data: &[u8]) -> Result<Raster>;

    /// Encode a raster into the embedded sub-format.
    fn encode(&self, raster: &Raster) -> Result<Vec<u8>>;
}

/// A decoded image: dimensions, pixel buffer and (for indexed images) palette.
///
/// An indexed raster always carries its palette; RGB and greyscale rasters
/// never do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u16,
    height: u16,
    mode: RasterMode,
    pixels: Vec<u8>,
    palette: Option<Palette>,
}

impl Raster {
    /// Create an indexed raster.
    pub fn indexed(width: u16, height: u16, pixels: Vec<u8>, palette: Palette) -> Result<Self> {
        Self::with_mode(width, height, RasterMode::Indexed, pixels, Some(palette))
    }

    /// Create an RGB raster from interleaved `r, g, b` bytes.
    pub fn rgb(width: u16, height: u16, pixels: Vec<u8>) -> Result<Self> {
        Self::with_mode(width, height, RasterMode::Rgb, pixels, None)
    }

    /// Create a greyscale raster.
    pub fn grayscale(width: u16, height: u16, pixels: Vec<u8>) -> Result<Self> {
        Self::with_mode(width, height, RasterMode::Grayscale, pixels, None)
    }

    fn with_mode(
        width: u16,
        height: u16,
        mode: RasterMode,
        pixels: Vec<u8>,
        palette: Option<Palette>,
    ) -> Result<Self> {
        let expected = usize::from(width) * usize::from(height) * mode.bytes_per_pixel();
        if pixels.len() != expected {
            return Err(Error::InvalidRaster(format!(
                "{width}x{height} {mode:?} raster needs {expected} bytes, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            mode,
            pixels,
            palette,
        })
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Pixel layout.
    #[inline]
    pub fn mode(&self) -> RasterMode {
        self.mode
    }

    /// Raw pixel bytes, row-major.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable pixel bytes. The buffer length is fixed by the dimensions.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// The palette of an indexed raster.
    #[inline]
    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    /// Replace the palette of an indexed raster without touching pixel indices.
    pub fn set_palette(&mut self, palette: Palette) -> Result<()> {
        if self.mode != RasterMode::Indexed {
            return Err(Error::InvalidRaster(format!(
                "cannot attach a palette to a {:?} raster",
                self.mode
            )));
        }
        self.palette = Some(palette);
        Ok(())
    }

    /// True for an indexed raster with a full 256-colour palette.
    #[inline]
    pub fn has_full_palette(&self) -> bool {
        self.mode == RasterMode::Indexed && self.palette.is_some()
    }

    /// Raw bytes of the pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u16, y: u16) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.mode.bytes_per_pixel();
        let offset = (usize::from(y) * usize::from(self.width) + usize::from(x)) * bpp;
        Some(&self.pixels[offset..offset + bpp])
    }

    /// Resolve a transparency rule to the palette index treated as transparent.
    ///
    /// Only meaningful for indexed rasters; corner rules read the index at
    /// that corner.
    pub fn transparent_index(&self, rule: Transparency) -> Option<u8> {
        if self.mode != RasterMode::Indexed {
            return None;
        }
        let (right, bottom) = (self.width.checked_sub(1)?, self.height.checked_sub(1)?);
        let (x, y) = match rule {
            Transparency::PaletteIndexZero => return Some(0),
            Transparency::TopLeft => (0, 0),
            Transparency::TopRight => (right, 0),
            Transparency::BottomLeft => (0, bottom),
            Transparency::BottomRight => (right, bottom),
        };
        self.pixel(x, y).map(|p| p[0])
    }

    /// Expand to RGBA8, optionally making one palette index fully transparent.
    pub fn to_rgba(&self, transparent: Option<u8>) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(usize::from(self.width) * usize::from(self.height) * 4);
        match self.mode {
            RasterMode::Indexed => {
                let palette = self.palette.as_ref().unwrap_or(&Palette::DEFAULT);
                for &index in &self.pixels {
                    let [r, g, b] = palette.color(index);
                    let alpha = if Some(index) == transparent { 0 } else { 255 };
                    rgba.extend_from_slice(&[r, g, b, alpha]);
                }
            }
            RasterMode::Rgb => {
                for pixel in self.pixels.chunks_exact(3) {
                    rgba.extend_from_slice(&[pixel[0], pixel[1], pixel[2], 255]);
                }
            }
            RasterMode::Grayscale => {
                for &level in &self.pixels {
                    rgba.extend_from_slice(&[level, level, level, 255]);
                }
            }
        }
        rgba
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Raster {
        Raster::indexed(2, 2, vec![1, 2, 3, 4], Palette::DEFAULT).unwrap()
    }

    #[test]
    fn test_rejects_wrong_buffer_size() {
        assert!(Raster::rgb(2, 2, vec![0; 4]).is_err());
        assert!(Raster::rgb(2, 2, vec![0; 12]).is_ok());
    }

    #[test]
    fn test_transparent_index_corners() {
        let raster = checker();
        assert_eq!(raster.transparent_index(Transparency::PaletteIndexZero), Some(0));
        assert_eq!(raster.transparent_index(Transparency::TopLeft), Some(1));
        assert_eq!(raster.transparent_index(Transparency::TopRight), Some(2));
        assert_eq!(raster.transparent_index(Transparency::BottomLeft), Some(3));
        assert_eq!(raster.transparent_index(Transparency::BottomRight), Some(4));
    }

    #[test]
    fn test_palette_only_on_indexed() {
        let mut gray = Raster::grayscale(1, 1, vec![9]).unwrap();
        assert!(!gray.has_full_palette());
        assert!(gray.set_palette(Palette::DEFAULT).is_err());
        assert!(checker().has_full_palette());
    }

    #[test]
    fn test_to_rgba_applies_transparency() {
        let raster = checker();
        let rgba = raster.to_rgba(Some(1));
        assert_eq!(rgba.len(), 16);
        assert_eq!(rgba[3], 0);
        assert_eq!(rgba[7], 255);
        assert_eq!(&rgba[4..7], &Palette::DEFAULT.color(2));
    }
}
