//! LGR archive entries and their `pictures.lst` metadata.
//!
//! Most images in an LGR file have a row in the `pictures.lst` table giving
//! their type, default distance, clipping and transparency. Special images
//! (bike parts, `qkiller`, `qexit`, `qframe`, `qcolors`, `qgrass`, the
//! `qfood*` apples and the `qup_*`/`qdown_*` gravity arrows) do not. Which of
//! the two an entry is follows from its name alone, so the entry stores the
//! result as an [`EntryKind`] when it is created or renamed.

use crate::raster::Raster;

/// Opaque 7 bytes stored next to every embedded image.
pub const DEFAULT_PADDING: [u8; 7] = [0; 7];

/// Images that never appear in `pictures.lst`.
const SPECIAL_NAMES: &[&str] = &[
    "q1body", "q1thigh", "q1leg", "q1bike", "q1wheel", "q1susp1", "q1susp2", "q1forarm",
    "q1up_arm", "q1head", "q2body", "q2thigh", "q2leg", "q2bike", "q2wheel", "q2susp1",
    "q2susp2", "q2forarm", "q2up_arm", "q2head", "qkiller", "qexit", "qframe", "qcolors",
    "qgrass",
];

/// Apple images.
const FOOD_NAMES: &[&str] = &[
    "qfood1", "qfood2", "qfood3", "qfood4", "qfood5", "qfood6", "qfood7", "qfood8", "qfood9",
];

const QUP_PREFIX: &str = "qup_";
const QDOWN_PREFIX: &str = "qdown_";

/// Case-insensitive name comparison used for every LGR lookup.
pub fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Name is one of the fixed images excluded from `pictures.lst`.
pub fn is_excluded_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    SPECIAL_NAMES.contains(&lower.as_str())
}

/// Name is one of the `qfood1`..`qfood9` apple images.
pub fn is_food_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    FOOD_NAMES.contains(&lower.as_str())
}

/// Name is a `qup_*` or `qdown_*` gravity arrow.
pub fn is_qup_qdown_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.starts_with(QUP_PREFIX) || lower.starts_with(QDOWN_PREFIX)
}

/// True when an image with this name carries no `pictures.lst` metadata.
pub fn is_special_name(name: &str) -> bool {
    is_excluded_name(name) || is_food_name(name) || is_qup_qdown_name(name)
}

/// How a listed image is used by the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ImageType {
    Picture = 100,
    Texture = 101,
    Mask = 102,
}

/// Default clipping of a picture or texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Clipping {
    Unclipped = 0,
    Ground = 1,
    Sky = 2,
}

/// Which colour of an image is drawn transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Transparency {
    /// Palette index 0.
    PaletteIndexZero = 11,
    TopLeft = 12,
    TopRight = 13,
    BottomLeft = 14,
    BottomRight = 15,
}

macro_rules! u32_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $ty {
            /// On-disk value.
            #[inline]
            pub const fn as_u32(self) -> u32 {
                self as u32
            }
        }

        impl TryFrom<u32> for $ty {
            type Error = u32;

            fn try_from(value: u32) -> std::result::Result<Self, Self::Error> {
                $(
                    if value == $ty::$variant as u32 {
                        return Ok($ty::$variant);
                    }
                )+
                Err(value)
            }
        }
    };
}

u32_enum!(ImageType { Picture, Texture, Mask });
u32_enum!(Clipping { Unclipped, Ground, Sky });
u32_enum!(Transparency { PaletteIndexZero, TopLeft, TopRight, BottomLeft, BottomRight });

/// One `pictures.lst` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PictureInfo {
    pub image_type: ImageType,
    /// Default z-order distance, 1-999.
    pub distance: u32,
    pub clipping: Clipping,
    pub transparency: Transparency,
}

impl Default for PictureInfo {
    fn default() -> Self {
        Self {
            image_type: ImageType::Picture,
            distance: 500,
            clipping: Clipping::Sky,
            transparency: Transparency::TopLeft,
        }
    }
}

/// Whether an entry participates in `pictures.lst`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular image with metadata.
    Listed(PictureInfo),
    /// Special image without metadata.
    Special,
}

impl EntryKind {
    fn for_name(name: &str, info: Option<PictureInfo>) -> Self {
        if is_special_name(name) {
            EntryKind::Special
        } else {
            EntryKind::Listed(info.unwrap_or_default())
        }
    }
}

/// A named image stored in an LGR archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LgrEntry {
    name: String,
    raster: Raster,
    padding: [u8; 7],
    kind: EntryKind,
}

impl LgrEntry {
    /// Create an entry; listed entries start with default metadata.
    pub fn new(name: impl Into<String>, raster: Raster) -> Self {
        Self::from_parts(name.into(), raster, DEFAULT_PADDING, None)
    }

    /// Build an entry, keeping `info` only if the name is a listed one.
    pub(crate) fn from_parts(
        name: String,
        raster: Raster,
        padding: [u8; 7],
        info: Option<PictureInfo>,
    ) -> Self {
        let kind = EntryKind::for_name(&name, info);
        Self {
            name,
            raster,
            padding,
            kind,
        }
    }

    /// Set the metadata. Ignored for special entries.
    pub fn with_info(mut self, info: PictureInfo) -> Self {
        if let EntryKind::Listed(current) = &mut self.kind {
            *current = info;
        }
        self
    }

    /// Set the padding bytes.
    pub fn with_padding(mut self, padding: [u8; 7]) -> Self {
        self.padding = padding;
        self
    }

    /// Entry name, without the `.pcx` extension.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the entry, re-deriving its kind.
    ///
    /// Existing metadata survives when the entry stays listed.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.kind = EntryKind::for_name(&self.name, self.info().copied());
    }

    /// Case-insensitive name match.
    #[inline]
    pub fn matches(&self, name: &str) -> bool {
        same_name(&self.name, name)
    }

    #[inline]
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    #[inline]
    pub fn raster_mut(&mut self) -> &mut Raster {
        &mut self.raster
    }

    pub fn set_raster(&mut self, raster: Raster) {
        self.raster = raster;
    }

    #[inline]
    pub fn padding(&self) -> &[u8; 7] {
        &self.padding
    }

    pub fn set_padding(&mut self, padding: [u8; 7]) {
        self.padding = padding;
    }

    #[inline]
    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    /// Metadata of a listed entry.
    #[inline]
    pub fn info(&self) -> Option<&PictureInfo> {
        match &self.kind {
            EntryKind::Listed(info) => Some(info),
            EntryKind::Special => None,
        }
    }

    /// Mutable metadata of a listed entry.
    #[inline]
    pub fn info_mut(&mut self) -> Option<&mut PictureInfo> {
        match &mut self.kind {
            EntryKind::Listed(info) => Some(info),
            EntryKind::Special => None,
        }
    }

    /// True when the entry has a `pictures.lst` row.
    #[inline]
    pub fn is_listed(&self) -> bool {
        matches!(self.kind, EntryKind::Listed(_))
    }

    /// True for images the game treats specially.
    #[inline]
    pub fn is_special(&self) -> bool {
        !self.is_listed()
    }

    pub fn is_food(&self) -> bool {
        is_food_name(&self.name)
    }

    pub fn is_qup_qdown(&self) -> bool {
        is_qup_qdown_name(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Palette;

    fn tiny() -> Raster {
        Raster::indexed(1, 1, vec![0], Palette::DEFAULT).unwrap()
    }

    #[test]
    fn test_participation_predicate() {
        assert!(!is_special_name("barrel"));
        assert!(is_special_name("qfood1"));
        assert!(is_special_name("QFOOD9"));
        assert!(is_special_name("q1bike"));
        assert!(is_special_name("QColors"));
        assert!(is_special_name("qup_0"));
        assert!(is_special_name("qdown_wall"));
        assert!(!is_special_name("qfood10"));
        assert!(!is_special_name("qupper"));
    }

    #[test]
    fn test_kind_selected_from_name() {
        let barrel = LgrEntry::new("barrel", tiny());
        assert!(barrel.is_listed());
        assert_eq!(barrel.info(), Some(&PictureInfo::default()));

        let food = LgrEntry::new("qfood1", tiny()).with_info(PictureInfo {
            image_type: ImageType::Texture,
            ..PictureInfo::default()
        });
        assert!(food.is_special());
        assert!(food.is_food());
        assert_eq!(food.info(), None);
    }

    #[test]
    fn test_rename_rederives_kind() {
        let info = PictureInfo {
            image_type: ImageType::Mask,
            distance: 42,
            clipping: Clipping::Ground,
            transparency: Transparency::BottomRight,
        };
        let mut entry = LgrEntry::new("maskbig", tiny()).with_info(info);

        entry.set_name("MaskTop");
        assert_eq!(entry.info(), Some(&info));

        entry.set_name("qframe");
        assert!(entry.is_special());

        entry.set_name("tree");
        assert_eq!(entry.info(), Some(&PictureInfo::default()));
    }

    #[test]
    fn test_enum_values() {
        assert_eq!(ImageType::Mask.as_u32(), 102);
        assert_eq!(Transparency::try_from(13), Ok(Transparency::TopRight));
        assert_eq!(Clipping::try_from(3), Err(3));
        assert_eq!(ImageType::try_from(100), Ok(ImageType::Picture));
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        assert!(LgrEntry::new("Barrel", tiny()).matches("BARREL"));
    }
}
