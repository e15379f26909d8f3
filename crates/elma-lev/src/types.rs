//! Level geometry, objects and pictures.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use elma_common::Error as CommonError;

/// A point in level coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A closed polygon. Grass polygons are drawn as grass and are not solid.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polygon {
    pub grass: bool,
    pub vertices: Vec<Position>,
}

impl Polygon {
    /// Solid ground polygon.
    pub fn new(vertices: Vec<Position>) -> Self {
        Self { grass: false, vertices }
    }

    /// Grass polygon.
    pub fn grass(vertices: Vec<Position>) -> Self {
        Self { grass: true, vertices }
    }
}

/// Gravity change applied when an apple is eaten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u32)]
pub enum Gravity {
    #[default]
    Normal = 0,
    Up = 1,
    Down = 2,
    Left = 3,
    Right = 4,
}

impl Gravity {
    /// On-disk value.
    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for Gravity {
    type Error = CommonError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Gravity::Normal),
            1 => Ok(Gravity::Up),
            2 => Ok(Gravity::Down),
            3 => Ok(Gravity::Left),
            4 => Ok(Gravity::Right),
            other => Err(CommonError::BadFormat(format!("unknown gravity {other}"))),
        }
    }
}

/// Apple animations are numbered 1 through 9 (`qfood1`..`qfood9`).
pub const MAX_ANIMATION: u8 = 9;

/// What an object is. Only apples carry gravity and animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObjectKind {
    Flower,
    Food { gravity: Gravity, animation: u8 },
    Killer,
    Start,
}

impl ObjectKind {
    /// Plain apple with normal gravity and the first animation.
    pub const FOOD: ObjectKind = ObjectKind::Food {
        gravity: Gravity::Normal,
        animation: 1,
    };

    /// On-disk kind code.
    pub const fn code(self) -> u32 {
        match self {
            ObjectKind::Flower => 1,
            ObjectKind::Food { .. } => 2,
            ObjectKind::Killer => 3,
            ObjectKind::Start => 4,
        }
    }

    /// Builds a kind from its on-disk fields. `animation` is stored zero-based.
    pub(crate) fn from_raw(code: u32, gravity: u32, animation: u32) -> Result<Self, CommonError> {
        match code {
            1 => Ok(ObjectKind::Flower),
            2 => {
                let gravity = Gravity::try_from(gravity)?;
                let animation = u8::try_from(animation)
                    .ok()
                    .and_then(|a| a.checked_add(1))
                    .filter(|a| *a <= MAX_ANIMATION)
                    .ok_or_else(|| CommonError::BadFormat(format!("unknown animation {animation}")))?;
                Ok(ObjectKind::Food { gravity, animation })
            }
            3 => Ok(ObjectKind::Killer),
            4 => Ok(ObjectKind::Start),
            other => Err(CommonError::BadFormat(format!("unknown object kind {other}"))),
        }
    }

    /// Gravity and zero-based animation as stored on disk.
    pub(crate) fn raw_food_fields(self) -> (u32, u32) {
        match self {
            ObjectKind::Food { gravity, animation } => {
                (gravity.as_u32(), u32::from(animation.saturating_sub(1)))
            }
            _ => (0, 0),
        }
    }
}

/// A level object.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Object {
    pub position: Position,
    pub kind: ObjectKind,
}

impl Object {
    pub const fn new(position: Position, kind: ObjectKind) -> Self {
        Self { position, kind }
    }
}

/// How a picture is clipped against the level geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u32)]
pub enum Clipping {
    Unclipped = 0,
    Ground = 1,
    #[default]
    Sky = 2,
}

impl TryFrom<u32> for Clipping {
    type Error = CommonError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Clipping::Unclipped),
            1 => Ok(Clipping::Ground),
            2 => Ok(Clipping::Sky),
            other => Err(CommonError::BadFormat(format!("unknown clipping {other}"))),
        }
    }
}

/// A decorative picture or a texture drawn through a mask.
///
/// Plain pictures set `name` and leave `texture`/`mask` empty; textured
/// pictures do the opposite.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Picture {
    pub position: Position,
    pub name: String,
    pub texture: String,
    pub mask: String,
    /// Z-order, 1-999.
    pub distance: u32,
    pub clipping: Clipping,
}

impl Picture {
    /// A `barrel` at `position` with default distance and clipping.
    pub fn new(position: Position) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// A plain picture.
    pub fn named(position: Position, name: impl Into<String>) -> Self {
        Self {
            position,
            name: name.into(),
            ..Self::default()
        }
    }

    /// A texture drawn through a mask.
    pub fn textured(position: Position, texture: impl Into<String>, mask: impl Into<String>) -> Self {
        Self {
            position,
            name: String::new(),
            texture: texture.into(),
            mask: mask.into(),
            ..Self::default()
        }
    }
}

impl Default for Picture {
    fn default() -> Self {
        Self {
            position: Position::default(),
            name: "barrel".to_string(),
            texture: String::new(),
            mask: String::new(),
            distance: 600,
            clipping: Clipping::Sky,
        }
    }
}
