use std::{fmt, str::FromStr};

use crate::error::SprError;

pub const SPR_MAGIC: &[u8; 4] = b"IDSP";

/// Quake sprites keep the last palette slot as the transparent marker.
pub const QUAKE_TRANSPARENT_INDEX: u8 = 255;

pub const FRAME_SINGLE: i32 = 0;
pub const FRAME_GROUP: i32 = 1;

/// How the engine orients the sprite in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum Alignment {
    ViewParallelUpright = 0,
    FacingUpright = 1,
    #[default]
    ViewParallel = 2,
    Oriented = 3,
    ViewParallelOriented = 4,
}

/// Half-Life render mode of the sprite texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum TextureFormat {
    #[default]
    Normal = 0,
    Additive = 1,
    IndexAlpha = 2,
    AlphaTest = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum SyncType {
    #[default]
    Synchronized = 0,
    Random = 1,
}

/// The two wire variants.
///
/// Quake sprites (version 1) carry no palette and no texture format. The palette is implied
/// and has 256 colors with [`QUAKE_TRANSPARENT_INDEX`] reserved.
///
/// Half-Life sprites (version 2) embed a palette of any length from 1 to 256 and always carry
/// a texture format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SprFormat {
    Quake,
    HalfLife { texture_format: TextureFormat },
}

impl SprFormat {
    pub fn version(&self) -> i32 {
        match self {
            SprFormat::Quake => 1,
            SprFormat::HalfLife { .. } => 2,
        }
    }

    pub fn texture_format(&self) -> Option<TextureFormat> {
        match self {
            SprFormat::Quake => None,
            SprFormat::HalfLife { texture_format } => Some(*texture_format),
        }
    }

    /// Palette slot that quantization must never pick.
    pub fn reserved_index(&self) -> Option<u8> {
        match self {
            SprFormat::Quake => Some(QUAKE_TRANSPARENT_INDEX),
            SprFormat::HalfLife {
                texture_format: TextureFormat::AlphaTest,
            } => Some(QUAKE_TRANSPARENT_INDEX),
            SprFormat::HalfLife { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette(pub Vec<[u8; 3]>);

impl Palette {
    pub fn new(s: impl Into<Vec<[u8; 3]>>) -> Self {
        Self(s.into())
    }

    /// Reads exactly `color_count` RGB triplets, no header.
    pub fn from_raw_bytes(bytes: &[u8], color_count: usize) -> Result<Self, SprError> {
        if bytes.len() < color_count * 3 {
            return Err(SprError::ShortPalette {
                expect: color_count * 3,
                have: bytes.len(),
            });
        }

        Ok(Self(
            bytes[..color_count * 3]
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]])
                .collect(),
        ))
    }

    pub fn get_bytes(&self) -> &Vec<[u8; 3]> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One picture. Offsets are local, the sprite's global offset is added at write time.
///
/// `offset_y` grows upward like the engine's, so an image whose top row sits on canvas row `n`
/// has `offset_y == -n`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SprImage {
    pub offset_x: i32,
    pub offset_y: i32,
    pub width: i32,
    pub height: i32,
    pub raster: Vec<u8>,
}

impl SprImage {
    pub fn new(
        offset_x: i32,
        offset_y: i32,
        width: i32,
        height: i32,
        raster: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            offset_x,
            offset_y,
            width,
            height,
            raster: raster.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SprGroup {
    /// Cumulative display instant of every image in seconds. Strictly increasing.
    pub keys: Vec<f32>,
    pub images: Vec<SprImage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SprFrame {
    Single(SprImage),
    Group(SprGroup),
}

impl SprFrame {
    pub fn images(&self) -> &[SprImage] {
        match self {
            SprFrame::Single(image) => std::slice::from_ref(image),
            SprFrame::Group(group) => &group.images,
        }
    }
}

pub type SprFrames = Vec<SprFrame>;

#[derive(Debug, Clone, PartialEq)]
pub struct SprHeader {
    pub format: SprFormat,
    pub alignment: Alignment,
    pub bounding_radius: f32,
    pub max_width: i32,
    pub max_height: i32,
    /// Unused by every engine, always 0 when we write.
    pub beam_length: f32,
    pub sync_type: SyncType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spr {
    pub header: SprHeader,
    pub palette: Palette,
    /// Global offset added to every image offset on write.
    pub offset_x: i32,
    pub offset_y: i32,
    pub frames: SprFrames,
}

macro_rules! impl_name_enum {
    ($ty:ty, $what:literal, [$(($variant:path, $($name:literal)|+)),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = SprError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($($name)|+ => Ok($variant),)+
                    _ => Err(SprError::UnknownName {
                        kind: $what,
                        name: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let name = match self {
                    $($variant => [$($name),+][0],)+
                };

                f.write_str(name)
            }
        }

        impl TryFrom<i32> for $ty {
            type Error = SprError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                [$($variant),+]
                    .into_iter()
                    .find(|variant| *variant as i32 == value)
                    .ok_or(SprError::UnknownValue {
                        kind: $what,
                        value,
                    })
            }
        }
    };
}

impl_name_enum!(
    Alignment,
    "alignment",
    [
        (Alignment::ViewParallelUpright, "vp-parallel-upright"),
        (Alignment::FacingUpright, "upright" | "facing-upright"),
        (Alignment::ViewParallel, "vp-parallel"),
        (Alignment::Oriented, "oriented"),
        (Alignment::ViewParallelOriented, "vp-parallel-oriented"),
    ]
);

impl_name_enum!(
    TextureFormat,
    "blend mode",
    [
        (TextureFormat::Normal, "normal"),
        (TextureFormat::Additive, "additive"),
        (TextureFormat::IndexAlpha, "index-alpha" | "indexalpha"),
        (TextureFormat::AlphaTest, "alpha-test" | "alphatest"),
    ]
);

impl_name_enum!(
    SyncType,
    "sync type",
    [
        (SyncType::Synchronized, "synchronized" | "sync"),
        (SyncType::Random, "random"),
    ]
);
