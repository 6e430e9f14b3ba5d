//! Conversion options.
//!
//! Options come from an optional `.toml` file and from the command line. Both are collected as
//! raw strings first so one set of parsers reports every bad value the same way.
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;
use spr::{Alignment, SprFormat, SyncType, TextureFormat};

use crate::error::Gif2SprError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Origin {
    pub x: f64,
    pub y: f64,
}

impl Default for Origin {
    fn default() -> Self {
        Self { x: 0.5, y: 0.5 }
    }
}

impl Origin {
    /// Offsets of the canvas' upper left corner from the origin, with Y going up.
    pub fn offsets(&self, width: usize, height: usize) -> (i32, i32) {
        (
            (-self.x * width as f64).floor() as i32,
            ((1. - self.y) * height as f64).floor() as i32,
        )
    }
}

impl FromStr for Origin {
    type Err = Gif2SprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut components = s.split(',');

        let mut component = |axis: &str| -> Result<f64, Gif2SprError> {
            let Some(text) = components.next().map(str::trim) else {
                return Err(Gif2SprError::configuration(format!("Missing origin {axis}.")));
            };

            let value = text.parse::<f64>().map_err(|_| {
                Gif2SprError::configuration(format!("Cannot parse origin {axis}: \"{text}\""))
            })?;

            if !value.is_finite() {
                return Err(Gif2SprError::configuration(format!(
                    "Origin {axis} is not finite."
                )));
            }

            Ok(value)
        };

        let x = component("X")?;
        let y = component("Y")?;

        if components.next().is_some() {
            return Err(Gif2SprError::configuration(format!(
                "Too many origin components: \"{s}\""
            )));
        }

        Ok(Self { x, y })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetFormat {
    #[default]
    Quake,
    HalfLife,
}

impl TargetFormat {
    pub fn spr_format(&self, blend: TextureFormat) -> SprFormat {
        match self {
            TargetFormat::Quake => SprFormat::Quake,
            TargetFormat::HalfLife => SprFormat::HalfLife {
                texture_format: blend,
            },
        }
    }
}

impl FromStr for TargetFormat {
    type Err = Gif2SprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "quake" | "q1" | "1" => Ok(Self::Quake),
            "half-life" | "halflife" | "hl" | "2" => Ok(Self::HalfLife),
            _ => Err(Gif2SprError::configuration(format!(
                "Unknown sprite format: \"{s}\""
            ))),
        }
    }
}

/// How GIF frames become sprite frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameLayout {
    /// All frames in one timed group frame.
    #[default]
    Group,
    /// One single frame per GIF frame.
    Single,
}

impl FromStr for FrameLayout {
    type Err = Gif2SprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "group" => Ok(Self::Group),
            "single" | "singles" => Ok(Self::Single),
            _ => Err(Gif2SprError::configuration(format!(
                "Unknown frame layout: \"{s}\""
            ))),
        }
    }
}

pub fn parse_tint(s: &str) -> Result<[u8; 3], Gif2SprError> {
    let channels = s
        .split(',')
        .map(|channel| channel.trim().parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| Gif2SprError::configuration(format!("Cannot parse tint: \"{s}\"")))?;

    channels.try_into().map_err(|_| {
        Gif2SprError::configuration(format!("Tint needs exactly 3 components: \"{s}\""))
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gif2SprOptions {
    pub origin: Origin,
    pub alignment: Alignment,
    pub format: TargetFormat,
    pub blend: TextureFormat,
    /// Only used by index-alpha sprites.
    pub tint: [u8; 3],
    pub sync: SyncType,
    pub frames: FrameLayout,
    pub crop: bool,
    /// Raw 256 color palette for Quake sprites. Built-in palette otherwise.
    pub palette: Option<PathBuf>,
}

impl Default for Gif2SprOptions {
    fn default() -> Self {
        Self {
            origin: Origin::default(),
            alignment: Alignment::ViewParallel,
            format: TargetFormat::Quake,
            blend: TextureFormat::Normal,
            tint: [255, 255, 255],
            sync: SyncType::Synchronized,
            frames: FrameLayout::Group,
            crop: true,
            palette: None,
        }
    }
}

impl Gif2SprOptions {
    pub fn spr_format(&self) -> SprFormat {
        self.format.spr_format(self.blend)
    }

    pub fn validate(&self) -> Result<(), Gif2SprError> {
        if self.format == TargetFormat::Quake && self.blend != TextureFormat::Normal {
            return Err(Gif2SprError::configuration(format!(
                "Blend mode \"{}\" needs a half-life sprite.",
                self.blend
            )));
        }

        if self.format == TargetFormat::HalfLife && self.palette.is_some() {
            return Err(Gif2SprError::configuration(
                "External palettes only apply to quake sprites.",
            ));
        }

        if self.blend != TextureFormat::IndexAlpha && self.tint != [255, 255, 255] {
            warn!("Tint is only used by index-alpha sprites, ignoring it.");
        }

        Ok(())
    }
}

/// Unparsed options. Every field is optional so layers can be stacked.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RawOptions {
    pub origin: Option<String>,
    pub alignment: Option<String>,
    pub format: Option<String>,
    pub blend: Option<String>,
    pub tint: Option<String>,
    pub sync: Option<String>,
    pub frames: Option<String>,
    pub crop: Option<bool>,
    pub palette: Option<PathBuf>,
}

impl RawOptions {
    /// Values set in `other` win.
    pub fn merge(self, other: RawOptions) -> RawOptions {
        RawOptions {
            origin: other.origin.or(self.origin),
            alignment: other.alignment.or(self.alignment),
            format: other.format.or(self.format),
            blend: other.blend.or(self.blend),
            tint: other.tint.or(self.tint),
            sync: other.sync.or(self.sync),
            frames: other.frames.or(self.frames),
            crop: other.crop.or(self.crop),
            palette: other.palette.or(self.palette),
        }
    }
}

fn parse_field<T>(value: Option<String>, default: T) -> Result<T, Gif2SprError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(value) => value
            .parse()
            .map_err(|err: T::Err| Gif2SprError::configuration(err.to_string())),
        None => Ok(default),
    }
}

impl TryFrom<RawOptions> for Gif2SprOptions {
    type Error = Gif2SprError;

    fn try_from(raw: RawOptions) -> Result<Self, Self::Error> {
        let default = Gif2SprOptions::default();

        let options = Gif2SprOptions {
            origin: parse_field(raw.origin, default.origin)?,
            alignment: parse_field(raw.alignment, default.alignment)?,
            format: parse_field(raw.format, default.format)?,
            blend: parse_field(raw.blend, default.blend)?,
            tint: match raw.tint {
                Some(tint) => parse_tint(&tint)?,
                None => default.tint,
            },
            sync: parse_field(raw.sync, default.sync)?,
            frames: parse_field(raw.frames, default.frames)?,
            crop: raw.crop.unwrap_or(default.crop),
            palette: raw.palette,
        };

        options.validate()?;

        Ok(options)
    }
}

/// Parses a `.toml` option file. A relative palette path is taken from the file's folder.
pub fn parse_config_from_file(path: &Path) -> Result<RawOptions, Gif2SprError> {
    let buffer = fs::read_to_string(path)
        .map_err(|op| Gif2SprError::io(path, "Failed to open file.", op))?;

    let mut raw: RawOptions = toml::from_str(&buffer).map_err(|err| {
        Gif2SprError::configuration(format!("{}: {}", path.display(), err))
    })?;

    if let (Some(palette), Some(root)) = (raw.palette.as_ref(), path.parent()) {
        if palette.is_relative() {
            raw.palette = Some(root.join(palette));
        }
    }

    Ok(raw)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_origin_is_center() {
        let origin = "0.5,0.5".parse::<Origin>().unwrap();

        assert_eq!(origin, Origin::default());
        assert_eq!(origin.offsets(64, 32), (-32, 16));
    }

    #[test]
    fn origin_floors() {
        let origin = "0.5, 0.5".parse::<Origin>().unwrap();

        assert_eq!(origin.offsets(5, 5), (-3, 2));
        assert_eq!("0,1".parse::<Origin>().unwrap().offsets(8, 8), (0, 0));
    }

    #[test]
    fn bad_origins() {
        assert!("0.5".parse::<Origin>().unwrap_err().is_configuration());
        assert!("a,0.5".parse::<Origin>().is_err());
        assert!("inf,0.5".parse::<Origin>().is_err());
        assert!("0.5,NaN".parse::<Origin>().is_err());
        assert!("0.5,0.5,0.5".parse::<Origin>().is_err());
    }

    #[test]
    fn tint() {
        assert_eq!(parse_tint("255, 128,0").unwrap(), [255, 128, 0]);
        assert!(parse_tint("255,128").is_err());
        assert!(parse_tint("256,0,0").is_err());
    }

    #[test]
    fn raw_to_options() {
        let raw = RawOptions {
            format: Some("hl".to_string()),
            blend: Some("index-alpha".to_string()),
            tint: Some("10,20,30".to_string()),
            alignment: Some("oriented".to_string()),
            frames: Some("single".to_string()),
            crop: Some(false),
            ..Default::default()
        };

        let options = Gif2SprOptions::try_from(raw).unwrap();

        assert_eq!(options.format, TargetFormat::HalfLife);
        assert_eq!(options.blend, TextureFormat::IndexAlpha);
        assert_eq!(options.tint, [10, 20, 30]);
        assert_eq!(options.alignment, Alignment::Oriented);
        assert_eq!(options.frames, FrameLayout::Single);
        assert!(!options.crop);
        assert_eq!(options.sync, SyncType::Synchronized);
    }

    #[test]
    fn unknown_enum_name() {
        let raw = RawOptions {
            alignment: Some("diagonal".to_string()),
            ..Default::default()
        };

        assert!(Gif2SprOptions::try_from(raw)
            .unwrap_err()
            .is_configuration());
    }

    #[test]
    fn blend_needs_half_life() {
        let raw = RawOptions {
            blend: Some("additive".to_string()),
            ..Default::default()
        };

        assert!(Gif2SprOptions::try_from(raw).is_err());
    }

    #[test]
    fn merge_prefers_later() {
        let file = RawOptions {
            format: Some("hl".to_string()),
            sync: Some("random".to_string()),
            ..Default::default()
        };
        let cli = RawOptions {
            format: Some("quake".to_string()),
            ..Default::default()
        };

        let merged = file.merge(cli);

        assert_eq!(merged.format.as_deref(), Some("quake"));
        assert_eq!(merged.sync.as_deref(), Some("random"));
    }

    #[test]
    fn config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gif2spr.toml");

        fs::write(
            &path,
            "format = \"quake\"\norigin = \"0.5,1\"\npalette = \"palette.lmp\"\ncrop = false\n",
        )
        .unwrap();

        let raw = parse_config_from_file(&path).unwrap();

        assert_eq!(raw.origin.as_deref(), Some("0.5,1"));
        assert_eq!(raw.crop, Some(false));
        assert_eq!(raw.palette, Some(dir.path().join("palette.lmp")));
    }

    #[test]
    fn config_file_unknown_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gif2spr.toml");

        fs::write(&path, "colour = \"red\"\n").unwrap();

        assert!(parse_config_from_file(&path)
            .unwrap_err()
            .is_configuration());
    }
}
