use std::{ffi::OsStr, path::Path};

use image::RgbaImage;
use nom::Parser;

use crate::{error::SprError, parser::parse_spr, Spr, SprFormat, SprImage, TextureFormat};

impl Spr {
    pub fn open_from_bytes(i: &[u8]) -> Result<Spr, SprError> {
        parse_spr
            .parse(i)
            .map_err(move |op| SprError::NomError {
                source: op.to_owned(),
            })
            .map(move |(_, res)| res)
    }

    pub fn open_from_file(path: impl AsRef<OsStr> + AsRef<Path>) -> Result<Spr, SprError> {
        let file = std::fs::read(path).map_err(|op| SprError::IOError { source: op })?;

        Self::open_from_bytes(&file)
    }

    /// Expands `image` through the palette the way the engine would blend it.
    pub fn to_rgba8(&self, image: &SprImage) -> RgbaImage {
        let stride_length = image.width as u32;
        let mut res = RgbaImage::new(image.width as u32, image.height as u32);
        let reserved = self.header.format.reserved_index();

        res.enumerate_pixels_mut().for_each(|(x, y, pixel)| {
            let color_index = image.raster[(x + y * stride_length) as usize];
            let [r, g, b] = self
                .palette
                .get_bytes()
                .get(color_index as usize)
                .copied()
                .unwrap_or_default();

            let alpha = match self.header.format {
                SprFormat::HalfLife {
                    texture_format: TextureFormat::IndexAlpha,
                } => color_index,
                _ if reserved == Some(color_index) => 0,
                _ => 255,
            };

            *pixel = [r, g, b, alpha].into();
        });

        res
    }
}
