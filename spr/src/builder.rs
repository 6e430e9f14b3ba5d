use crate::{
    error::SprError, Alignment, Palette, Spr, SprFormat, SprFrame, SprGroup, SprHeader, SprImage,
    SyncType,
};

impl Spr {
    /// Creates an empty sprite.
    ///
    /// `offset_x` and `offset_y` place the upper left corner of the canvas relative to the
    /// sprite origin. The bounding radius is fixed here and never recomputed as frames come in.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        format: SprFormat,
        alignment: Alignment,
        max_width: i32,
        max_height: i32,
        sync_type: SyncType,
        palette: Palette,
        offset_x: i32,
        offset_y: i32,
    ) -> Result<Self, SprError> {
        match format {
            SprFormat::Quake if palette.len() != 256 => {
                return Err(SprError::QuakePaletteSize {
                    have: palette.len(),
                })
            }
            SprFormat::HalfLife { .. } if palette.is_empty() || palette.len() > 256 => {
                return Err(SprError::PaletteSize {
                    have: palette.len(),
                })
            }
            _ => (),
        }

        Ok(Self {
            header: SprHeader {
                format,
                alignment,
                bounding_radius: bounding_radius(max_width, max_height, offset_x, offset_y),
                max_width,
                max_height,
                beam_length: 0.,
                sync_type,
            },
            palette,
            offset_x,
            offset_y,
            frames: vec![],
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Appends a copy of `image` as a single frame.
    pub fn append_single_frame(&mut self, image: &SprImage) -> Result<(), SprError> {
        self.check_image(image)?;
        self.frames.push(SprFrame::Single(image.clone()));

        Ok(())
    }

    /// Appends copies of `images` as one group frame.
    ///
    /// `delays` is how long each image stays up, in seconds.
    pub fn append_group_frame(
        &mut self,
        images: &[SprImage],
        delays: &[f32],
    ) -> Result<(), SprError> {
        if images.len() != delays.len() {
            return Err(SprError::MismatchedGroup {
                images: images.len(),
                delays: delays.len(),
            });
        }

        if images.is_empty() {
            return Err(SprError::EmptyGroup);
        }

        images
            .iter()
            .try_for_each(|image| self.check_image(image))?;

        self.frames.push(SprFrame::Group(SprGroup {
            keys: cumulative_keys(delays),
            images: images.to_vec(),
        }));

        Ok(())
    }

    fn check_image(&self, image: &SprImage) -> Result<(), SprError> {
        let SprImage {
            width,
            height,
            raster,
            ..
        } = image;

        if *width < 0 || *height < 0 || (*width as usize * *height as usize) != raster.len() {
            return Err(SprError::RasterSize {
                width: *width,
                height: *height,
                have: raster.len(),
            });
        }

        let palette_len = self.palette.len();

        if let Some(index) = raster.iter().find(|index| **index as usize >= palette_len) {
            return Err(SprError::PaletteIndex {
                index: *index,
                palette_len,
            });
        }

        Ok(())
    }
}

/// Distance from the sprite origin to the canvas corner the engine treats as farthest.
///
/// Each axis picks its corner on its own by comparing the offset against half of the canvas.
pub fn bounding_radius(max_width: i32, max_height: i32, offset_x: i32, offset_y: i32) -> f32 {
    let (max_width, max_height) = (max_width as i64, max_height as i64);
    let (mut dx, mut dy) = (offset_x as i64, offset_y as i64);

    if -2 * dx < max_width {
        dx += max_width;
    }

    if 2 * dy < max_height {
        dy += max_height;
    }

    ((dx * dx + dy * dy) as f32).sqrt()
}

/// Running sum of `delays`.
///
/// Non-positive delays still move the key forward by the smallest step a float can take so
/// no two images share a display instant.
pub fn cumulative_keys(delays: &[f32]) -> Vec<f32> {
    delays
        .iter()
        .scan(0f32, |key, delay| {
            let next = if *delay > 0. { *key + delay } else { *key };

            *key = if next > *key { next } else { step_up(*key) };

            Some(*key)
        })
        .collect()
}

fn step_up(key: f32) -> f32 {
    if key <= 0. {
        f32::MIN_POSITIVE
    } else {
        f32::from_bits(key.to_bits() + 1)
    }
}
