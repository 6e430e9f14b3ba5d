//! Animated GIF to Quake / Half-Life sprite.
pub mod compositor;
pub mod cropper;
pub mod gif_source;
pub mod palette_mapping;
pub mod quantize;

use std::{
    fs::{self, File, OpenOptions},
    io::{BufWriter, Read},
    path::{Path, PathBuf},
};

use spr::{error::SprError, Alignment, Palette, Spr, SprImage, SyncType, TextureFormat};

use crate::{
    config::{FrameLayout, Gif2SprOptions, Origin, TargetFormat},
    error::Gif2SprError,
};

use self::{
    compositor::{Background, Canvas},
    cropper::Rect,
    gif_source::GifSource,
    palette_mapping::PaletteMapping,
};

/// Used when the decoder has no delay for a frame.
pub const DEFAULT_DELAY: f32 = 0.1;

/// Quake palette lumps are 256 raw RGB triplets.
pub const PALETTE_COLOR_COUNT: usize = 256;

pub struct Gif2SprBuilder {
    options: Gif2SprOptions,
}

impl Default for Gif2SprBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Gif2SprOptions> for Gif2SprBuilder {
    fn from(options: Gif2SprOptions) -> Self {
        Self { options }
    }
}

impl Gif2SprBuilder {
    pub fn new() -> Self {
        Self {
            options: Gif2SprOptions::default(),
        }
    }

    pub fn origin(&mut self, x: f64, y: f64) -> &mut Self {
        self.options.origin = Origin { x, y };
        self
    }

    pub fn alignment(&mut self, a: Alignment) -> &mut Self {
        self.options.alignment = a;
        self
    }

    pub fn format(&mut self, a: TargetFormat) -> &mut Self {
        self.options.format = a;
        self
    }

    pub fn blend(&mut self, a: TextureFormat) -> &mut Self {
        self.options.blend = a;
        self
    }

    pub fn tint(&mut self, a: [u8; 3]) -> &mut Self {
        self.options.tint = a;
        self
    }

    pub fn sync(&mut self, a: SyncType) -> &mut Self {
        self.options.sync = a;
        self
    }

    pub fn frames(&mut self, a: FrameLayout) -> &mut Self {
        self.options.frames = a;
        self
    }

    pub fn crop(&mut self, a: bool) -> &mut Self {
        self.options.crop = a;
        self
    }

    pub fn palette(&mut self, a: impl Into<PathBuf>) -> &mut Self {
        self.options.palette = Some(a.into());
        self
    }

    pub fn options(&self) -> &Gif2SprOptions {
        &self.options
    }

    /// Builds the sprite from an already decoded GIF.
    pub fn build_spr(&self, source: &GifSource) -> Result<Spr, Gif2SprError> {
        let options = &self.options;
        options.validate()?;

        let format = options.spr_format();

        let quake_palette = match (&options.format, &options.palette) {
            (TargetFormat::Quake, Some(path)) => Some(read_palette(path)?),
            _ => None,
        };

        let mut mapping = PaletteMapping::new(format, source, quake_palette, options.tint);

        // the background index only means something with a global table
        let background = source
            .global_palette
            .as_ref()
            .zip(source.background)
            .filter(|(table, index)| (*index as usize) < table.len())
            .map(|(_, index)| Background {
                source: index,
                target: mapping.lookup_for(None)[index as usize],
            });

        let mut canvas = Canvas::new(
            source.width,
            source.height,
            background,
            mapping.transparent(),
        );

        let mut images = Vec::with_capacity(source.frames.len());
        let mut delays = Vec::with_capacity(source.frames.len());

        for (index, frame) in source.frames.iter().enumerate() {
            let lookup = mapping.lookup_for(frame.palette.as_deref());
            let image =
                canvas.with_frame(frame, lookup, index == 0, |canvas| take_image(canvas, options.crop));

            debug!(
                "Frame {}: {}x{} at ({}, {})",
                index, image.width, image.height, image.offset_x, -image.offset_y
            );

            if image.raster.is_empty() {
                warn!("Frame {} is fully transparent.", index);
            }

            images.push(image);
            delays.push(
                frame
                    .delay
                    .map(|delay| delay as f32 / 100.)
                    .unwrap_or(DEFAULT_DELAY),
            );
        }

        let (offset_x, offset_y) = options.origin.offsets(source.width, source.height);
        let sprite_err = |op: SprError| Gif2SprError::sprite(&source.path, op);

        let mut spr = Spr::new(
            format,
            options.alignment,
            source.width as i32,
            source.height as i32,
            options.sync,
            mapping.into_palette(),
            offset_x,
            offset_y,
        )
        .map_err(sprite_err)?;

        match options.frames {
            FrameLayout::Group if images.len() > 1 => spr
                .append_group_frame(&images, &delays)
                .map_err(sprite_err)?,
            _ => images
                .iter()
                .try_for_each(|image| spr.append_single_frame(image))
                .map_err(sprite_err)?,
        }

        info!(
            "Sprite: version {}, {} frames, bounding radius {:.2}",
            spr.header.format.version(),
            spr.frame_count(),
            spr.header.bounding_radius
        );

        Ok(spr)
    }

    /// Reads `gif_path`, converts it and writes `spr_path`.
    ///
    /// Nothing usable is left at `spr_path` on failure.
    pub fn work(
        &self,
        gif_path: impl AsRef<Path>,
        spr_path: impl AsRef<Path>,
    ) -> Result<Spr, Gif2SprError> {
        let source = GifSource::from_file(gif_path.as_ref())?;
        let spr = self.build_spr(&source)?;

        write_spr(&spr, spr_path.as_ref())?;

        Ok(spr)
    }
}

/// Crops what is on the canvas right now into an image.
fn take_image(canvas: &Canvas, crop: bool) -> SprImage {
    let rect = if crop {
        canvas.minimal_rect()
    } else {
        Rect::full(canvas.width(), canvas.height())
    };

    SprImage::new(
        rect.left as i32,
        -(rect.top as i32),
        rect.width as i32,
        rect.height as i32,
        canvas.crop(&rect),
    )
}

/// Reads a raw palette lump. A short file is an error.
pub fn read_palette(path: impl AsRef<Path>) -> Result<Palette, Gif2SprError> {
    let path = path.as_ref();
    let mut file =
        File::open(path).map_err(|op| Gif2SprError::io(path, "Failed to open file.", op))?;

    let mut bytes = vec![0u8; PALETTE_COLOR_COUNT * 3];
    file.read_exact(&mut bytes)
        .map_err(|op| Gif2SprError::io(path, "Read failure.", op))?;

    Palette::from_raw_bytes(&bytes, PALETTE_COLOR_COUNT).map_err(|op| Gif2SprError::sprite(path, op))
}

pub fn write_spr(spr: &Spr, path: &Path) -> Result<(), Gif2SprError> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|op| Gif2SprError::io(path, "Failed to open file.", op))?;

    if let Err(err) = spr.write_to(BufWriter::new(file)) {
        // a partial sprite is worse than none
        let _ = fs::remove_file(path);

        return Err(match err {
            SprError::IOError { source } => Gif2SprError::io(path, "Write failure.", source),
            op => Gif2SprError::sprite(path, op),
        });
    }

    info!("Wrote {}", path.display());

    Ok(())
}

/// Converts one GIF file into one sprite file.
pub fn convert_gif_to_spr(
    gif_path: impl AsRef<Path>,
    spr_path: impl AsRef<Path>,
    options: Gif2SprOptions,
) -> Result<Spr, Gif2SprError> {
    Gif2SprBuilder::from(options).work(gif_path, spr_path)
}

#[cfg(test)]
mod test {
    use gif::DisposalMethod;
    use spr::{SprFormat, SprFrame, QUAKE_TRANSPARENT_INDEX};

    use super::{
        gif_source::test::{encode_gif, strip_gif, TestFrame},
        quantize::nearest_index,
        *,
    };

    const BLACK_WHITE: [u8; 6] = [0, 0, 0, 255, 255, 255];

    fn disposal_gif() -> Vec<u8> {
        let full = TestFrame::new((0, 0, 4, 4), vec![1; 16]);

        let mut patch = TestFrame::new((1, 1, 2, 2), vec![0; 4]);
        patch.dispose = DisposalMethod::Previous;

        let mut empty = TestFrame::new((0, 0, 4, 4), vec![2; 16]);
        empty.transparent = Some(2);

        encode_gif(4, 4, &[0, 0, 0, 255, 255, 255, 0, 255, 0], &[full, patch, empty])
    }

    #[test]
    fn quake_group() {
        let source = GifSource::from_bytes(&disposal_gif()).unwrap();
        let spr = Gif2SprBuilder::new().build_spr(&source).unwrap();

        assert_eq!(spr.header.format, SprFormat::Quake);
        assert_eq!(spr.header.max_width, 4);
        assert_eq!(spr.header.max_height, 4);
        assert_eq!((spr.offset_x, spr.offset_y), (-2, 2));
        assert_eq!(spr.frame_count(), 1);

        let SprFrame::Group(group) = &spr.frames[0] else {
            panic!("expected group frame");
        };

        assert_eq!(group.images.len(), 3);
        assert_eq!(group.keys, vec![0.1, 0.2, 0.3]);

        let white = group.images[0].raster[0];
        let black = group.images[1].raster[5];

        assert_ne!(white, black);
        assert_ne!(white, QUAKE_TRANSPARENT_INDEX);

        // the patch is gone again on the third frame
        assert_eq!(group.images[2], group.images[0]);
        assert!(group
            .images
            .iter()
            .all(|image| image.raster.len() == (image.width * image.height) as usize));
    }

    #[test]
    fn single_layout_and_crop() {
        // a background the frame calls transparent clears instead of filling
        let mut moving = TestFrame::new((2, 1, 1, 1), vec![1]);
        moving.dispose = DisposalMethod::Background;
        moving.transparent = Some(0);

        let bytes = encode_gif(
            4,
            3,
            &BLACK_WHITE,
            &[TestFrame::new((0, 0, 1, 1), vec![1]), moving],
        );
        let source = GifSource::from_bytes(&bytes).unwrap();

        let spr = Gif2SprBuilder::new()
            .frames(FrameLayout::Single)
            .origin(0., 1.)
            .build_spr(&source)
            .unwrap();

        assert_eq!(spr.frame_count(), 2);

        let first = &spr.frames[0].images()[0];
        assert_eq!((first.offset_x, first.offset_y, first.width, first.height), (0, 0, 1, 1));

        let second = &spr.frames[1].images()[0];
        assert_eq!((second.offset_x, second.offset_y), (2, -1));
        assert_eq!((second.width, second.height), (1, 1));
    }

    #[test]
    fn background_disposal_fills_with_background_color() {
        let mut frame = TestFrame::new((1, 0, 1, 1), vec![1]);
        frame.dispose = DisposalMethod::Background;

        // the encoder always writes background index 0, black here
        let bytes = encode_gif(3, 1, &BLACK_WHITE, &[frame]);
        let source = GifSource::from_bytes(&bytes).unwrap();
        assert_eq!(source.background, Some(0));

        let spr = Gif2SprBuilder::new().crop(false).build_spr(&source).unwrap();
        let image = &spr.frames[0].images()[0];
        let black = nearest_index(Palette::quake().get_bytes(), [0, 0, 0], Some(255));
        let white = nearest_index(Palette::quake().get_bytes(), [255, 255, 255], Some(255));

        assert_eq!(image.raster, vec![black, white, black]);
        assert_ne!(black, QUAKE_TRANSPARENT_INDEX);

        // filled background is picture, not a cleared spot
        let cropped = Gif2SprBuilder::new().build_spr(&source).unwrap();
        assert_eq!(cropped.frames[0].images()[0].width, 3);
    }

    #[test]
    fn half_life_keeps_pixels_matching_fallback_index() {
        // no transparency declared, so the background index 0 becomes the transparent index
        let bytes = encode_gif(3, 1, &BLACK_WHITE, &[TestFrame::new((0, 0, 3, 1), vec![0, 1, 0])]);
        let source = GifSource::from_bytes(&bytes).unwrap();

        let spr = Gif2SprBuilder::new()
            .format(TargetFormat::HalfLife)
            .blend(TextureFormat::Normal)
            .build_spr(&source)
            .unwrap();

        let image = &spr.frames[0].images()[0];
        assert_eq!((image.offset_x, image.offset_y), (0, 0));
        assert_eq!((image.width, image.height), (3, 1));
        assert_eq!(image.raster, vec![0, 1, 0]);
    }

    #[test]
    fn missing_control_extensions_use_defaults() {
        let mut first = TestFrame::new((0, 0, 2, 2), vec![1; 4]);
        first.delay = 50;
        let mut second = TestFrame::new((1, 1, 1, 1), vec![1]);
        second.delay = 50;

        let bytes = strip_gif(&encode_gif(2, 2, &BLACK_WHITE, &[first, second]), false, true);
        let source = GifSource::from_bytes(&bytes).unwrap();
        let spr = Gif2SprBuilder::new().build_spr(&source).unwrap();

        let SprFrame::Group(group) = &spr.frames[0] else {
            panic!("expected group frame");
        };

        assert_eq!(group.keys, vec![DEFAULT_DELAY, DEFAULT_DELAY * 2.]);

        // no disposal given, so the first frame is gone before the second is drawn
        let second = &group.images[1];
        assert_eq!((second.offset_x, second.offset_y), (1, -1));
        assert_eq!((second.width, second.height), (1, 1));
    }

    #[test]
    fn quake_local_color_tables() {
        let mut red = TestFrame::new((0, 0, 2, 1), vec![0, 1]);
        red.palette = Some(vec![255, 0, 0, 0, 0, 0]);
        let mut blue = TestFrame::new((0, 0, 2, 1), vec![0, 1]);
        blue.palette = Some(vec![0, 0, 255, 0, 0, 0]);

        let bytes = strip_gif(&encode_gif(2, 1, &[], &[red, blue]), true, false);
        let source = GifSource::from_bytes(&bytes).unwrap();
        assert_eq!(source.global_palette, None);

        let spr = Gif2SprBuilder::new()
            .frames(FrameLayout::Single)
            .crop(false)
            .build_spr(&source)
            .unwrap();

        let quake = Palette::quake();
        let nearest = |color| nearest_index(quake.get_bytes(), color, Some(255));

        assert_eq!(spr.frame_count(), 2);
        assert_eq!(
            spr.frames[0].images()[0].raster,
            vec![nearest([255, 0, 0]), nearest([0, 0, 0])]
        );
        assert_eq!(
            spr.frames[1].images()[0].raster,
            vec![nearest([0, 0, 255]), nearest([0, 0, 0])]
        );
    }

    #[test]
    fn half_life_alpha_test() {
        let mut frame = TestFrame::new((0, 0, 2, 1), vec![0, 1]);
        frame.transparent = Some(0);

        let bytes = encode_gif(2, 1, &BLACK_WHITE, &[frame]);
        let source = GifSource::from_bytes(&bytes).unwrap();

        let spr = Gif2SprBuilder::new()
            .format(TargetFormat::HalfLife)
            .blend(TextureFormat::AlphaTest)
            .crop(false)
            .build_spr(&source)
            .unwrap();

        assert_eq!(
            spr.header.format,
            SprFormat::HalfLife {
                texture_format: TextureFormat::AlphaTest
            }
        );
        assert_eq!(spr.palette.len(), 256);
        assert_eq!(spr.palette.get_bytes()[1], [255, 255, 255]);
        assert_eq!(spr.palette.get_bytes()[255], [0, 0, 255]);
        assert_eq!(spr.frames[0].images()[0].raster, vec![255, 1]);
    }

    #[test]
    fn no_crop_keeps_canvas() {
        let bytes = encode_gif(3, 2, &BLACK_WHITE, &[TestFrame::new((1, 1, 1, 1), vec![1])]);
        let source = GifSource::from_bytes(&bytes).unwrap();

        let spr = Gif2SprBuilder::new().crop(false).build_spr(&source).unwrap();
        let SprFrame::Single(image) = &spr.frames[0] else {
            panic!("one gif frame is a single frame");
        };

        assert_eq!((image.width, image.height), (3, 2));
        assert_eq!(image.raster[0], QUAKE_TRANSPARENT_INDEX);
        assert_ne!(image.raster[4], QUAKE_TRANSPARENT_INDEX);
    }

    #[test]
    fn all_transparent_frame_is_empty_image() {
        let mut frame = TestFrame::new((0, 0, 2, 2), vec![0; 4]);
        frame.transparent = Some(0);

        let bytes = encode_gif(2, 2, &BLACK_WHITE, &[frame]);
        let source = GifSource::from_bytes(&bytes).unwrap();
        let spr = Gif2SprBuilder::new().build_spr(&source).unwrap();

        let image = &spr.frames[0].images()[0];
        assert_eq!((image.width, image.height), (0, 0));
        assert!(image.raster.is_empty());
    }

    #[test]
    fn half_life_native_palette() {
        let bytes = encode_gif(
            2,
            1,
            &[0, 0, 0, 10, 20, 30, 255, 255, 255, 0, 255, 0],
            &[TestFrame::new((0, 0, 2, 1), vec![1, 2])],
        );
        let source = GifSource::from_bytes(&bytes).unwrap();

        let spr = Gif2SprBuilder::new()
            .format(TargetFormat::HalfLife)
            .blend(TextureFormat::Additive)
            .build_spr(&source)
            .unwrap();

        assert_eq!(spr.palette.len(), 4);
        assert_eq!(spr.palette.get_bytes()[1], [10, 20, 30]);
        assert_eq!(spr.frames[0].images()[0].raster, vec![1, 2]);
    }

    #[test]
    fn half_life_index_alpha() {
        let bytes = encode_gif(
            2,
            1,
            &BLACK_WHITE,
            &[TestFrame::new((0, 0, 2, 1), vec![1, 1])],
        );
        let source = GifSource::from_bytes(&bytes).unwrap();

        let spr = Gif2SprBuilder::new()
            .format(TargetFormat::HalfLife)
            .blend(TextureFormat::IndexAlpha)
            .tint([255, 0, 0])
            .build_spr(&source)
            .unwrap();

        assert_eq!(spr.palette.len(), 256);
        assert_eq!(spr.palette.get_bytes()[255], [255, 0, 0]);
        assert_eq!(spr.frames[0].images()[0].raster, vec![255, 255]);
    }

    #[test]
    fn quake_rejects_blend() {
        let bytes = encode_gif(1, 1, &BLACK_WHITE, &[TestFrame::new((0, 0, 1, 1), vec![1])]);
        let source = GifSource::from_bytes(&bytes).unwrap();

        let res = Gif2SprBuilder::new()
            .blend(TextureFormat::AlphaTest)
            .build_spr(&source);

        assert!(res.unwrap_err().is_configuration());
    }

    #[test]
    fn external_palette() {
        let dir = tempfile::tempdir().unwrap();
        let palette_path = dir.path().join("palette.lmp");

        // everything red except one white slot
        let mut palette = [255u8, 0, 0].repeat(256);
        palette[3 * 9..3 * 10].copy_from_slice(&[255, 255, 255]);
        fs::write(&palette_path, &palette).unwrap();

        let bytes = encode_gif(1, 1, &BLACK_WHITE, &[TestFrame::new((0, 0, 1, 1), vec![1])]);
        let source = GifSource::from_bytes(&bytes).unwrap();

        let spr = Gif2SprBuilder::new()
            .palette(&palette_path)
            .build_spr(&source)
            .unwrap();

        assert_eq!(spr.frames[0].images()[0].raster, vec![9]);
    }

    #[test]
    fn short_palette_file() {
        let dir = tempfile::tempdir().unwrap();
        let palette_path = dir.path().join("palette.lmp");
        fs::write(&palette_path, [0u8; 767]).unwrap();

        assert!(matches!(
            read_palette(&palette_path),
            Err(Gif2SprError::IOError { .. })
        ));
    }

    #[test]
    fn work_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let gif_path = dir.path().join("in.gif");
        let spr_path = dir.path().join("out.spr");

        fs::write(&gif_path, disposal_gif()).unwrap();

        let spr = convert_gif_to_spr(&gif_path, &spr_path, Gif2SprOptions::default()).unwrap();
        let parsed = Spr::open_from_file(&spr_path).unwrap();

        assert_eq!(parsed.header, spr.header);
        assert_eq!(parsed.frame_count(), 1);
    }

    #[test]
    fn missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let spr_path = dir.path().join("out.spr");

        let res = convert_gif_to_spr(dir.path().join("nope.gif"), &spr_path, Gif2SprOptions::default());

        assert!(matches!(res, Err(Gif2SprError::IOError { .. })));
        assert!(!spr_path.exists());
    }
}
