//! Decoded GIF data, slurped up front.
use std::{
    fs,
    path::{Path, PathBuf},
};

use gif::{
    streaming_decoder::{Block, Decoded, OutputBuffer, StreamingDecoder},
    ColorOutput, DecodeOptions, DecodingError, DisposalMethod, Extension,
};

use crate::error::Gif2SprError;

use super::compositor::Disposal;

/// One frame as the decoder hands it out, in its own color indices.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    pub left: usize,
    pub top: usize,
    pub width: usize,
    pub height: usize,
    pub raster: Vec<u8>,
    /// Local color table.
    pub palette: Option<Vec<[u8; 3]>>,
    pub transparent: Option<u8>,
    /// `None` without a graphic control extension.
    pub disposal: Option<Disposal>,
    /// Hundredths of a second. `None` without a graphic control extension.
    pub delay: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct GifSource {
    pub path: PathBuf,
    pub width: usize,
    pub height: usize,
    pub global_palette: Option<Vec<[u8; 3]>>,
    /// Index into the global color table.
    pub background: Option<u8>,
    pub frames: Vec<DecodedFrame>,
}

fn to_colors(flat: &[u8]) -> Vec<[u8; 3]> {
    flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
}

impl From<DisposalMethod> for Disposal {
    fn from(value: DisposalMethod) -> Self {
        match value {
            DisposalMethod::Any => Disposal::Unspecified,
            DisposalMethod::Keep => Disposal::Keep,
            DisposalMethod::Background => Disposal::Background,
            DisposalMethod::Previous => Disposal::Previous,
        }
    }
}

/// Whether each image block has a graphic control extension in front of it, in frame order.
///
/// The frame decoder hands out defaults for frames without one, so this walks the block stream
/// on its own. Stops at the trailer or where the data runs out.
fn scan_control_extensions(bytes: &[u8]) -> Result<Vec<bool>, DecodingError> {
    let mut decoder = StreamingDecoder::new();
    let mut scratch = vec![0u8; 4096];
    let mut rest = bytes;
    let mut pending = false;
    let mut res = vec![];

    while !rest.is_empty() {
        let (consumed, decoded) = decoder.update(rest, &mut OutputBuffer::Slice(&mut scratch))?;
        rest = &rest[consumed..];

        match decoded {
            Decoded::BlockFinished(extension)
                if extension.into_known() == Some(Extension::Control) =>
            {
                pending = true
            }
            Decoded::FrameMetadata(_) => res.push(std::mem::take(&mut pending)),
            Decoded::BlockStart(Block::Trailer) => break,
            Decoded::Nothing if consumed == 0 => break,
            _ => (),
        }
    }

    Ok(res)
}

impl GifSource {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Gif2SprError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|op| Gif2SprError::io(path, "Failed to open file.", op))?;

        Self::decode(&bytes, path)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Gif2SprError> {
        Self::decode(bytes, Path::new("<memory>"))
    }

    fn decode(bytes: &[u8], path: &Path) -> Result<Self, Gif2SprError> {
        let decode_err = |source| Gif2SprError::SourceDecode {
            path: path.to_path_buf(),
            source,
        };
        let empty_err = |message: String| Gif2SprError::EmptySource {
            path: path.to_path_buf(),
            message,
        };

        // the frame decoder reports a GIF without image blocks as a truncated read
        let controls = scan_control_extensions(bytes).map_err(decode_err)?;

        if controls.is_empty() {
            return Err(empty_err("No frames.".to_string()));
        }

        let mut options = DecodeOptions::new();
        options.set_color_output(ColorOutput::Indexed);

        let mut decoder = options.read_info(bytes).map_err(decode_err)?;

        let width = decoder.width() as usize;
        let height = decoder.height() as usize;
        let global_palette = decoder.global_palette().map(to_colors);
        let background = decoder
            .bg_color()
            .and_then(|index| u8::try_from(index).ok());

        let mut frames = vec![];

        while let Some(frame) = decoder.read_next_frame().map_err(decode_err)? {
            let has_control = controls.get(frames.len()).copied().unwrap_or_default();

            frames.push(DecodedFrame {
                left: frame.left as usize,
                top: frame.top as usize,
                width: frame.width as usize,
                height: frame.height as usize,
                raster: frame.buffer.to_vec(),
                palette: frame.palette.as_deref().map(to_colors),
                transparent: frame.transparent,
                disposal: has_control.then(|| frame.dispose.into()),
                delay: has_control.then_some(frame.delay as i32),
            });
        }

        if width == 0 || height == 0 {
            return Err(empty_err(format!("Logical screen is {width}x{height}.")));
        }

        if frames.is_empty() {
            return Err(empty_err("No frames.".to_string()));
        }

        info!(
            "{}: {}x{}, {} frames, global color table: {}",
            path.display(),
            width,
            height,
            frames.len(),
            global_palette
                .as_ref()
                .map(|palette| palette.len().to_string())
                .unwrap_or_else(|| "none".to_string())
        );

        Ok(Self {
            path: path.to_path_buf(),
            width,
            height,
            global_palette,
            background,
            frames,
        })
    }

    /// First transparent index any frame declares.
    pub fn first_transparent(&self) -> Option<u8> {
        self.frames.iter().find_map(|frame| frame.transparent)
    }
}
