//! Rebuilds full canvas state from GIF frame deltas.
//!
//! The canvas holds target palette indices. Source indices are translated through a lookup
//! table while blitting, so every consumer downstream only sees final indices.

use super::{cropper::Rect, gif_source::DecodedFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposal {
    /// Decoder said nothing, or said "no disposal specified".
    #[default]
    Unspecified,
    Keep,
    Background,
    Previous,
}

/// GIF background color as a global table index and the target index it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background {
    pub source: u8,
    pub target: u8,
}

#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    /// Pixels holding a color rather than a cleared spot.
    opaque: Vec<bool>,
    /// Canvas state before the current frame, only filled for [`Disposal::Previous`].
    snapshot: (Vec<u8>, Vec<bool>),
    restore_pending: bool,
    background: Option<Background>,
    transparent: u8,
}

impl Canvas {
    /// `transparent` is the index cleared spots hold. The cropper trims cleared spots, whatever
    /// their index.
    pub fn new(width: usize, height: usize, background: Option<Background>, transparent: u8) -> Self {
        Self {
            width,
            height,
            pixels: vec![transparent; width * height],
            opaque: vec![false; width * height],
            snapshot: (vec![transparent; width * height], vec![false; width * height]),
            restore_pending: false,
            background,
            transparent,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn opaque(&self) -> &[bool] {
        &self.opaque
    }

    pub fn transparent(&self) -> u8 {
        self.transparent
    }

    fn clear(&mut self) {
        self.pixels.fill(self.transparent);
        self.opaque.fill(false);
    }

    /// Draws `frame` onto the canvas.
    ///
    /// `lookup` translates the frame's own color indices (global or local table) into target
    /// indices and must have 256 entries. Call [`Canvas::end_frame`] once the picture has been
    /// taken.
    pub fn composite_frame(&mut self, frame: &DecodedFrame, lookup: &[u8], is_first: bool) {
        let disposal = frame.disposal.unwrap_or_default();

        // a background the frame itself calls transparent is no color at all
        let background = self
            .background
            .filter(|background| frame.transparent != Some(background.source))
            .map(|background| background.target);

        match disposal {
            Disposal::Background => match background {
                Some(target) => {
                    self.pixels.fill(target);
                    self.opaque.fill(true);
                }
                None => self.clear(),
            },
            Disposal::Unspecified => self.clear(),
            _ if is_first => self.clear(),
            _ => (),
        }

        if disposal == Disposal::Previous {
            self.snapshot.0.copy_from_slice(&self.pixels);
            self.snapshot.1.copy_from_slice(&self.opaque);
            self.restore_pending = true;
        }

        let frame_width = frame.width;

        for (row_index, row) in frame.raster.chunks(frame_width.max(1)).enumerate() {
            let y = frame.top + row_index;

            if y >= self.height || row_index >= frame.height {
                break;
            }

            for (column, source) in row.iter().enumerate() {
                let x = frame.left + column;

                if x >= self.width {
                    break;
                }

                let index = x + y * self.width;

                if frame.transparent == Some(*source) {
                    if disposal == Disposal::Background {
                        self.pixels[index] = background.unwrap_or(self.transparent);
                        self.opaque[index] = background.is_some();
                    }

                    continue;
                }

                self.pixels[index] = lookup[*source as usize];
                self.opaque[index] = true;
            }
        }
    }

    /// Undoes the last frame if it asked to restore to previous.
    pub fn end_frame(&mut self) {
        if self.restore_pending {
            self.pixels.copy_from_slice(&self.snapshot.0);
            self.opaque.copy_from_slice(&self.snapshot.1);
            self.restore_pending = false;
        }
    }

    /// Composites `frame`, lets `f` look at the result, then applies end of frame disposal.
    pub fn with_frame<T>(
        &mut self,
        frame: &DecodedFrame,
        lookup: &[u8],
        is_first: bool,
        f: impl FnOnce(&Canvas) -> T,
    ) -> T {
        self.composite_frame(frame, lookup, is_first);
        let res = f(self);
        self.end_frame();

        res
    }

    pub fn minimal_rect(&self) -> Rect {
        Rect::minimal(&self.opaque, self.width, self.height)
    }

    /// Copies the pixels inside `rect` out of the canvas.
    pub fn crop(&self, rect: &Rect) -> Vec<u8> {
        (rect.top..rect.top + rect.height)
            .flat_map(|y| {
                let start = rect.left + y * self.width;
                self.pixels[start..start + rect.width].iter().copied()
            })
            .collect()
    }
}
