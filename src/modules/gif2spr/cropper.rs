#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: usize,
    pub top: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            left: 0,
            top: 0,
            width,
            height,
        }
    }

    /// Smallest rectangle holding every opaque pixel of a row-major mask.
    ///
    /// Columns are swept in from the left and the right first, then rows from the top and the
    /// bottom, only looking inside the columns already found. Every sweep stops at its first hit.
    /// A fully transparent canvas gives an empty rectangle at the corner.
    pub fn minimal(opaque: &[bool], width: usize, height: usize) -> Self {
        let column_is_empty = |x: usize| (0..height).all(|y| !opaque[x + y * width]);

        let Some(left) = (0..width).find(|x| !column_is_empty(*x)) else {
            return Self::default();
        };

        // a hit exists, so this sweep stops at or after `left`
        let right = (left..width)
            .rev()
            .find(|x| !column_is_empty(*x))
            .unwrap_or(left);

        let row_is_empty =
            |y: usize| opaque[left + y * width..=right + y * width].iter().all(|p| !*p);

        let top = (0..height).find(|y| !row_is_empty(*y)).unwrap_or_default();
        let bottom = (top..height)
            .rev()
            .find(|y| !row_is_empty(*y))
            .unwrap_or(top);

        Self {
            left,
            top,
            width: right - left + 1,
            height: bottom - top + 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn mask(pixels: &[u8]) -> Vec<bool> {
        pixels.iter().map(|pixel| *pixel != 0).collect()
    }

    #[test]
    fn all_transparent() {
        let rect = Rect::minimal(&[false; 12], 4, 3);

        assert_eq!(rect.width, 0);
        assert_eq!(rect.height, 0);
        assert_eq!((rect.left, rect.top), (0, 0));
        assert!(rect.is_empty());
    }

    #[test]
    fn empty_canvas() {
        assert!(Rect::minimal(&[], 0, 0).is_empty());
    }

    #[test]
    fn single_pixel() {
        #[rustfmt::skip]
        let pixels = mask(&[
            0, 0, 0, 0,
            0, 0, 1, 0,
            0, 0, 0, 0,
        ]);

        assert_eq!(
            Rect::minimal(&pixels, 4, 3),
            Rect {
                left: 2,
                top: 1,
                width: 1,
                height: 1
            }
        );
    }

    #[test]
    fn spread_pixels() {
        #[rustfmt::skip]
        let pixels = mask(&[
            0, 0, 0, 0, 0,
            0, 1, 0, 0, 0,
            0, 0, 0, 0, 0,
            0, 0, 0, 1, 0,
        ]);

        assert_eq!(
            Rect::minimal(&pixels, 5, 4),
            Rect {
                left: 1,
                top: 1,
                width: 3,
                height: 3
            }
        );
    }

    #[test]
    fn opaque_canvas_is_full() {
        assert_eq!(Rect::minimal(&[true; 6], 3, 2), Rect::full(3, 2));
    }
}
