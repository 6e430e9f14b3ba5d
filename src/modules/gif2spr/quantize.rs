//! Nearest color and brightness lookups.
//!
//! Both share one set of luma weights (0.30, 0.59, 0.11) kept as integer percentages so the
//! results are the same on every machine.

/// Red, green, blue weights in percent.
pub const LUMA_WEIGHTS: [u32; 3] = [30, 59, 11];

const MAX_WEIGHTED_SUM: u32 = 255 * (LUMA_WEIGHTS[0] + LUMA_WEIGHTS[1] + LUMA_WEIGHTS[2]);

pub fn color_distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b.iter())
        .zip(LUMA_WEIGHTS.iter())
        .map(|((a, b), weight)| {
            let delta = (*a as i32 - *b as i32).unsigned_abs() * weight;
            delta * delta
        })
        .sum()
}

/// Index of the palette color closest to `color`.
///
/// `reserved` is never returned. Ties go to the lowest index.
pub fn nearest_index(palette: &[[u8; 3]], color: [u8; 3], reserved: Option<u8>) -> u8 {
    palette
        .iter()
        .enumerate()
        .take(256)
        .filter(|(index, _)| reserved != Some(*index as u8))
        // min_by_key keeps the first of equal keys
        .min_by_key(|(_, candidate)| color_distance(**candidate, color))
        .map(|(index, _)| index as u8)
        .unwrap_or_default()
}

/// Weighted intensity of `color` from 0 to 255, rounded toward zero.
pub fn brightness(color: [u8; 3]) -> u8 {
    let sum: u32 = color
        .iter()
        .zip(LUMA_WEIGHTS.iter())
        .map(|(channel, weight)| *channel as u32 * weight)
        .sum();

    (sum * 255 / MAX_WEIGHTED_SUM) as u8
}
