//! Target palette of a run and the GIF color table to target index lookups.
use std::collections::HashMap;

use spr::{Palette, SprFormat, TextureFormat, QUAKE_TRANSPARENT_INDEX};

use super::{
    gif_source::GifSource,
    quantize::{brightness, nearest_index},
};

#[derive(Debug, Clone)]
enum MappingMode {
    /// Every color goes to its nearest palette entry.
    Nearest { reserved: Option<u8> },
    /// The palette is built from `base`, so `base` maps to itself.
    Native {
        base: Vec<[u8; 3]>,
        reserved: Option<u8>,
    },
    /// The index is the color's brightness.
    Brightness,
}

#[derive(Debug, Clone)]
pub struct PaletteMapping {
    palette: Palette,
    transparent: u8,
    mode: MappingMode,
    global_lookup: Vec<u8>,
    local_lookups: HashMap<Vec<[u8; 3]>, Vec<u8>>,
}

impl PaletteMapping {
    /// `quake_palette` replaces the built-in palette of Quake sprites.
    pub fn new(
        format: SprFormat,
        source: &GifSource,
        quake_palette: Option<Palette>,
        tint: [u8; 3],
    ) -> Self {
        // every frame has a local table when there is no global one
        let base = source
            .global_palette
            .clone()
            .or_else(|| source.frames.iter().find_map(|frame| frame.palette.clone()))
            .unwrap_or_default();

        let (palette, transparent, mode) = match format {
            SprFormat::Quake => (
                quake_palette.unwrap_or_else(Palette::quake),
                QUAKE_TRANSPARENT_INDEX,
                MappingMode::Nearest {
                    reserved: Some(QUAKE_TRANSPARENT_INDEX),
                },
            ),
            SprFormat::HalfLife {
                texture_format: TextureFormat::IndexAlpha,
            } => (
                Palette::index_alpha_ramp(tint),
                0,
                MappingMode::Brightness,
            ),
            SprFormat::HalfLife {
                texture_format: TextureFormat::AlphaTest,
            } => (
                Palette::new(base.clone()).with_alpha_test_slot(),
                QUAKE_TRANSPARENT_INDEX,
                MappingMode::Native {
                    base,
                    reserved: Some(QUAKE_TRANSPARENT_INDEX),
                },
            ),
            SprFormat::HalfLife { .. } => {
                let base = base.into_iter().take(256).collect::<Vec<_>>();
                let in_palette = |index: &u8| (*index as usize) < base.len();
                let transparent = source
                    .first_transparent()
                    .filter(in_palette)
                    .or(source.background.filter(in_palette))
                    .unwrap_or_default();

                (
                    Palette::new(base.clone()),
                    transparent,
                    MappingMode::Native {
                        base,
                        reserved: None,
                    },
                )
            }
        };

        info!(
            "Palette: {} colors, transparent index {}, {}",
            palette.len(),
            transparent,
            match mode {
                MappingMode::Nearest { .. } => "nearest color",
                MappingMode::Native { .. } => "GIF color table",
                MappingMode::Brightness => "brightness",
            }
        );

        let global_lookup = build_lookup(
            source.global_palette.as_deref().unwrap_or_default(),
            &palette,
            transparent,
            &mode,
        );

        Self {
            palette,
            transparent,
            mode,
            global_lookup,
            local_lookups: HashMap::new(),
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn into_palette(self) -> Palette {
        self.palette
    }

    pub fn transparent(&self) -> u8 {
        self.transparent
    }

    /// 256 entry lookup for a frame, from its local color table if it has one.
    pub fn lookup_for(&mut self, local_palette: Option<&[[u8; 3]]>) -> &[u8] {
        let Self {
            palette,
            transparent,
            mode,
            global_lookup,
            local_lookups,
        } = self;

        match local_palette {
            None => global_lookup,
            Some(table) => local_lookups
                .entry(table.to_vec())
                .or_insert_with(|| build_lookup(table, palette, *transparent, mode)),
        }
    }
}

/// Indices past the end of `table` map to `transparent`.
fn build_lookup(
    table: &[[u8; 3]],
    palette: &Palette,
    transparent: u8,
    mode: &MappingMode,
) -> Vec<u8> {
    let mut lookup = vec![transparent; 256];
    let colors = palette.get_bytes();

    lookup
        .iter_mut()
        .zip(table.iter())
        .enumerate()
        .for_each(|(index, (target, color))| {
            *target = match mode {
                MappingMode::Nearest { reserved } => nearest_index(colors, *color, *reserved),
                MappingMode::Brightness => brightness(*color),
                MappingMode::Native { base, reserved }
                    if base.as_slice() == table && *reserved != Some(index as u8) =>
                {
                    index as u8
                }
                MappingMode::Native { reserved, .. } => nearest_index(colors, *color, *reserved),
            };
        });

    lookup
}
