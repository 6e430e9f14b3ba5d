#[derive(Debug, thiserror::Error)]
pub enum SprError {
    #[error("Error parsing sprite: {source}")]
    NomError {
        #[source]
        source: nom::Err<nom::error::Error<Vec<u8>>>,
    },
    #[error("Error opening sprite: {source}")]
    IOError {
        #[source]
        source: std::io::Error,
    },
    #[error("Unknown {kind}: \"{name}\"")]
    UnknownName { kind: &'static str, name: String },
    #[error("Unknown {kind} value: {value}")]
    UnknownValue { kind: &'static str, value: i32 },
    #[error("Palette too short. Expect ({expect}) bytes. Have ({have})")]
    ShortPalette { expect: usize, have: usize },
    #[error("Quake sprites need exactly 256 palette colors. Have ({have})")]
    QuakePaletteSize { have: usize },
    #[error("Palette must have 1 to 256 colors. Have ({have})")]
    PaletteSize { have: usize },
    #[error("Image raster has ({have}) pixels but is {width}x{height}")]
    RasterSize { width: i32, height: i32, have: usize },
    #[error("Palette index {index} is out of range for a palette of {palette_len} colors")]
    PaletteIndex { index: u8, palette_len: usize },
    #[error("Mismatched group. Images ({images}). Delays ({delays})")]
    MismatchedGroup { images: usize, delays: usize },
    #[error("Group frame must have at least one image")]
    EmptyGroup,
}
