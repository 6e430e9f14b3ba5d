//! Converts animated GIFs into Quake and Half-Life sprites.
#[macro_use]
extern crate log;

pub mod config;
pub mod error;
pub mod modules;

pub use config::Gif2SprOptions;
pub use error::Gif2SprError;
pub use modules::gif2spr::{convert_gif_to_spr, Gif2SprBuilder};
