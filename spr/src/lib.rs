//! Quake and Half-Life sprite (`.spr`) object model, writer and parser.
pub mod builder;
pub mod error;
pub mod palette;
mod parser;
mod types;
mod utils;
mod writer;

pub use types::*;
