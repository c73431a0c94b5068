//! Tile decoding, resizing and colour reduction

/// Fixed-filter resizing and average colour computation
pub mod codec;

pub use codec::{Color, Tile, TileSource, make_tile};
