//! Unit tests mirroring the library's module tree, plus shared fixtures


use image::{Rgb, RgbImage};
use mosaictile::tile::codec::Tile;
use std::path::{Path, PathBuf};

/// Write a `width`x`height` image of one colour as PNG into `dir`
pub fn write_solid(dir: &Path, name: &str, size: (u32, u32), rgb: [u8; 3]) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(size.0, size.1, Rgb(rgb))
        .save(&path)
        .expect("Failed to write fixture image");
    path
}

/// In-memory tile of one colour
pub fn solid_tile(id: usize, size: u32, rgb: [u8; 3]) -> Tile {
    Tile::from_image(RgbImage::from_pixel(size, size, Rgb(rgb)))
        .expect("Failed to build fixture tile")
        .with_id(id)
        .with_name(format!("tile{id}.png"))
}
