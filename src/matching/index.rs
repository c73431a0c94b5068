//! Sparse colour index for the bucketed strategy
//!
//! Tiles are grouped by exact average colour under nested ordered maps
//! (red, then green, then blue). Only occupied colours have entries; a bucket
//! emptied by removal is deleted together with any axis map it leaves empty.
//!
//! Lookup walks the three axes. On each axis the query channel is used as-is
//! when that coordinate is occupied; otherwise it is rescaled linearly onto
//! the occupied coordinates of that axis, `round(c / 255 * (len - 1))`. No
//! distances are computed, so a miss lands on an arbitrary nearby bucket
//! rather than the nearest colour.

use crate::io::configuration::COLOR_AXIS_SIZE;
use crate::tile::codec::{Color, Tile};
use std::collections::{BTreeMap, VecDeque};

type Bucket = VecDeque<Tile>;
type BlueAxis = BTreeMap<u8, Bucket>;
type GreenAxis = BTreeMap<u8, BlueAxis>;

/// Tiles grouped by exact average colour
#[derive(Debug, Default)]
pub struct ColorIndex {
    red_axis: BTreeMap<u8, GreenAxis>,
    len: usize,
}

impl ColorIndex {
    /// Index `tiles`, keeping their order within each bucket
    pub fn build(tiles: impl IntoIterator<Item = Tile>) -> Self {
        let mut index = Self::default();
        for tile in tiles {
            let Color { r, g, b } = tile.color();
            index
                .red_axis
                .entry(r)
                .or_default()
                .entry(g)
                .or_default()
                .entry(b)
                .or_default()
                .push_back(tile);
            index.len += 1;
        }
        index
    }

    /// Tiles remaining in the index
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether every tile has been taken
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct occupied colours
    pub fn occupied_colors(&self) -> usize {
        self.red_axis
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeMap::len)
            .sum()
    }

    /// Bucket colour a query resolves to
    pub fn locate(&self, query: Color) -> Option<Color> {
        let r = select_key(&self.red_axis, query.r)?;
        let green_axis = self.red_axis.get(&r)?;
        let g = select_key(green_axis, query.g)?;
        let blue_axis = green_axis.get(&g)?;
        let b = select_key(blue_axis, query.b)?;
        Some(Color::new(r, g, b))
    }

    /// First tile of the bucket the query resolves to
    pub fn peek(&self, query: Color) -> Option<&Tile> {
        let Color { r, g, b } = self.locate(query)?;
        self.red_axis.get(&r)?.get(&g)?.get(&b)?.front()
    }

    /// Remove and return the first tile of the bucket the query resolves to
    pub fn take(&mut self, query: Color) -> Option<Tile> {
        let Color { r, g, b } = self.locate(query)?;

        let green_axis = self.red_axis.get_mut(&r)?;
        let blue_axis = green_axis.get_mut(&g)?;
        let bucket = blue_axis.get_mut(&b)?;
        let tile = bucket.pop_front()?;

        if bucket.is_empty() {
            blue_axis.remove(&b);
            if blue_axis.is_empty() {
                green_axis.remove(&g);
                if green_axis.is_empty() {
                    self.red_axis.remove(&r);
                }
            }
        }

        self.len -= 1;
        Some(tile)
    }
}

/// Map a channel value onto one of `axis_len` occupied coordinates
pub fn rescale(channel: u8, axis_len: usize) -> usize {
    let span = axis_len.clamp(1, COLOR_AXIS_SIZE) - 1;
    (f64::from(channel) / 255.0 * span as f64 + 0.5) as usize
}

fn select_key<V>(axis: &BTreeMap<u8, V>, channel: u8) -> Option<u8> {
    if axis.contains_key(&channel) {
        return Some(channel);
    }
    axis.keys().nth(rescale(channel, axis.len())).copied()
}
