//! Colour distance strategies and the linear nearest-colour scan

use crate::tile::codec::{Color, Tile};

/// How a query colour is matched against the corpus
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum MatchStrategy {
    /// Bucketed lookup by quantised colour; fastest, approximate, no distance search
    ColorSpace,
    /// Linear scan minimising squared Euclidean RGB distance
    #[default]
    Euclidean,
    /// Linear scan with redness-weighted channel distances
    EuclideanOptimized,
}

impl MatchStrategy {
    /// Name accepted on the command line
    pub const fn name(self) -> &'static str {
        match self {
            Self::ColorSpace => "color-space",
            Self::Euclidean => "euclidean",
            Self::EuclideanOptimized => "euclidean-optimized",
        }
    }

    /// Whether the strategy scans every remaining tile
    pub const fn is_linear(self) -> bool {
        !matches!(self, Self::ColorSpace)
    }

    /// Distance the strategy minimises; the bucketed strategy is reported in Euclidean terms
    pub fn distance(self, query: Color, candidate: Color) -> f64 {
        match self {
            Self::ColorSpace | Self::Euclidean => f64::from(euclidean_distance(query, candidate)),
            Self::EuclideanOptimized => weighted_distance(query, candidate),
        }
    }
}

/// Squared Euclidean distance `Δr² + Δg² + Δb²`
pub const fn euclidean_distance(a: Color, b: Color) -> u32 {
    let dr = a.r.abs_diff(b.r) as u32;
    let dg = a.g.abs_diff(b.g) as u32;
    let db = a.b.abs_diff(b.b) as u32;
    dr * dr + dg * dg + db * db
}

/// Redness-weighted squared distance
///
/// With `r̄ = (r1 + r2) / 2`:
/// `(2 + r̄/256)·Δr² + 4·Δg² + (2 + (255 − r̄)/256)·Δb²`
pub fn weighted_distance(a: Color, b: Color) -> f64 {
    let r_avg = (f64::from(a.r) + f64::from(b.r)) / 2.0;
    let dr = f64::from(a.r) - f64::from(b.r);
    let dg = f64::from(a.g) - f64::from(b.g);
    let db = f64::from(a.b) - f64::from(b.b);

    (2.0 + r_avg / 256.0) * dr * dr + 4.0 * dg * dg + (2.0 + (255.0 - r_avg) / 256.0) * db * db
}

/// Position of the tile with the smallest distance; ties go to the earliest tile
pub fn nearest_index<D, F>(tiles: &[Tile], distance: F) -> Option<usize>
where
    D: PartialOrd,
    F: Fn(Color) -> D,
{
    let mut best: Option<(usize, D)> = None;

    for (index, tile) in tiles.iter().enumerate() {
        let candidate = distance(tile.color());
        let improves = best
            .as_ref()
            .is_none_or(|(_, best_distance)| candidate < *best_distance);
        if improves {
            best = Some((index, candidate));
        }
    }

    best.map(|(index, _)| index)
}
