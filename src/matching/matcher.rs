//! Nearest-colour tile selection with optional consume-once semantics

use crate::corpus::builder::Corpus;
use crate::io::error::{MosaicError, Result};
use crate::matching::index::ColorIndex;
use crate::matching::strategy::{MatchStrategy, euclidean_distance, nearest_index, weighted_distance};
use crate::tile::codec::{Color, Tile, TileSource, make_tile};
use image::DynamicImage;
use std::borrow::Cow;

/// Selects tiles for query colours from one corpus
///
/// Queries take `&mut self`: removal in non-repeat mode mutates the working
/// set, so a matcher serves one caller at a time. Parallel assembly needs one
/// matcher per disjoint partition of the corpus.
#[derive(Debug)]
pub struct ColorMatcher {
    strategy: MatchStrategy,
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    index: Option<ColorIndex>,
}

impl ColorMatcher {
    /// Matcher over every tile of `corpus`
    pub fn new(corpus: Corpus, strategy: MatchStrategy) -> Self {
        let (width, height) = (corpus.width(), corpus.height());
        Self {
            strategy,
            width,
            height,
            tiles: corpus.into_tiles(),
            index: None,
        }
    }

    /// Active strategy
    pub const fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    /// Resolution of the tiles being matched
    pub const fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Tiles still available
    pub fn len(&self) -> usize {
        self.index.as_ref().map_or(self.tiles.len(), ColorIndex::len)
    }

    /// Whether every tile has been consumed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tile best matching `query` under the active strategy
    ///
    /// With `repeat` the tile stays available and is borrowed; without it the
    /// tile is removed and handed over.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCorpus` if no tiles remain
    pub fn find_closest(&mut self, query: Color, repeat: bool) -> Result<Cow<'_, Tile>> {
        match self.strategy {
            MatchStrategy::ColorSpace => self.find_in_color_space(query, repeat),
            MatchStrategy::Euclidean => {
                self.find_linear(repeat, |color| euclidean_distance(query, color))
            }
            MatchStrategy::EuclideanOptimized => {
                self.find_linear(repeat, |color| weighted_distance(query, color))
            }
        }
    }

    /// Reduce `region` to its average colour at tile resolution, then match it
    ///
    /// # Errors
    ///
    /// Returns an error if the region is empty or no tiles remain
    pub fn find_closest_region(
        &mut self,
        region: &DynamicImage,
        repeat: bool,
    ) -> Result<Cow<'_, Tile>> {
        let query = self.query_color(region)?;
        self.find_closest(query, repeat)
    }

    /// Average colour of `region` measured the same way as corpus tiles
    ///
    /// # Errors
    ///
    /// Returns `ZeroArea` if the region has no pixels
    pub fn query_color(&self, region: &DynamicImage) -> Result<Color> {
        if region.width() == 0 || region.height() == 0 {
            return Err(MosaicError::ZeroArea {
                width: region.width(),
                height: region.height(),
            });
        }
        Ok(make_tile(TileSource::Image(region), self.width, self.height)?.color())
    }

    fn find_linear<D, F>(&mut self, repeat: bool, distance: F) -> Result<Cow<'_, Tile>>
    where
        D: PartialOrd,
        F: Fn(Color) -> D,
    {
        let position = nearest_index(&self.tiles, distance).ok_or(MosaicError::EmptyCorpus)?;
        if repeat {
            self.tiles
                .get(position)
                .map(Cow::Borrowed)
                .ok_or(MosaicError::EmptyCorpus)
        } else {
            Ok(Cow::Owned(self.tiles.remove(position)))
        }
    }

    fn find_in_color_space(&mut self, query: Color, repeat: bool) -> Result<Cow<'_, Tile>> {
        let tiles = &mut self.tiles;
        let index = self
            .index
            .get_or_insert_with(|| ColorIndex::build(std::mem::take(tiles)));

        if repeat {
            index
                .peek(query)
                .map(Cow::Borrowed)
                .ok_or(MosaicError::EmptyCorpus)
        } else {
            index
                .take(query)
                .map(Cow::Owned)
                .ok_or(MosaicError::EmptyCorpus)
        }
    }
}
