//! Tile construction with a fixed resampling filter and truncating colour averages

use crate::io::error::{MosaicError, Result, invalid_parameter};
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use ndarray::ArrayView2;
use std::path::Path;

/// Filter used for every resize in build, load and query paths
///
/// Average colours are only comparable across runs if resampling never changes.
pub const RESAMPLE_FILTER: FilterType = FilterType::Triangle;

/// Mean colour of a tile, one byte per channel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Create a colour from its channels
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as an `[r, g, b]` array
    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

/// A resized candidate image together with its average colour
#[derive(Clone, Debug)]
pub struct Tile {
    id: usize,
    name: String,
    image: RgbImage,
    color: Color,
}

impl Tile {
    /// Wrap an already-resized buffer, computing its average colour
    ///
    /// # Errors
    ///
    /// Returns `ZeroArea` if the buffer has no pixels
    pub fn from_image(image: RgbImage) -> Result<Self> {
        let color = average_color(&image)?;
        Ok(Self {
            id: 0,
            name: String::new(),
            image,
            color,
        })
    }

    /// Assign the tile's position within its corpus
    #[must_use]
    pub fn with_id(mut self, id: usize) -> Self {
        self.id = id;
        self
    }

    /// Assign the tile's display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Position of the tile within its corpus
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Sanitised name of the file the tile came from
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pixel data at the tile's resolution
    pub const fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Average colour of the pixel data
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Tile width in pixels
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Tile height in pixels
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Input accepted by [`make_tile`]
#[derive(Clone, Copy)]
pub enum TileSource<'a> {
    /// Image file on disk
    Path(&'a Path),
    /// Encoded image bytes
    Bytes(&'a [u8]),
    /// Already decoded image, such as a cropped cell of the source picture
    Image(&'a DynamicImage),
}

/// Decode and resize `source` to `width`x`height`, then compute its average colour
///
/// # Errors
///
/// Returns an error if:
/// - `width` or `height` is zero
/// - The file cannot be opened or decoded
/// - The byte buffer is not a recognised image format
pub fn make_tile(source: TileSource<'_>, width: u32, height: u32) -> Result<Tile> {
    ensure_area(width, height)?;

    let resized = match source {
        TileSource::Path(path) => resize_image(&decode_path(path)?, width, height),
        TileSource::Bytes(bytes) => {
            let decoded =
                image::load_from_memory(bytes).map_err(|source| MosaicError::Decode { source })?;
            resize_image(&decoded, width, height)
        }
        TileSource::Image(img) => resize_image(img, width, height),
    };

    Tile::from_image(resized)
}

/// Open and decode an image file
///
/// # Errors
///
/// Returns `ImageLoad` if the file is unreadable or not an image
pub fn decode_path(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|source| MosaicError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert to RGB and resize with [`RESAMPLE_FILTER`]
pub fn resize_image(image: &DynamicImage, width: u32, height: u32) -> RgbImage {
    resize_rgb(&image.to_rgb8(), width, height)
}

/// Resize an RGB buffer with [`RESAMPLE_FILTER`], copying when already at size
pub fn resize_rgb(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    image::imageops::resize(image, width, height, RESAMPLE_FILTER)
}

/// Per-channel mean of all pixels, truncated toward zero
///
/// # Errors
///
/// Returns `ZeroArea` for an empty buffer
pub fn average_color(image: &RgbImage) -> Result<Color> {
    let pixel_count = image.width() as usize * image.height() as usize;
    if pixel_count == 0 {
        return Err(MosaicError::ZeroArea {
            width: image.width(),
            height: image.height(),
        });
    }

    let pixels = ArrayView2::from_shape((pixel_count, 3), image.as_raw().as_slice())
        .map_err(|e| invalid_parameter("image", &pixel_count, &e))?;

    let mut sums = [0u64; 3];
    for (sum, channel) in sums.iter_mut().zip(pixels.columns()) {
        *sum = channel.iter().map(|&value| u64::from(value)).sum();
    }

    let count = pixel_count as u64;
    Ok(Color::from(sums.map(|sum| (sum / count) as u8)))
}

/// Reject tile sizes with no pixels
///
/// # Errors
///
/// Returns `ZeroArea` if either dimension is zero
pub fn ensure_area(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(MosaicError::ZeroArea { width, height });
    }
    Ok(())
}
