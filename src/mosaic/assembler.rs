//! Walks the cells of a source picture and places the matched tile in each

use crate::io::error::{MosaicError, Result, invalid_parameter};
use crate::io::progress::ProgressManager;
use crate::matching::matcher::ColorMatcher;
use image::{DynamicImage, GenericImageView, RgbImage};
use tracing::info;

/// Composes a mosaic from square cells of a fixed size
pub struct MosaicAssembler {
    cell_size: u32,
    progress: Option<ProgressManager>,
}

impl MosaicAssembler {
    /// Assembler for cells of `cell_size`x`cell_size` pixels
    ///
    /// # Errors
    ///
    /// Returns `ZeroArea` if `cell_size` is zero
    pub fn new(cell_size: u32) -> Result<Self> {
        if cell_size == 0 {
            return Err(MosaicError::ZeroArea {
                width: cell_size,
                height: cell_size,
            });
        }
        Ok(Self {
            cell_size,
            progress: None,
        })
    }

    /// Report placed cells through `progress`
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressManager) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Cell edge length in pixels
    pub const fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Number of cells covering a `width`x`height` picture, partial edge cells included
    pub const fn pieces_required(&self, width: u32, height: u32) -> usize {
        width.div_ceil(self.cell_size) as usize * height.div_ceil(self.cell_size) as usize
    }

    /// Replace every cell of `source` with the tile `matcher` picks for it
    ///
    /// Cells are visited row by row; edge cells are cropped to the picture and
    /// the placed tile is clipped accordingly.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The matcher's tile size differs from the cell size
    /// - The matcher runs out of tiles before every cell is filled
    pub fn assemble(
        &self,
        source: &DynamicImage,
        matcher: &mut ColorMatcher,
        repeat: bool,
    ) -> Result<RgbImage> {
        if matcher.resolution() != (self.cell_size, self.cell_size) {
            let (tile_width, tile_height) = matcher.resolution();
            return Err(invalid_parameter(
                "cell_size",
                &self.cell_size,
                &format!("matcher holds {tile_width}x{tile_height} tiles"),
            ));
        }

        let (width, height) = source.dimensions();
        let mut canvas = RgbImage::new(width, height);
        let step = self.cell_size as usize;

        if let Some(progress) = &self.progress {
            progress.begin_cells(self.pieces_required(width, height));
        }

        for y in (0..height).step_by(step) {
            for x in (0..width).step_by(step) {
                let cell_width = self.cell_size.min(width - x);
                let cell_height = self.cell_size.min(height - y);
                let region = source.crop_imm(x, y, cell_width, cell_height);

                let tile = matcher.find_closest_region(&region, repeat)?;
                image::imageops::replace(&mut canvas, tile.image(), i64::from(x), i64::from(y));

                if let Some(progress) = &self.progress {
                    progress.advance_phase();
                }
            }
        }

        info!(
            cells = self.pieces_required(width, height),
            remaining = matcher.len(),
            "mosaic assembled"
        );
        Ok(canvas)
    }
}

/// Linear blend `source·(1 − alpha) + mosaic·alpha`
///
/// # Errors
///
/// Returns an error if the images differ in size or `alpha` is outside `[0, 1]`
pub fn blend(source: &RgbImage, mosaic: &RgbImage, alpha: f32) -> Result<RgbImage> {
    if source.dimensions() != mosaic.dimensions() {
        return Err(invalid_parameter(
            "mosaic",
            &format!("{}x{}", mosaic.width(), mosaic.height()),
            &format!(
                "must match source dimensions {}x{}",
                source.width(),
                source.height()
            ),
        ));
    }
    if !(0.0..=1.0).contains(&alpha) {
        return Err(invalid_parameter("alpha", &alpha, &"must be within [0, 1]"));
    }

    let mut blended = RgbImage::new(source.width(), source.height());
    for ((out, src), tile) in blended
        .pixels_mut()
        .zip(source.pixels())
        .zip(mosaic.pixels())
    {
        for ((channel, &s), &m) in out.0.iter_mut().zip(src.0.iter()).zip(tile.0.iter()) {
            let value = f32::from(s).mul_add(1.0 - alpha, f32::from(m) * alpha);
            *channel = value.round().clamp(0.0, 255.0) as u8;
        }
    }
    Ok(blended)
}
