//! JPEG export of the finished mosaic and its blends with the source picture

use crate::io::configuration::{BLEND_STEPS, NO_REPEAT_SUFFIX, OUTPUT_EXTENSION, REPEAT_SUFFIX};
use crate::io::error::{MosaicError, Result};
use crate::mosaic::assembler::blend;
use image::RgbImage;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write `image` to `path`, creating missing parent directories
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be encoded or written
pub fn save_image(image: &RgbImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| MosaicError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    image.save(path).map_err(|e| MosaicError::ImageExport {
        path: path.to_path_buf(),
        source: e,
    })?;

    debug!(path = %path.display(), "image written");
    Ok(())
}

/// Path of the full-strength mosaic for `destination`
pub fn mosaic_path(destination: &Path, repeat: bool) -> PathBuf {
    let suffix = if repeat { REPEAT_SUFFIX } else { NO_REPEAT_SUFFIX };
    suffixed(destination, suffix)
}

/// Path of the blend written at step `step` of [`BLEND_STEPS`]
pub fn blend_path(destination: &Path, step: u32) -> PathBuf {
    suffixed(destination, &format!("{:.1}", blend_alpha(step)))
}

/// Mosaic weight used for blend step `step`
pub fn blend_alpha(step: u32) -> f32 {
    step as f32 / BLEND_STEPS as f32
}

fn suffixed(destination: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(destination.as_os_str());
    name.push(suffix);
    name.push(".");
    name.push(OUTPUT_EXTENSION);
    PathBuf::from(name)
}

/// Write the mosaic and, when `blends` is set, one blend per step with the source
///
/// Blend step `i` weights the mosaic by `i / BLEND_STEPS`, so step 0 reproduces
/// the source picture. Returns every path written, mosaic first.
///
/// # Errors
///
/// Returns an error if the images differ in size or any file cannot be written
pub fn export_mosaic(
    source: &RgbImage,
    mosaic: &RgbImage,
    destination: &Path,
    repeat: bool,
    blends: bool,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(BLEND_STEPS as usize + 1);

    let full = mosaic_path(destination, repeat);
    save_image(mosaic, &full)?;
    written.push(full);

    if blends {
        for step in 0..BLEND_STEPS {
            let blended = blend(source, mosaic, blend_alpha(step))?;
            let path = blend_path(destination, step);
            save_image(&blended, &path)?;
            written.push(path);
        }
    }

    Ok(written)
}
