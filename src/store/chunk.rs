//! Bounded batches of raw tiles persisted as single bincode files

use crate::io::configuration::FORMAT_VERSION;
use crate::io::error::{MosaicError, Result, WithContext, corrupt_chunk};
use crate::store::layout::CorpusLayout;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use tracing::debug;

/// A tile as persisted: canonical-resolution RGB pixels plus its source name
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTile {
    /// Sanitised source file name
    pub name: String,
    /// Pixel columns
    pub width: u32,
    /// Pixel rows
    pub height: u32,
    /// Row-major RGB8 samples, `width * height * 3` bytes
    pub pixels: Vec<u8>,
}

impl RawTile {
    /// Capture an RGB buffer under `name`
    pub fn from_image(name: impl Into<String>, image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            name: name.into(),
            width,
            height,
            pixels: image.into_raw(),
        }
    }

    /// Rebuild the RGB buffer, or `None` if the sample count does not match the dimensions
    pub fn into_image(self) -> Option<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.pixels)
    }

    fn is_well_formed(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.pixels.len() == self.width as usize * self.height as usize * 3
    }
}

#[derive(Serialize)]
struct ChunkRecordRef<'a> {
    version: u32,
    tiles: &'a [RawTile],
}

#[derive(Deserialize)]
struct ChunkRecord {
    version: u32,
    tiles: Vec<RawTile>,
}

/// Reads and writes numbered chunk slots inside a corpus folder
///
/// Slots are write-once: a write to an occupied slot is skipped, which lets an
/// interrupted build resume without touching chunks that already landed.
#[derive(Clone, Debug)]
pub struct ChunkStore {
    layout: CorpusLayout,
}

impl ChunkStore {
    /// Store over the given corpus layout
    pub const fn new(layout: CorpusLayout) -> Self {
        Self { layout }
    }

    /// Layout the store reads from and writes to
    pub const fn layout(&self) -> &CorpusLayout {
        &self.layout
    }

    /// Whether `slot` already holds a chunk
    pub fn contains(&self, slot: usize) -> bool {
        self.layout.chunk_path(slot).is_file()
    }

    /// Persist `tiles` as chunk `slot`
    ///
    /// Returns `false` without writing when the slot is already occupied. The
    /// chunk is staged under a temporary name and renamed into place, so a
    /// slot never holds a partial chunk.
    ///
    /// # Errors
    ///
    /// Returns `ChunkWrite` if the folder cannot be created or the file cannot be written
    pub fn write_chunk(&self, tiles: &[RawTile], slot: usize) -> Result<bool> {
        let path = self.layout.chunk_path(slot);
        if path.exists() {
            debug!(slot, "chunk already present, skipping write");
            return Ok(false);
        }

        let write_error = |source: std::io::Error| MosaicError::ChunkWrite {
            index: slot,
            path: path.clone(),
            source,
        };

        fs::create_dir_all(self.layout.images_folder()).map_err(write_error)?;

        let record = ChunkRecordRef {
            version: FORMAT_VERSION,
            tiles,
        };
        let bytes = bincode::serialize(&record).map_err(|e| write_error(std::io::Error::other(e)))?;

        let staging = path.with_extension("tmp");
        fs::write(&staging, bytes).map_err(write_error)?;
        fs::rename(&staging, &path).map_err(write_error)?;

        debug!(slot, tiles = tiles.len(), "chunk written");
        Ok(true)
    }

    /// Load every raw tile of chunk `slot`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The chunk file cannot be read
    /// - The bytes do not deserialize into a chunk record
    /// - The record has an unknown format version
    /// - A tile's pixel buffer does not match its dimensions
    pub fn read_chunk(&self, slot: usize) -> Result<Vec<RawTile>> {
        let path = self.layout.chunk_path(slot);
        let bytes = fs::read(&path).with_path(&path, "read chunk")?;

        let record: ChunkRecord =
            bincode::deserialize(&bytes).map_err(|e| corrupt_chunk(&path, &e))?;

        if record.version != FORMAT_VERSION {
            return Err(corrupt_chunk(
                &path,
                &format!("unsupported format version {}", record.version),
            ));
        }

        if let Some(bad) = record.tiles.iter().find(|tile| !tile.is_well_formed()) {
            return Err(corrupt_chunk(
                &path,
                &format!(
                    "tile '{}' has {} bytes for {}x{} pixels",
                    bad.name,
                    bad.pixels.len(),
                    bad.width,
                    bad.height
                ),
            ));
        }

        Ok(record.tiles)
    }

    /// Occupied slots in ascending order
    ///
    /// # Errors
    ///
    /// Returns an error if the images folder exists but cannot be listed
    pub fn list_chunks(&self) -> Result<Vec<usize>> {
        let folder = self.layout.images_folder();
        if !folder.is_dir() {
            return Ok(Vec::new());
        }

        let mut slots = Vec::new();
        for entry in fs::read_dir(folder).with_path(folder, "list chunks")? {
            let path = entry.with_path(folder, "list chunks")?.path();
            if let Some(slot) = CorpusLayout::slot_of(&path) {
                slots.push(slot);
            }
        }
        slots.sort_unstable();
        Ok(slots)
    }

    /// Delete the descriptor and every chunk of this corpus
    ///
    /// The descriptor goes first so an interrupted clear never leaves a
    /// descriptor pointing at missing chunks.
    ///
    /// # Errors
    ///
    /// Returns an error if existing files cannot be removed
    pub fn clear_all(&self) -> Result<()> {
        let descriptor = self.layout.descriptor_path();
        match fs::remove_file(&descriptor) {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                return Err(e).with_path(&descriptor, "remove descriptor");
            }
            _ => {}
        }

        let root = self.layout.root();
        match fs::remove_dir_all(root) {
            Err(e) if e.kind() != ErrorKind::NotFound => {
                Err(e).with_path(root, "remove corpus folder")
            }
            _ => Ok(()),
        }
    }
}
