//! Turns a folder of candidate images into a chunked corpus and loads it back

use crate::corpus::reuse::{Confirm, Requirement, ReuseDecision, ReusePolicy, decide_reuse};
use crate::io::configuration::{
    CANONICAL_TILE_HEIGHT, CANONICAL_TILE_WIDTH, MAX_CHUNK_SIZE, SUPPORTED_EXTENSIONS,
};
use crate::io::error::{MosaicError, Result, WithContext, corrupt_chunk, invalid_parameter};
use crate::io::progress::ProgressManager;
use crate::store::chunk::{ChunkStore, RawTile};
use crate::store::descriptor::DatabaseDescriptor;
use crate::store::layout::{CorpusLayout, clean_filename};
use crate::tile::codec::{Tile, TileSource, decode_path, ensure_area, make_tile, resize_image};
use image::DynamicImage;
use rayon::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Runtime settings for building and loading corpora
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Maximum number of files persisted per chunk
    pub max_chunk_size: usize,
    /// Width tiles are stored at
    pub canonical_width: u32,
    /// Height tiles are stored at
    pub canonical_height: u32,
    /// Stop loading after this many chunks
    pub max_chunks: Option<usize>,
    /// When an existing corpus may be reused
    pub reuse: ReusePolicy,
    /// Ignore any existing corpus
    pub force_rebuild: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: MAX_CHUNK_SIZE,
            canonical_width: CANONICAL_TILE_WIDTH,
            canonical_height: CANONICAL_TILE_HEIGHT,
            max_chunks: None,
            reuse: ReusePolicy::default(),
            force_rebuild: false,
        }
    }
}

/// Every tile available for matching at one resolution
#[derive(Clone, Debug)]
pub struct Corpus {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl Corpus {
    /// Wrap tiles that all share `width`x`height`
    pub const fn new(width: u32, height: u32, tiles: Vec<Tile>) -> Self {
        Self {
            width,
            height,
            tiles,
        }
    }

    /// Tile width in pixels
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Tile height in pixels
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of tiles
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the corpus holds no tiles
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles in corpus order
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Take ownership of the tiles
    pub fn into_tiles(self) -> Vec<Tile> {
        self.tiles
    }
}

/// A candidate file that could not be decoded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeFailure {
    /// File that failed
    pub path: PathBuf,
    /// Decoder message
    pub reason: String,
}

/// What a build did
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Candidate files found in the source folder
    pub files_found: usize,
    /// Tiles in the resulting corpus
    pub tiles_built: usize,
    /// Chunks encoded and written by this build
    pub chunks_written: usize,
    /// Chunks left behind by an interrupted build and read back
    pub chunks_resumed: usize,
    /// Files skipped because they could not be decoded
    pub failures: Vec<DecodeFailure>,
}

/// Result of [`CorpusBuilder::build`]
#[derive(Debug)]
pub struct BuiltCorpus {
    /// Tiles at the requested resolution
    pub corpus: Corpus,
    /// Build statistics, including skipped files
    pub summary: BuildSummary,
}

/// Builds, resumes and loads the corpus of one source folder
pub struct CorpusBuilder {
    source_folder: PathBuf,
    store: ChunkStore,
    config: BuilderConfig,
    progress: Option<ProgressManager>,
}

impl CorpusBuilder {
    /// Builder for `source_folder`, persisting next to it as `<folder>.data`
    pub fn new(source_folder: impl Into<PathBuf>, config: BuilderConfig) -> Self {
        let source_folder = source_folder.into();
        let store = ChunkStore::new(CorpusLayout::for_source(&source_folder));
        Self {
            source_folder,
            store,
            config,
            progress: None,
        }
    }

    /// Persist the corpus under an explicit folder instead
    #[must_use]
    pub fn with_layout(mut self, layout: CorpusLayout) -> Self {
        self.store = ChunkStore::new(layout);
        self
    }

    /// Report progress through `progress`
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressManager) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Folder candidate images are read from
    pub fn source_folder(&self) -> &Path {
        &self.source_folder
    }

    /// Chunk storage backing this corpus
    pub const fn store(&self) -> &ChunkStore {
        &self.store
    }

    /// Active configuration
    pub const fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Candidate image files in the source folder, sorted by path
    ///
    /// # Errors
    ///
    /// Returns an error if the folder does not exist or cannot be listed
    pub fn candidate_files(&self) -> Result<Vec<PathBuf>> {
        candidate_files(&self.source_folder)
    }

    /// Reuse the persisted corpus when it fits the run, building a new one otherwise
    ///
    /// Input problems are reported before any chunk is touched. Files an
    /// earlier build failed to decode are not counted as available unless
    /// `force_rebuild` is set. A corpus that cannot be read falls back to a
    /// rebuild from scratch; only when counts disagree is `confirm` asked
    /// whether the existing corpus should be used.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `width` or `height` is zero
    /// - The source folder is missing or cannot be listed
    /// - A run without repeats needs more tiles than are available
    /// - Writing a chunk or the descriptor fails
    pub fn obtain(
        &self,
        width: u32,
        height: u32,
        requirement: Requirement,
        confirm: &mut dyn Confirm,
    ) -> Result<Corpus> {
        ensure_area(width, height)?;
        let files = self.candidate_files()?;

        if !self.config.force_rebuild {
            match self.try_reuse(width, height, files.len(), requirement, confirm) {
                Ok(Some(corpus)) => return Ok(corpus),
                Ok(None) => {}
                Err(e) if e.is_persistence() => {
                    warn!("Failed to load existing corpus, rebuilding: {e}");
                }
                Err(e) => return Err(e),
            }
        }

        let expected = files.len() - self.known_failures(&files);
        if !requirement.is_met_by(expected) {
            return Err(MosaicError::InsufficientTiles {
                required: requirement.required_tiles(),
                available: expected,
            });
        }

        info!(folder = %self.source_folder.display(), "creating new corpus");
        let built = self.build(width, height)?;

        if !requirement.is_met_by(built.corpus.len()) {
            return Err(MosaicError::InsufficientTiles {
                required: requirement.required_tiles(),
                available: built.corpus.len(),
            });
        }

        Ok(built.corpus)
    }

    // Candidates an earlier build recorded as undecodable and that are still present
    fn known_failures(&self, files: &[PathBuf]) -> usize {
        if self.config.force_rebuild || !self.store.layout().exists() {
            return 0;
        }
        let Ok(descriptor) = DatabaseDescriptor::load(self.store.layout()) else {
            return 0;
        };
        files
            .iter()
            .filter(|path| descriptor.failed_files.contains(&path_label(path)))
            .count()
    }

    fn try_reuse(
        &self,
        width: u32,
        height: u32,
        folder_files: usize,
        requirement: Requirement,
        confirm: &mut dyn Confirm,
    ) -> Result<Option<Corpus>> {
        if !self.store.layout().exists() {
            return Ok(None);
        }

        info!(folder = %self.store.layout().root().display(), "attempting to reuse existing corpus");
        let descriptor = DatabaseDescriptor::load(self.store.layout())?;
        descriptor.ensure_resolution(width, height)?;

        match decide_reuse(
            &descriptor,
            folder_files,
            requirement,
            &self.config.reuse,
            confirm,
        ) {
            ReuseDecision::Reuse => {
                let corpus = self.load(width, height)?;
                if requirement.is_met_by(corpus.len()) {
                    Ok(Some(corpus))
                } else {
                    Err(MosaicError::InsufficientTiles {
                        required: requirement.required_tiles(),
                        available: corpus.len(),
                    })
                }
            }
            ReuseDecision::Rebuild => Ok(None),
        }
    }

    /// Convert every candidate file into chunks and return the tiles at `width`x`height`
    ///
    /// Files are processed one chunk at a time, decoded in parallel, and each
    /// chunk is persisted before the next one starts. Files that fail to
    /// decode are skipped and listed in the summary. An interrupted build of
    /// the same folder is resumed; any other existing corpus is cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `width` or `height` is zero
    /// - The source folder cannot be listed
    /// - The existing corpus cannot be cleared
    /// - A chunk or the descriptor cannot be written (earlier chunks stay usable)
    /// - An unreadable chunk left by an interrupted build cannot be removed
    pub fn build(&self, width: u32, height: u32) -> Result<BuiltCorpus> {
        ensure_area(width, height)?;
        if self.config.max_chunk_size == 0 {
            return Err(invalid_parameter(
                "max_chunk_size",
                &0,
                &"chunks must hold at least one tile",
            ));
        }

        let canonical = self.canonical_for(width, height);
        let files = self.candidate_files()?;
        let layout = self.store.layout();

        let mut descriptor = DatabaseDescriptor::started(
            &self.source_folder,
            canonical,
            files.len(),
            self.config.max_chunk_size,
        );

        let previous_failures = match DatabaseDescriptor::load(layout) {
            Ok(existing) if existing.resumable_for(&descriptor) => {
                info!("resuming interrupted corpus build");
                existing.failed_files
            }
            _ => {
                self.store.clear_all()?;
                Vec::new()
            }
        };
        descriptor.save(layout)?;

        let batches: Vec<&[PathBuf]> = files.chunks(self.config.max_chunk_size).collect();
        if let Some(progress) = &self.progress {
            progress.begin_build(batches.len());
        }

        let mut summary = BuildSummary {
            files_found: files.len(),
            ..BuildSummary::default()
        };
        let mut tiles = Vec::with_capacity(files.len());

        for (slot, batch) in batches.iter().enumerate() {
            let raw_tiles = match self.resume_chunk(slot)? {
                Some(raw_tiles) => {
                    summary.chunks_resumed += 1;
                    descriptor.failed_files.extend(
                        previous_failures
                            .iter()
                            .filter(|failed| batch.iter().any(|path| path_label(path) == **failed))
                            .cloned(),
                    );
                    raw_tiles
                }
                None => {
                    let (raw_tiles, failures) = self.process_batch(slot, batch, canonical);
                    if !self.store.write_chunk(&raw_tiles, slot)? {
                        let path = layout.chunk_path(slot);
                        return Err(MosaicError::ChunkWrite {
                            index: slot,
                            path,
                            source: std::io::Error::new(
                                ErrorKind::AlreadyExists,
                                "slot is occupied by an entry that is not a readable chunk",
                            ),
                        });
                    }
                    summary.chunks_written += 1;
                    descriptor
                        .failed_files
                        .extend(failures.iter().map(|failure| path_label(&failure.path)));
                    summary.failures.extend(failures);
                    raw_tiles
                }
            };

            descriptor.tile_count += raw_tiles.len();
            descriptor.chunk_count = slot + 1;
            descriptor.save(layout)?;

            for raw in raw_tiles {
                let id = tiles.len();
                tiles.push(tile_from_raw(raw, width, height, id, &self.store, slot)?);
            }

            if let Some(progress) = &self.progress {
                progress.advance_phase();
            }
        }

        descriptor.complete = true;
        descriptor.save(layout)?;

        summary.tiles_built = tiles.len();
        info!(
            files = summary.files_found,
            tiles = summary.tiles_built,
            written = summary.chunks_written,
            resumed = summary.chunks_resumed,
            "corpus build finished"
        );
        if !summary.failures.is_empty() {
            warn!(
                skipped = summary.failures.len(),
                "some candidate files could not be decoded"
            );
        }

        Ok(BuiltCorpus {
            corpus: Corpus::new(width, height, tiles),
            summary,
        })
    }

    /// Read the persisted corpus and derive tiles at `width`x`height`
    ///
    /// Chunks are read in slot order; at most `max_chunks` of them when configured.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `width` or `height` is zero
    /// - The descriptor is missing, corrupt, or records an unfinished build
    /// - The request exceeds the canonical resolution
    /// - The chunks on disk disagree with the descriptor or cannot be decoded
    pub fn load(&self, width: u32, height: u32) -> Result<Corpus> {
        ensure_area(width, height)?;
        let layout = self.store.layout();
        let descriptor = DatabaseDescriptor::load(layout)?;

        if !descriptor.complete {
            return Err(MosaicError::CorruptDescriptor {
                path: layout.descriptor_path(),
                reason: "corpus build did not complete".to_string(),
            });
        }
        descriptor.ensure_resolution(width, height)?;

        let slots = self.store.list_chunks()?;
        if slots.len() != descriptor.chunk_count {
            return Err(MosaicError::CorruptDescriptor {
                path: layout.descriptor_path(),
                reason: format!(
                    "descriptor lists {} chunks but {} were found",
                    descriptor.chunk_count,
                    slots.len()
                ),
            });
        }

        let limit = self.config.max_chunks.unwrap_or(usize::MAX);
        let to_load = slots.len().min(limit);
        if let Some(progress) = &self.progress {
            progress.begin_load(to_load);
        }

        let mut tiles = Vec::with_capacity(descriptor.tile_count);
        for &slot in slots.iter().take(to_load) {
            for raw in self.store.read_chunk(slot)? {
                let id = tiles.len();
                tiles.push(tile_from_raw(raw, width, height, id, &self.store, slot)?);
            }
            if let Some(progress) = &self.progress {
                progress.advance_phase();
            }
            debug!(slot, tiles = tiles.len(), "chunk loaded");
        }

        if to_load < slots.len() {
            info!(chunks = to_load, "reached limit for max chunks use");
        }
        info!(tiles = tiles.len(), "corpus loaded");

        Ok(Corpus::new(width, height, tiles))
    }

    fn canonical_for(&self, width: u32, height: u32) -> (u32, u32) {
        (
            self.config.canonical_width.max(width),
            self.config.canonical_height.max(height),
        )
    }

    // Chunks left by an interrupted build; unreadable ones are discarded and recomputed
    fn resume_chunk(&self, slot: usize) -> Result<Option<Vec<RawTile>>> {
        if !self.store.contains(slot) {
            return Ok(None);
        }
        match self.store.read_chunk(slot) {
            Ok(raw_tiles) => Ok(Some(raw_tiles)),
            Err(e) => {
                warn!(slot, "discarding unreadable chunk: {e}");
                let path = self.store.layout().chunk_path(slot);
                fs::remove_file(&path).map_err(|source| MosaicError::ChunkWrite {
                    index: slot,
                    path,
                    source,
                })?;
                Ok(None)
            }
        }
    }

    fn process_batch(
        &self,
        slot: usize,
        batch: &[PathBuf],
        canonical: (u32, u32),
    ) -> (Vec<RawTile>, Vec<DecodeFailure>) {
        if let Some(progress) = &self.progress {
            progress.begin_chunk(slot, batch.len());
        }

        let outcomes: Vec<std::result::Result<RawTile, DecodeFailure>> = batch
            .par_iter()
            .map(|path| {
                let outcome = decode_path(path)
                    .map(|image| {
                        RawTile::from_image(
                            path_label(path),
                            resize_image(&image, canonical.0, canonical.1),
                        )
                    })
                    .map_err(|e| DecodeFailure {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                if let Some(progress) = &self.progress {
                    progress.advance_item();
                }
                outcome
            })
            .collect();

        let mut raw_tiles = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(raw) => raw_tiles.push(raw),
                Err(failure) => {
                    warn!(path = %failure.path.display(), "skipping candidate: {}", failure.reason);
                    failures.push(failure);
                }
            }
        }

        debug!(slot, tiles = raw_tiles.len(), skipped = failures.len(), "chunk processed");
        (raw_tiles, failures)
    }
}

/// Recognised image files directly inside `folder`, sorted by path
///
/// # Errors
///
/// Returns an error if `folder` is not a directory or cannot be listed
pub fn candidate_files(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(invalid_parameter(
            "folder",
            &folder.display(),
            &"source folder does not exist or is not a directory",
        ));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(folder).with_path(folder, "list source folder")? {
        let path = entry.with_path(folder, "list source folder")?.path();
        if path.is_file() && has_supported_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn path_label(path: &Path) -> String {
    clean_filename(&path.file_name().unwrap_or_default().to_string_lossy())
}

// Stored pixels go through the codec like any other source image
fn tile_from_raw(
    raw: RawTile,
    width: u32,
    height: u32,
    id: usize,
    store: &ChunkStore,
    slot: usize,
) -> Result<Tile> {
    let name = raw.name.clone();
    let image = raw.into_image().ok_or_else(|| {
        corrupt_chunk(
            &store.layout().chunk_path(slot),
            &format!("tile '{name}' has inconsistent dimensions"),
        )
    })?;
    let stored = DynamicImage::ImageRgb8(image);
    Ok(make_tile(TileSource::Image(&stored), width, height)?
        .with_id(id)
        .with_name(name))
}
