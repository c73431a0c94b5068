//! Corpus metadata used to decide between reuse and rebuild

use crate::io::configuration::FORMAT_VERSION;
use crate::io::error::{MosaicError, Result, WithContext};
use crate::store::layout::CorpusLayout;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Identity and size of a persisted corpus
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseDescriptor {
    /// Wire format version
    pub version: u32,
    /// Folder the candidate images were read from
    pub source_folder: PathBuf,
    /// Width tiles are stored at
    pub canonical_width: u32,
    /// Height tiles are stored at
    pub canonical_height: u32,
    /// Candidate files found in the source folder when the build started
    pub source_file_count: usize,
    /// Tiles successfully decoded and persisted
    pub tile_count: usize,
    /// Chunk slots written
    pub chunk_count: usize,
    /// Chunk capacity the build partitioned files with
    pub max_chunk_size: usize,
    /// Files that could not be decoded
    #[serde(default)]
    pub failed_files: Vec<String>,
    /// False while a build is in progress or was interrupted
    pub complete: bool,
}

impl DatabaseDescriptor {
    /// Descriptor for a build that is about to start
    pub fn started(
        source_folder: &Path,
        canonical: (u32, u32),
        source_file_count: usize,
        max_chunk_size: usize,
    ) -> Self {
        Self {
            version: FORMAT_VERSION,
            source_folder: source_folder.to_path_buf(),
            canonical_width: canonical.0,
            canonical_height: canonical.1,
            source_file_count,
            tile_count: 0,
            chunk_count: 0,
            max_chunk_size,
            failed_files: Vec::new(),
            complete: false,
        }
    }

    /// Canonical (width, height)
    pub const fn canonical(&self) -> (u32, u32) {
        (self.canonical_width, self.canonical_height)
    }

    /// Check that tiles of `width`x`height` can be derived by downscaling
    ///
    /// # Errors
    ///
    /// Returns `InsufficientResolution` if either dimension exceeds the canonical one
    pub fn ensure_resolution(&self, width: u32, height: u32) -> Result<()> {
        if width > self.canonical_width || height > self.canonical_height {
            return Err(MosaicError::InsufficientResolution {
                requested: (width, height),
                available: (self.canonical_width, self.canonical_height),
            });
        }
        Ok(())
    }

    /// Whether an interrupted build with this descriptor can be resumed for a new request
    pub fn resumable_for(&self, other: &Self) -> bool {
        !self.complete
            && self.version == other.version
            && self.source_folder == other.source_folder
            && self.canonical() == other.canonical()
            && self.source_file_count == other.source_file_count
            && self.max_chunk_size == other.max_chunk_size
    }

    /// Read the descriptor of `layout`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The descriptor file does not exist
    /// - The file is not valid JSON of the expected shape
    /// - The file was written by an incompatible format version
    pub fn load(layout: &CorpusLayout) -> Result<Self> {
        let path = layout.descriptor_path();
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(MosaicError::MissingDescriptor { path });
            }
            Err(e) => return Err(e).with_path(&path, "open descriptor"),
        };

        let descriptor: Self = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            MosaicError::CorruptDescriptor {
                path: path.clone(),
                reason: e.to_string(),
            }
        })?;

        if descriptor.version != FORMAT_VERSION {
            return Err(MosaicError::CorruptDescriptor {
                path,
                reason: format!(
                    "format version {} is not supported (expected {FORMAT_VERSION})",
                    descriptor.version
                ),
            });
        }

        Ok(descriptor)
    }

    /// Write the descriptor, replacing any previous one in a single rename
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus folder cannot be created or the file cannot be written
    pub fn save(&self, layout: &CorpusLayout) -> Result<()> {
        fs::create_dir_all(layout.root()).with_path(layout.root(), "create corpus folder")?;

        let path = layout.descriptor_path();
        let staging = path.with_extension("json.tmp");
        {
            let file = File::create(&staging).with_path(&staging, "create descriptor")?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, self).map_err(|e| {
                MosaicError::CorruptDescriptor {
                    path: staging.clone(),
                    reason: e.to_string(),
                }
            })?;
            writer.flush().with_path(&staging, "write descriptor")?;
        }
        fs::rename(&staging, &path).with_path(&path, "replace descriptor")
    }
}
