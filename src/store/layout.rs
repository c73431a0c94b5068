//! On-disk layout of a corpus folder and filename sanitising

use crate::io::configuration::{
    CHUNK_EXTENSION, CORPUS_FOLDER_SUFFIX, DESCRIPTOR_FILE, IMAGES_FOLDER,
};
use std::path::{Path, PathBuf};

/// Characters rejected by at least one common filesystem
const ILLEGAL_FILENAME_CHARS: &[char] = &[':', '<', '>', '"', '\\', '/', '|', '?', '*'];

/// Paths of everything persisted for one source folder
///
/// ```text
/// <source>.data/
///     database.json
///     images/
///         0.data
///         1.data
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorpusLayout {
    root: PathBuf,
    images: PathBuf,
}

impl CorpusLayout {
    /// Layout for the corpus derived from `source_folder`
    pub fn for_source(source_folder: &Path) -> Self {
        Self::at(corpus_folder_for(source_folder))
    }

    /// Layout rooted at an explicit corpus folder
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let images = root.join(IMAGES_FOLDER);
        Self { root, images }
    }

    /// Corpus root folder
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder holding chunk files
    pub fn images_folder(&self) -> &Path {
        &self.images
    }

    /// Descriptor file location
    pub fn descriptor_path(&self) -> PathBuf {
        self.root.join(DESCRIPTOR_FILE)
    }

    /// File holding the chunk in `slot`
    pub fn chunk_path(&self, slot: usize) -> PathBuf {
        self.images.join(format!("{slot}.{CHUNK_EXTENSION}"))
    }

    /// Slot number encoded in a chunk file name, if it is one
    pub fn slot_of(path: &Path) -> Option<usize> {
        if path.extension().and_then(|ext| ext.to_str()) != Some(CHUNK_EXTENSION) {
            return None;
        }
        path.file_stem()?.to_str()?.parse().ok()
    }

    /// Whether anything has been persisted for this corpus
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }
}

/// Corpus folder name: the source folder path with the fixed suffix appended
pub fn corpus_folder_for(source_folder: &Path) -> PathBuf {
    let source = source_folder.to_string_lossy();
    let trimmed = source.trim_end_matches(['/', '\\']);
    let base = if trimmed.is_empty() { source.as_ref() } else { trimmed };
    PathBuf::from(format!("{base}.{CORPUS_FOLDER_SUFFIX}"))
}

/// Remove characters that are illegal in file names on common filesystems
pub fn clean_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !ILLEGAL_FILENAME_CHARS.contains(c))
        .collect()
}
