//! Error types and context management for corpus and matching operations

use std::fmt;
use std::path::{Path, PathBuf};

/// Main error type for all mosaic operations
#[derive(Debug)]
pub enum MosaicError {
    /// Failed to open or decode an image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// An in-memory buffer could not be decoded as an image
    Decode {
        /// Underlying decoding error
        source: image::ImageError,
    },

    /// Requested tile or cell has no pixels
    ZeroArea {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Requested tile resolution exceeds what the stored corpus can provide
    InsufficientResolution {
        /// Requested (width, height)
        requested: (u32, u32),
        /// Canonical (width, height) of the stored corpus
        available: (u32, u32),
    },

    /// Too few tiles for a run that may not repeat tiles
    InsufficientTiles {
        /// Number of cells that need a distinct tile
        required: usize,
        /// Number of tiles available
        available: usize,
    },

    /// Every tile has already been consumed
    EmptyCorpus,

    /// Persisted chunk bytes do not have the expected shape
    CorruptChunk {
        /// Path of the chunk file
        path: PathBuf,
        /// Description of the problem
        reason: String,
    },

    /// Corpus descriptor is absent
    MissingDescriptor {
        /// Expected descriptor location
        path: PathBuf,
    },

    /// Corpus descriptor exists but cannot be parsed
    CorruptDescriptor {
        /// Path of the descriptor file
        path: PathBuf,
        /// Description of the problem
        reason: String,
    },

    /// Persisting a chunk failed; earlier chunks remain usable for a resume
    ChunkWrite {
        /// Slot of the chunk being written
        index: usize,
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Failed to save an output image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for MosaicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::Decode { source } => write!(f, "Failed to decode image buffer: {source}"),
            Self::ZeroArea { width, height } => {
                write!(f, "Tile area must be at least 1x1 pixel, got {width}x{height}")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::InsufficientResolution {
                requested,
                available,
            } => {
                write!(
                    f,
                    "Requested tile size {}x{} exceeds stored resolution {}x{}",
                    requested.0, requested.1, available.0, available.1
                )
            }
            Self::InsufficientTiles {
                required,
                available,
            } => {
                write!(
                    f,
                    "Not enough tiles to build without repeating: {available} < {required}"
                )
            }
            Self::EmptyCorpus => write!(f, "No tiles left to match against"),
            Self::CorruptChunk { path, reason } => {
                write!(f, "Corrupt chunk '{}': {reason}", path.display())
            }
            Self::MissingDescriptor { path } => {
                write!(f, "Corpus descriptor not found at '{}'", path.display())
            }
            Self::CorruptDescriptor { path, reason } => {
                write!(f, "Corrupt corpus descriptor '{}': {reason}", path.display())
            }
            Self::ChunkWrite {
                index,
                path,
                source,
            } => {
                write!(
                    f,
                    "Failed to write chunk {index} to '{}': {source}",
                    path.display()
                )
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for MosaicError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. }
            | Self::Decode { source }
            | Self::ImageExport { source, .. } => Some(source),
            Self::ChunkWrite { source, .. } | Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl MosaicError {
    /// Whether this error came from reading persisted corpus data
    ///
    /// The load path treats these as a signal to rebuild from scratch.
    pub const fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::CorruptChunk { .. }
                | Self::MissingDescriptor { .. }
                | Self::CorruptDescriptor { .. }
                | Self::FileSystem { .. }
                | Self::InsufficientResolution { .. }
        )
    }
}

/// Result type alias for mosaic operations
pub type Result<T> = std::result::Result<T, MosaicError>;

/// Additional context attached to errors raised through `?`
#[derive(Debug, Default, Clone)]
pub struct ErrorContext {
    /// File or folder being operated on
    pub path: Option<PathBuf>,
    /// Operation being performed
    pub operation: Option<&'static str>,
}

/// Enriches errors converted from foreign types with path information
pub trait WithContext<T> {
    /// Add error context to a Result
    ///
    /// # Errors
    ///
    /// Propagates the original error with additional context applied
    fn with_context(self, context: ErrorContext) -> Result<T>;

    /// Attach the path and operation of a filesystem call
    ///
    /// # Errors
    ///
    /// Propagates the original error with the path and operation applied
    fn with_path(self, path: &Path, operation: &'static str) -> Result<T>;
}

impl<T, E> WithContext<T> for std::result::Result<T, E>
where
    E: Into<MosaicError>,
{
    fn with_context(self, context: ErrorContext) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            // Only errors converted without location info get rewritten
            match &mut error {
                MosaicError::FileSystem {
                    path, operation, ..
                } => {
                    if let Some(ctx_path) = &context.path {
                        path.clone_from(ctx_path);
                    }
                    if let Some(op) = context.operation {
                        *operation = op;
                    }
                }
                MosaicError::ImageLoad { path, .. } => {
                    if let Some(ctx_path) = &context.path {
                        path.clone_from(ctx_path);
                    }
                }
                _ => {}
            }
            error
        })
    }

    fn with_path(self, path: &Path, operation: &'static str) -> Result<T> {
        self.with_context(ErrorContext {
            path: Some(path.to_path_buf()),
            operation: Some(operation),
        })
    }
}

impl From<image::ImageError> for MosaicError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for MosaicError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> MosaicError {
    MosaicError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a corrupt chunk error
pub fn corrupt_chunk(path: &Path, reason: &impl ToString) -> MosaicError {
    MosaicError::CorruptChunk {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
