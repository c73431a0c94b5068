//! Corpus layout constants and runtime configuration defaults

// Corpus construction
/// Maximum number of tiles persisted together in one chunk
pub const MAX_CHUNK_SIZE: usize = 2000;

/// Width tiles are stored at; requests up to this size are served by downscaling
pub const CANONICAL_TILE_WIDTH: u32 = 100;
/// Height tiles are stored at
pub const CANONICAL_TILE_HEIGHT: u32 = 100;

/// File extensions recognised as candidate tile images (compared lowercase)
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp"];

// Changing anything below invalidates previously built corpora
/// Suffix appended to the source folder to name its corpus folder
pub const CORPUS_FOLDER_SUFFIX: &str = "data";
/// Sub-folder of the corpus folder holding chunk files
pub const IMAGES_FOLDER: &str = "images";
/// Descriptor file name inside the corpus folder
pub const DESCRIPTOR_FILE: &str = "database.json";
/// Extension of chunk files
pub const CHUNK_EXTENSION: &str = "data";
/// Version tag written into every chunk and descriptor
pub const FORMAT_VERSION: u32 = 1;

// Reuse policy
/// Reuse an existing corpus without asking when its file count matches the folder
pub const DEFAULT_TRUST_MATCHING_COUNTS: bool = true;

// Matching
/// Number of distinct positions per colour axis in the bucketed index
pub const COLOR_AXIS_SIZE: usize = 256;

// Output settings
/// Suffix of the unblended mosaic written for runs that allow repeats
pub const REPEAT_SUFFIX: &str = "_background_repeat";
/// Suffix of the unblended mosaic written for runs without repeats
pub const NO_REPEAT_SUFFIX: &str = "_background_no_repeat";
/// Number of blended variants written (alpha 0.0, 0.1, ...)
pub const BLEND_STEPS: u32 = 10;
/// Extension of every written image
pub const OUTPUT_EXTENSION: &str = "jpg";

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;
