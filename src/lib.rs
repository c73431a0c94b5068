//! Photomosaic construction from a folder of candidate pictures
//!
//! Candidate pictures are reduced to fixed-size tiles with an average colour,
//! persisted in bounded chunks so later runs can reuse them, and matched
//! against the cells of a source picture by colour distance.

#![forbid(unsafe_code)]

/// Building, loading and reusing the persisted tile corpus
pub mod corpus;
/// Input/output operations and error handling
pub mod io;
/// Colour distance strategies and tile selection
pub mod matching;
/// Cell-by-cell assembly of the mosaic
pub mod mosaic;
/// Chunk files, descriptor and folder layout on disk
pub mod store;
/// Decoding pictures into tiles
pub mod tile;

pub use io::error::{MosaicError, Result};
