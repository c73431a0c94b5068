//! Durable corpus storage
//!
//! This module contains:
//! - The folder layout shared by every persisted corpus
//! - Write-once chunk files holding bounded batches of raw tiles
//! - The descriptor recording where a corpus came from

/// Bincode chunk files and their slot bookkeeping
pub mod chunk;
/// JSON descriptor used for reuse decisions
pub mod descriptor;
/// Folder naming and filename sanitising
pub mod layout;

pub use chunk::{ChunkStore, RawTile};
pub use descriptor::DatabaseDescriptor;
pub use layout::CorpusLayout;
