//! Mosaic composition from matched tiles

/// Cell iteration, tile placement and blending
pub mod assembler;

pub use assembler::MosaicAssembler;
