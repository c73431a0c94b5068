//! Input/output, configuration and error handling
//!
//! This module contains:
//! - The command-line front end and its terminal confirmation prompt
//! - Layout constants and defaults
//! - The crate-wide error type
//! - Mosaic and blend export
//! - Progress bars for builds, loads and assembly

/// Argument parsing and the end-to-end mosaic job
pub mod cli;
/// Constants and defaults
pub mod configuration;
/// Error type and context helpers
pub mod error;
/// Writing mosaics and blends to disk
pub mod image;
/// Terminal progress display
pub mod progress;
