//! Nearest-colour matching over a loaded corpus

/// Sparse exact-colour buckets for the approximate strategy
pub mod index;
/// Working set and per-query tile selection
pub mod matcher;
/// Distance functions and strategy selection
pub mod strategy;

pub use matcher::ColorMatcher;
pub use strategy::MatchStrategy;
