//! Corpus construction, loading and reuse decisions

/// Chunked build, resume and load of a source folder
pub mod builder;
/// Whether an existing corpus may serve a new run
pub mod reuse;

pub use builder::{BuildSummary, BuilderConfig, Corpus, CorpusBuilder};
pub use reuse::{Confirm, FixedAnswer, Requirement, ReuseDecision, ReusePolicy};
