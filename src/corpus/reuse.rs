//! Reuse-or-rebuild decision for a previously built corpus

use crate::io::configuration::DEFAULT_TRUST_MATCHING_COUNTS;
use crate::store::descriptor::DatabaseDescriptor;
use tracing::info;

/// Outcome of comparing a persisted corpus with the current source folder
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReuseDecision {
    /// Load the existing chunks
    Reuse,
    /// Discard the existing corpus and build again
    Rebuild,
}

/// Knobs controlling when an existing corpus may be reused
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReusePolicy {
    /// Reuse silently when the recorded file count equals the folder's current count
    pub trust_matching_counts: bool,
}

impl Default for ReusePolicy {
    fn default() -> Self {
        Self {
            trust_matching_counts: DEFAULT_TRUST_MATCHING_COUNTS,
        }
    }
}

/// What a mosaic run needs from its corpus
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Requirement {
    /// Whether tiles may be placed more than once
    pub repeat: bool,
    /// Number of cells to fill
    pub pieces: usize,
}

impl Requirement {
    /// Requirement for a run that fills `pieces` cells
    pub const fn new(repeat: bool, pieces: usize) -> Self {
        Self { repeat, pieces }
    }

    /// Minimum number of tiles the corpus must hold
    pub const fn required_tiles(self) -> usize {
        if self.repeat {
            if self.pieces == 0 { 0 } else { 1 }
        } else {
            self.pieces
        }
    }

    /// Whether `available` tiles are enough
    pub const fn is_met_by(self, available: usize) -> bool {
        available >= self.required_tiles()
    }
}

/// Facts shown to whoever confirms a reuse the engine cannot decide alone
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReusePrompt {
    /// Candidate files the corpus was built from
    pub corpus_files: usize,
    /// Tiles the corpus holds
    pub corpus_tiles: usize,
    /// Candidate files currently in the source folder
    pub folder_files: usize,
}

/// External accept/reject collaborator consulted when counts disagree
pub trait Confirm {
    /// Return `true` to reuse the existing corpus
    fn confirm(&mut self, prompt: &ReusePrompt) -> bool;
}

/// Answers every prompt the same way, for non-interactive runs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&mut self, _prompt: &ReusePrompt) -> bool {
        self.0
    }
}

/// Decide whether the corpus described by `descriptor` can serve this run
///
/// The corpus is rebuilt when its build never completed or it is too small
/// for a run without repeats. Matching file counts are trusted when the policy
/// allows it; any other case is handed to `confirm`.
pub fn decide_reuse(
    descriptor: &DatabaseDescriptor,
    folder_files: usize,
    requirement: Requirement,
    policy: &ReusePolicy,
    confirm: &mut dyn Confirm,
) -> ReuseDecision {
    if !descriptor.complete {
        info!("existing corpus build was interrupted");
        return ReuseDecision::Rebuild;
    }

    if !requirement.is_met_by(descriptor.tile_count) {
        info!(
            available = descriptor.tile_count,
            required = requirement.required_tiles(),
            "existing corpus does not contain enough tiles"
        );
        return ReuseDecision::Rebuild;
    }

    if descriptor.source_file_count == folder_files && policy.trust_matching_counts {
        info!(
            files = folder_files,
            "existing corpus is coherent with the source folder"
        );
        return ReuseDecision::Reuse;
    }

    let prompt = ReusePrompt {
        corpus_files: descriptor.source_file_count,
        corpus_tiles: descriptor.tile_count,
        folder_files,
    };
    if confirm.confirm(&prompt) {
        ReuseDecision::Reuse
    } else {
        ReuseDecision::Rebuild
    }
}
