//! Two-level progress display for corpus builds, corpus loads and mosaic assembly

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static PHASE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] {{prefix}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

static ITEM_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:30.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Coordinates an outer phase bar (chunks or cells) and an inner item bar (files)
///
/// All methods take `&self`, so the manager can be shared with the rayon
/// workers decoding a chunk.
#[derive(Clone)]
pub struct ProgressManager {
    multi_progress: MultiProgress,
    phase_bar: ProgressBar,
    item_bar: ProgressBar,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create a manager with both bars registered
    pub fn new() -> Self {
        let multi_progress = MultiProgress::new();
        let phase_bar = multi_progress.add(ProgressBar::new(0));
        phase_bar.set_style(PHASE_STYLE.clone());
        let item_bar = multi_progress.add(ProgressBar::new(0));
        item_bar.set_style(ITEM_STYLE.clone());

        Self {
            multi_progress,
            phase_bar,
            item_bar,
        }
    }

    /// Start a corpus build over `total_chunks` chunks
    pub fn begin_build(&self, total_chunks: usize) {
        self.begin_phase("Building chunks", total_chunks);
    }

    /// Start decoding the files of chunk `slot`
    pub fn begin_chunk(&self, slot: usize, files: usize) {
        self.item_bar.reset();
        self.item_bar.set_length(files as u64);
        self.item_bar.set_message(format!("chunk {}", slot + 1));
    }

    /// Record one decoded (or skipped) file
    pub fn advance_item(&self) {
        self.item_bar.inc(1);
    }

    /// Record one finished chunk or cell
    pub fn advance_phase(&self) {
        self.phase_bar.inc(1);
    }

    /// Start loading `total_chunks` chunks from disk
    pub fn begin_load(&self, total_chunks: usize) {
        self.begin_phase("Loading chunks", total_chunks);
    }

    /// Start placing `cells` mosaic cells
    pub fn begin_cells(&self, cells: usize) {
        self.begin_phase("Placing tiles", cells);
    }

    /// Current position of the outer bar
    pub fn phase_position(&self) -> u64 {
        self.phase_bar.position()
    }

    /// Current position of the inner bar
    pub fn item_position(&self) -> u64 {
        self.item_bar.position()
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        self.item_bar.finish_and_clear();
        self.phase_bar.finish_with_message("done");
        let _ = self.multi_progress.clear();
    }

    fn begin_phase(&self, label: &'static str, length: usize) {
        self.phase_bar.reset();
        self.phase_bar.set_length(length as u64);
        self.phase_bar.set_prefix(label);
        self.item_bar.reset();
        self.item_bar.set_length(0);
    }
}
