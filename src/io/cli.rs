//! Command-line interface for turning a picture into a photomosaic

use crate::corpus::builder::{BuilderConfig, CorpusBuilder};
use crate::corpus::reuse::{Confirm, FixedAnswer, Requirement, ReusePolicy, ReusePrompt};
use crate::io::configuration::{CANONICAL_TILE_HEIGHT, MAX_CHUNK_SIZE};
use crate::io::error::{Result, invalid_parameter};
use crate::io::image::export_mosaic;
use crate::io::progress::ProgressManager;
use crate::matching::matcher::ColorMatcher;
use crate::matching::strategy::MatchStrategy;
use crate::mosaic::assembler::MosaicAssembler;
use crate::tile::codec::decode_path;
use clap::Parser;
use std::io::{BufRead, Stderr, StdinLock, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "mosaictile")]
#[command(
    author,
    version,
    about = "Rebuild a picture out of a folder of smaller pictures"
)]
/// Command-line arguments for the mosaic tool
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Picture to rebuild as a mosaic
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Edge length in pixels of each mosaic cell
    #[arg(value_name = "SIZE")]
    pub size: u32,

    /// Folder of candidate tile pictures
    #[arg(value_name = "FOLDER")]
    pub folder: PathBuf,

    /// Output path prefix; suffixes and the extension are appended
    #[arg(value_name = "DEST")]
    pub dest: PathBuf,

    /// Allow the same tile to appear in several cells
    #[arg(short, long)]
    pub repeat: bool,

    /// Colour matching strategy
    #[arg(short, long, value_enum, default_value_t = MatchStrategy::Euclidean)]
    pub method: MatchStrategy,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Accept an existing corpus without asking when counts disagree
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Rebuild the corpus even if one exists
    #[arg(long)]
    pub rebuild: bool,

    /// Ask before reusing a corpus even when file counts match
    #[arg(long)]
    pub no_trust: bool,

    /// Load at most this many chunks
    #[arg(long, value_name = "N")]
    pub max_chunks: Option<usize>,

    /// Maximum number of tiles per chunk
    #[arg(long, value_name = "N", default_value_t = MAX_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Edge length tiles are stored at
    #[arg(long, value_name = "N", default_value_t = CANONICAL_TILE_HEIGHT)]
    pub canonical_size: u32,

    /// Only write the mosaic, skipping the blended variants
    #[arg(long)]
    pub no_blend: bool,
}

impl Cli {
    /// Corpus settings derived from the flags
    pub const fn builder_config(&self) -> BuilderConfig {
        BuilderConfig {
            max_chunk_size: self.chunk_size,
            canonical_width: self.canonical_size,
            canonical_height: self.canonical_size,
            max_chunks: self.max_chunks,
            reuse: ReusePolicy {
                trust_matching_counts: !self.no_trust,
            },
            force_rebuild: self.rebuild,
        }
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Asks on a terminal whether an existing corpus should be reused
///
/// Reads answers from `input` and writes the question to `output`; the
/// default instance uses stdin and stderr.
pub struct TerminalConfirm<R = StdinLock<'static>, W = Stderr> {
    input: R,
    output: W,
}

impl TerminalConfirm {
    /// Prompt on stderr and read answers from stdin
    pub fn new() -> Self {
        Self::with_streams(std::io::stdin().lock(), std::io::stderr())
    }
}

impl Default for TerminalConfirm {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: BufRead, W: Write> TerminalConfirm<R, W> {
    /// Prompt on `output` and read answers from `input`
    pub const fn with_streams(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for TerminalConfirm<R, W> {
    fn confirm(&mut self, prompt: &ReusePrompt) -> bool {
        let mut answer = String::new();

        loop {
            if let Err(e) = write!(
                self.output,
                "The corpus was built from {} files ({} tiles) but the folder now holds {}. \
                 Use the existing corpus? [y/n] ",
                prompt.corpus_files, prompt.corpus_tiles, prompt.folder_files
            ) {
                warn!("could not show reuse question, rebuilding: {e}");
                return false;
            }
            if let Err(e) = self.output.flush() {
                debug!("could not flush reuse question: {e}");
            }

            answer.clear();
            match self.input.read_line(&mut answer) {
                // Closed input counts as a refusal
                Ok(0) | Err(_) => return false,
                Ok(_) => {}
            }

            match answer.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => return true,
                "n" | "no" => return false,
                _ => {}
            }
        }
    }
}

/// Runs one mosaic job end to end
pub struct MosaicProcessor {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl MosaicProcessor {
    /// Create a processor for the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Arguments this processor runs with
    pub const fn cli(&self) -> &Cli {
        &self.cli
    }

    /// Build or reuse the corpus, assemble the mosaic and write every output
    ///
    /// Returns the paths written.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The cell size is zero or larger than the source picture
    /// - The source picture cannot be decoded
    /// - The corpus cannot be built or holds too few tiles
    /// - An output file cannot be written
    pub fn process(&self) -> Result<Vec<PathBuf>> {
        let start_time = Instant::now();
        let size = self.cli.size;

        let assembler = MosaicAssembler::new(size)?;
        let source = decode_path(&self.cli.source)?;
        if size > source.width() || size > source.height() {
            return Err(invalid_parameter(
                "size",
                &size,
                &format!(
                    "larger than the {}x{} source picture",
                    source.width(),
                    source.height()
                ),
            ));
        }

        let pieces = assembler.pieces_required(source.width(), source.height());
        let requirement = Requirement::new(self.cli.repeat, pieces);

        let mut builder = CorpusBuilder::new(&self.cli.folder, self.cli.builder_config());
        if let Some(pm) = &self.progress_manager {
            builder = builder.with_progress(pm.clone());
        }

        let corpus = if self.cli.yes {
            builder.obtain(size, size, requirement, &mut FixedAnswer(true))?
        } else {
            builder.obtain(size, size, requirement, &mut TerminalConfirm::new())?
        };
        info!(tiles = corpus.len(), pieces, "corpus ready");

        let mut matcher = ColorMatcher::new(corpus, self.cli.method);
        let assembler = match &self.progress_manager {
            Some(pm) => assembler.with_progress(pm.clone()),
            None => assembler,
        };
        let mosaic = assembler.assemble(&source, &mut matcher, self.cli.repeat)?;

        let written = export_mosaic(
            &source.to_rgb8(),
            &mosaic,
            &self.cli.dest,
            self.cli.repeat,
            !self.cli.no_blend,
        )?;

        if let Some(pm) = &self.progress_manager {
            pm.finish();
        }

        info!(
            outputs = written.len(),
            elapsed_ms = start_time.elapsed().as_millis(),
            "mosaic complete"
        );
        Ok(written)
    }
}
