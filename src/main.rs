//! CLI entry point for the photomosaic builder

use clap::Parser;
use mosaictile::io::cli::{Cli, MosaicProcessor};
use tracing_subscriber::EnvFilter;

fn main() -> mosaictile::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let processor = MosaicProcessor::new(cli);
    processor.process()?;
    Ok(())
}
