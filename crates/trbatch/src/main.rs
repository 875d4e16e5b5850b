//! trbatch - subject-list generation for the downstream processing pipeline.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use trbatch::{pipeline, RunConfig};

#[derive(Parser)]
#[command(name = "trbatch")]
#[command(about = "Batch scan subjects by repetition time for pipeline setup", long_about = None)]
#[command(version)]
struct Cli {
    /// Clear the output directory and force a full re-extraction
    #[arg(short, long)]
    rewrite: bool,

    /// Path to a TOML config file (default: ./trbatch.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let config = RunConfig::load(cli.config.as_deref())?;
    pipeline::run(&config, cli.rewrite)?;

    info!("Completed");
    Ok(())
}
