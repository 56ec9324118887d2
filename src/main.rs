//! Transcript Harvester main entry point
//!
//! This is the command-line interface for the transcript harvester.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use transcript_harvester::config::{load_config_with_hash, validate, Config};
use transcript_harvester::output::print_summary;
use transcript_harvester::pipeline::Pipeline;
use tracing_subscriber::EnvFilter;

/// Transcript Harvester: bulk, resumable transcript downloader
///
/// Discovers every collection on the content server, lists its items, and
/// saves each item's transcript to `<root>/<collection>/<item>.txt`. Files
/// already on disk (including empty ones) are never fetched again, so an
/// interrupted run can simply be restarted.
#[derive(Parser, Debug)]
#[command(name = "transcript-harvester")]
#[command(version)]
#[command(about = "Bulk, resumable transcript downloader", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the output root directory
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Discover and resolve only; report what would be downloaded
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("loading {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(dir) = cli.output_dir {
        config.output.root_dir = dir.to_string_lossy().into_owned();
        validate(&config)?;
    }

    let pipeline = Pipeline::new(config)?;

    if cli.dry_run {
        handle_dry_run(&pipeline).await
    } else {
        handle_harvest(&pipeline).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("transcript_harvester=info,warn"),
            1 => EnvFilter::new("transcript_harvester=debug,info"),
            2 => EnvFilter::new("transcript_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --dry-run: builds the manifest and runs the dedup pass only
async fn handle_dry_run(pipeline: &Pipeline) -> anyhow::Result<()> {
    let manifest = pipeline.build_manifest().await;
    let plan = pipeline.plan(&manifest).await;

    println!("=== Transcript Harvester Dry Run ===\n");
    println!("Source: {}", pipeline.config().source.base_url);
    println!("Output: {}", pipeline.store().root().display());
    println!();
    println!("Collections resolved: {}", manifest.len());
    println!("Items listed:         {}", plan.total());
    println!("  Already on disk:    {}", plan.skipped.len());
    println!("  Would download:     {}", plan.pending.len());

    Ok(())
}

/// Handles the full harvest
async fn handle_harvest(pipeline: &Pipeline) -> anyhow::Result<()> {
    let report = pipeline.run().await?;
    print_summary(&report);
    Ok(())
}
