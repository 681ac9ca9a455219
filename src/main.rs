//! Shelfmap main entry point
//!
//! Command-line interface for the shelfmap catalog crawler.

use anyhow::Context;
use clap::{Parser, Subcommand};
use shelfmap::config::load_config_with_hash;
use shelfmap::crawler::{build_controller, run_repair, CrawlOptions};
use shelfmap::stats::{load_status, print_status};
use shelfmap::store::SqliteStore;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tracing_subscriber::EnvFilter;

/// Shelfmap: an incremental catalog-graph crawler
#[derive(Parser, Debug)]
#[command(name = "shelfmap")]
#[command(version)]
#[command(about = "Crawls a catalog site's review graph into SQLite", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full crawl loop until the target count is met
    Crawl {
        /// Stop after this many titles have been processed
        #[arg(long, default_value_t = 100)]
        target: u64,

        /// Frontier entries drained per batch (overrides config)
        #[arg(long)]
        batch_size: Option<u32>,

        /// Frontier size bound for expansion (overrides config)
        #[arg(long)]
        max_frontier: Option<u64>,
    },

    /// Process the existing frontier only; no seeding, no expansion
    Drain {
        /// Frontier entries drained per batch (overrides config)
        #[arg(long)]
        batch_size: Option<u32>,
    },

    /// Re-fetch incomplete records and fill in their missing fields
    Repair {
        /// Records visited per chunk
        #[arg(long, default_value_t = 10)]
        batch_size: u32,

        /// Upper bound on records visited in this pass
        #[arg(long, default_value_t = 100)]
        max_items: u32,
    },

    /// Show frontier and record counts
    Status,

    /// Empty the frontier (administrative reset)
    ClearFrontier,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) =
        load_config_with_hash(&cli.config).context("failed to load configuration")?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    match cli.command {
        Command::Crawl {
            target,
            batch_size,
            max_frontier,
        } => {
            let opts = CrawlOptions {
                target,
                batch_size: batch_size.unwrap_or(config.crawler.batch_size) as usize,
                max_frontier_size: max_frontier.unwrap_or(config.crawler.max_frontier_size),
            };

            let mut controller = build_controller(config)?;
            install_stop_handler(controller.stop_handle());

            let outcome = controller.run(&opts).await?;
            println!(
                "Crawl finished: {} processed, {} abandoned{}",
                outcome.processed,
                outcome.abandoned,
                if outcome.stopped { " (stopped)" } else { "" }
            );
        }

        Command::Drain { batch_size } => {
            let batch_size = batch_size.unwrap_or(config.crawler.batch_size) as usize;

            let mut controller = build_controller(config)?;
            install_stop_handler(controller.stop_handle());

            let outcome = controller.drain(batch_size).await?;
            println!(
                "Drain finished: {} processed, {} abandoned{}",
                outcome.processed,
                outcome.abandoned,
                if outcome.stopped { " (stopped)" } else { "" }
            );
        }

        Command::Repair {
            batch_size,
            max_items,
        } => {
            let outcome = run_repair(config, batch_size as usize, max_items as usize).await?;
            println!(
                "Repair finished: {} examined, {} patched, {} failed",
                outcome.examined, outcome.patched, outcome.failed
            );
        }

        Command::Status => {
            let store = SqliteStore::new(Path::new(&config.output.database_path))?;
            let status = load_status(&store)?;
            print_status(&status);
        }

        Command::ClearFrontier => {
            use shelfmap::store::Store;
            let mut store = SqliteStore::new(Path::new(&config.output.database_path))?;
            store.clear_frontier()?;
            println!("Frontier cleared");
        }
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelfmap=info,warn"),
            1 => EnvFilter::new("shelfmap=debug,info"),
            2 => EnvFilter::new("shelfmap=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Raises the controller's stop flag on Ctrl-C
///
/// The crawl loop honors the flag between records and requeues anything
/// popped but not yet processed.
fn install_stop_handler(stop: std::sync::Arc<std::sync::atomic::AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Stop requested, finishing current record");
            stop.store(true, Ordering::Relaxed);
        }
    });
}
