//! Crawl orchestration
//!
//! This module contains the crawl controller (the SEEDING / DRAINING /
//! EXPANDING / TERMINATED loop) and the repair pass that reconciles
//! partially-extracted records.

mod controller;
mod repair;

pub use controller::{Controller, CrawlOptions, CrawlOutcome, Phase};
pub use repair::{repair, RepairOutcome};

use crate::config::Config;
use crate::fetch::HttpFetcher;
use crate::store::SqliteStore;
use crate::Result;
use std::path::Path;

/// Builds a controller wired to the configured database and HTTP fetcher
pub fn build_controller(config: Config) -> Result<Controller<HttpFetcher>> {
    let store = SqliteStore::new(Path::new(&config.output.database_path))?;
    let fetcher = HttpFetcher::new(&config.user_agent, &config.crawler)?;
    Ok(Controller::new(config, store, fetcher))
}

/// Runs a complete crawl with the given options
pub async fn run_crawl(config: Config, opts: &CrawlOptions) -> Result<CrawlOutcome> {
    let mut controller = build_controller(config)?;
    controller.run(opts).await
}

/// Drains the existing frontier without seeding or expansion
pub async fn run_drain(config: Config, batch_size: usize) -> Result<CrawlOutcome> {
    let mut controller = build_controller(config)?;
    controller.drain(batch_size).await
}

/// Runs a repair pass over incomplete records
pub async fn run_repair(
    config: Config,
    batch_size: usize,
    max_items: usize,
) -> Result<RepairOutcome> {
    let mut store = SqliteStore::new(Path::new(&config.output.database_path))?;
    let fetcher = HttpFetcher::new(&config.user_agent, &config.crawler)?;
    repair(&config, &mut store, &fetcher, batch_size, max_items).await
}
