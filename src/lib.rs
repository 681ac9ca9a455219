//! Shelfmap: an incremental catalog-graph crawler
//!
//! This crate crawls a public catalog site outward from its listing pages,
//! following the review graph (titles -> reviewers -> more titles) through a
//! durable, deduplicated frontier, and stores extracted records in SQLite.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod fetch;
pub mod stats;
pub mod store;

use thiserror::Error;

/// Main error type for shelfmap operations
#[derive(Debug, Error)]
pub enum ShelfmapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] fetch::FetchError),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Seed listing page {page} failed to load: {source}")]
    SeedPage {
        page: u64,
        source: fetch::FetchError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for shelfmap operations
pub type Result<T> = std::result::Result<T, ShelfmapError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Controller, CrawlOptions};
pub use fetch::{Document, Fetch, HttpFetcher};
pub use store::{FrontierItem, ReviewRecord, SqliteStore, Store, TitleRecord};
