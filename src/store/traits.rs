//! Store trait and error types

use crate::store::{FrontierItem, ReviewRecord, TitleRecord};
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Title not found: {0}")]
    TitleNotFound(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable storage for titles, reviews, and the crawl frontier
///
/// Implementations are single-writer: exactly one crawl controller holds the
/// store at a time. Duplicate inserts (frontier slugs, review fingerprints)
/// are expected, frequent events and must be no-ops rather than errors.
pub trait Store {
    // ===== Titles =====

    /// Inserts a title record, or overwrites all fields of an existing row
    ///
    /// The first insert stamps `first_seen`; later writes stamp `updated_at`.
    fn upsert_title(&mut self, record: &TitleRecord) -> StoreResult<()>;

    /// Existence-only dedup gate; never inspects field contents
    fn title_exists(&self, slug: &str) -> StoreResult<bool>;

    /// Loads a title record by slug
    fn get_title(&self, slug: &str) -> StoreResult<Option<TitleRecord>>;

    /// Total stored titles
    fn count_titles(&self) -> StoreResult<u64>;

    /// Number of titles with at least one empty/zero field
    fn count_incomplete(&self) -> StoreResult<u64>;

    /// Slugs of titles with at least one empty/zero field
    fn find_incomplete(&self) -> StoreResult<Vec<String>>;

    // ===== Reviews =====

    /// Inserts a review unless its fingerprint is already stored
    ///
    /// Returns true if a row was inserted, false on a duplicate.
    fn insert_review(&mut self, review: &ReviewRecord) -> StoreResult<bool>;

    /// Whether a review with this fingerprint is stored
    fn review_exists(&self, fingerprint: &str) -> StoreResult<bool>;

    /// Total stored reviews
    fn count_reviews(&self) -> StoreResult<u64>;

    // ===== Frontier =====

    /// Enqueues a slug with a fresh monotonic priority
    ///
    /// A no-op if the slug is already queued. Returns true if inserted.
    fn push_frontier(&mut self, slug: &str) -> StoreResult<bool>;

    /// Re-enqueues a slug below everything currently live
    ///
    /// Used after a page-load failure; `attempts` carries the retry count.
    fn requeue_frontier(&mut self, slug: &str, attempts: u32) -> StoreResult<()>;

    /// Atomically removes and returns up to `n` entries, highest priority
    /// (most recently enqueued) first
    fn pop_frontier_batch(&mut self, n: usize) -> StoreResult<Vec<FrontierItem>>;

    /// Current frontier size
    fn frontier_len(&self) -> StoreResult<u64>;

    /// Unconditionally empties the frontier
    fn clear_frontier(&mut self) -> StoreResult<()>;
}
