//! Persistent record store
//!
//! This module owns everything durable: extracted title records, deduped
//! review records, and the crawl frontier. All three live in one SQLite
//! database behind the [`Store`] trait; the crawler is the single writer.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{Store, StoreError, StoreResult};

use sha2::{Digest, Sha256};

/// List fields holding plain tags are comma-joined on disk; name lists use a
/// pipe because names may contain commas.
pub const TAG_DELIMITER: char = ',';
pub const NAME_DELIMITER: char = '|';

/// A frontier entry awaiting extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierItem {
    /// Stable identifier for the title (URL slug)
    pub slug: String,

    /// Enqueue-time priority; higher pops first
    pub priority: i64,

    /// Number of times this slug was requeued after a load failure
    pub attempts: u32,
}

/// A fully- or partially-extracted catalog title
///
/// A record is complete when every field is non-empty/non-zero. Partial
/// records are legitimate output: the repair pass fills them in later.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleRecord {
    pub slug: String,
    pub title: String,
    pub year: i64,
    pub ratings_count: i64,
    pub score: f64,
    pub synopsis: String,
    pub genres: Vec<String>,
    pub themes: Vec<String>,
    pub authors: Vec<String>,
    pub characters: Vec<String>,
}

impl TitleRecord {
    /// Names of the fields still holding their zero-value default
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.is_empty() {
            missing.push("title");
        }
        if self.year == 0 {
            missing.push("year");
        }
        if self.ratings_count == 0 {
            missing.push("ratings_count");
        }
        if self.score == 0.0 {
            missing.push("score");
        }
        if self.synopsis.is_empty() {
            missing.push("synopsis");
        }
        if self.genres.is_empty() {
            missing.push("genres");
        }
        if self.themes.is_empty() {
            missing.push("themes");
        }
        if self.authors.is_empty() {
            missing.push("authors");
        }
        if self.characters.is_empty() {
            missing.push("characters");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Fills empty/zero fields from `fresh`, never touching populated ones
    ///
    /// Returns true if any field changed.
    pub fn merge_missing(&mut self, fresh: &TitleRecord) -> bool {
        let mut changed = false;

        if self.title.is_empty() && !fresh.title.is_empty() {
            self.title = fresh.title.clone();
            changed = true;
        }
        if self.year == 0 && fresh.year != 0 {
            self.year = fresh.year;
            changed = true;
        }
        if self.ratings_count == 0 && fresh.ratings_count != 0 {
            self.ratings_count = fresh.ratings_count;
            changed = true;
        }
        if self.score == 0.0 && fresh.score != 0.0 {
            self.score = fresh.score;
            changed = true;
        }
        if self.synopsis.is_empty() && !fresh.synopsis.is_empty() {
            self.synopsis = fresh.synopsis.clone();
            changed = true;
        }
        if self.genres.is_empty() && !fresh.genres.is_empty() {
            self.genres = fresh.genres.clone();
            changed = true;
        }
        if self.themes.is_empty() && !fresh.themes.is_empty() {
            self.themes = fresh.themes.clone();
            changed = true;
        }
        if self.authors.is_empty() && !fresh.authors.is_empty() {
            self.authors = fresh.authors.clone();
            changed = true;
        }
        if self.characters.is_empty() && !fresh.characters.is_empty() {
            self.characters = fresh.characters.clone();
            changed = true;
        }

        changed
    }
}

/// One review by one reviewer of one title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
    pub reviewer: String,
    pub title_slug: String,
    pub rating: Option<i64>,
    pub body: String,
    /// Deterministic hash over (reviewer, slug, rating, normalized body);
    /// the sole dedup key for reviews.
    pub fingerprint: String,
}

impl ReviewRecord {
    pub fn new(reviewer: &str, title_slug: &str, rating: Option<i64>, body: &str) -> Self {
        Self {
            reviewer: reviewer.to_string(),
            title_slug: title_slug.to_string(),
            rating,
            body: body.to_string(),
            fingerprint: compute_fingerprint(reviewer, title_slug, rating, body),
        }
    }
}

/// Computes the content fingerprint for a review
///
/// Body text is normalized (trimmed, internal whitespace collapsed) so that
/// markup-level reformatting between crawls does not defeat deduplication.
pub fn compute_fingerprint(
    reviewer: &str,
    title_slug: &str,
    rating: Option<i64>,
    body: &str,
) -> String {
    let normalized: String = body.split_whitespace().collect::<Vec<_>>().join(" ");
    let rating_part = match rating {
        Some(r) => r.to_string(),
        None => "-".to_string(),
    };

    let mut hasher = Sha256::new();
    hasher.update(reviewer.as_bytes());
    hasher.update(b"\n");
    hasher.update(title_slug.as_bytes());
    hasher.update(b"\n");
    hasher.update(rating_part.as_bytes());
    hasher.update(b"\n");
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

/// Joins a list field for storage in a single text column
pub(crate) fn join_list(values: &[String], delimiter: char) -> String {
    values.join(&delimiter.to_string())
}

/// Splits a stored text column back into a list field
pub(crate) fn split_list(stored: &str, delimiter: char) -> Vec<String> {
    if stored.is_empty() {
        return Vec::new();
    }
    stored
        .split(delimiter)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
