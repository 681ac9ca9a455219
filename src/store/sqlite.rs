//! SQLite store implementation

use crate::store::schema::initialize_schema;
use crate::store::traits::{Store, StoreResult};
use crate::store::{
    join_list, split_list, FrontierItem, ReviewRecord, TitleRecord, NAME_DELIMITER, TAG_DELIMITER,
};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Predicate selecting titles with at least one empty/zero field
const INCOMPLETE_WHERE: &str = "title = '' OR year = 0 OR ratings_count = 0 OR score = 0 \
     OR synopsis = '' OR genres = '' OR themes = '' OR authors = '' OR characters = ''";

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn row_to_title(row: &rusqlite::Row<'_>) -> rusqlite::Result<TitleRecord> {
        Ok(TitleRecord {
            slug: row.get(0)?,
            title: row.get(1)?,
            year: row.get(2)?,
            ratings_count: row.get(3)?,
            score: row.get(4)?,
            synopsis: row.get(5)?,
            genres: split_list(&row.get::<_, String>(6)?, TAG_DELIMITER),
            themes: split_list(&row.get::<_, String>(7)?, TAG_DELIMITER),
            authors: split_list(&row.get::<_, String>(8)?, NAME_DELIMITER),
            characters: split_list(&row.get::<_, String>(9)?, NAME_DELIMITER),
        })
    }
}

impl Store for SqliteStore {
    // ===== Titles =====

    fn upsert_title(&mut self, record: &TitleRecord) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO titles
                 (slug, title, year, ratings_count, score, synopsis,
                  genres, themes, authors, characters, first_seen)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(slug) DO UPDATE SET
                 title = excluded.title,
                 year = excluded.year,
                 ratings_count = excluded.ratings_count,
                 score = excluded.score,
                 synopsis = excluded.synopsis,
                 genres = excluded.genres,
                 themes = excluded.themes,
                 authors = excluded.authors,
                 characters = excluded.characters,
                 updated_at = ?11",
            params![
                record.slug,
                record.title,
                record.year,
                record.ratings_count,
                record.score,
                record.synopsis,
                join_list(&record.genres, TAG_DELIMITER),
                join_list(&record.themes, TAG_DELIMITER),
                join_list(&record.authors, NAME_DELIMITER),
                join_list(&record.characters, NAME_DELIMITER),
                now,
            ],
        )?;
        Ok(())
    }

    fn title_exists(&self, slug: &str) -> StoreResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM titles WHERE slug = ?1",
                params![slug],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn get_title(&self, slug: &str) -> StoreResult<Option<TitleRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT slug, title, year, ratings_count, score, synopsis,
                    genres, themes, authors, characters
             FROM titles WHERE slug = ?1",
        )?;

        let record = stmt
            .query_row(params![slug], Self::row_to_title)
            .optional()?;

        Ok(record)
    }

    fn count_titles(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM titles", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_incomplete(&self) -> StoreResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM titles WHERE {}", INCOMPLETE_WHERE),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn find_incomplete(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT slug FROM titles WHERE {} ORDER BY slug",
            INCOMPLETE_WHERE
        ))?;

        let slugs = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(slugs)
    }

    // ===== Reviews =====

    fn insert_review(&mut self, review: &ReviewRecord) -> StoreResult<bool> {
        let now = Utc::now().to_rfc3339();
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO reviews
                 (reviewer, title_slug, rating, body, fingerprint, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                review.reviewer,
                review.title_slug,
                review.rating,
                review.body,
                review.fingerprint,
                now,
            ],
        )?;
        Ok(inserted > 0)
    }

    fn review_exists(&self, fingerprint: &str) -> StoreResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM reviews WHERE fingerprint = ?1",
                params![fingerprint],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn count_reviews(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM reviews", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Frontier =====

    fn push_frontier(&mut self, slug: &str) -> StoreResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO frontier (slug, priority, attempts)
             VALUES (?1, COALESCE((SELECT MAX(priority) FROM frontier), 0) + 1, 0)",
            params![slug],
        )?;
        Ok(inserted > 0)
    }

    fn requeue_frontier(&mut self, slug: &str, attempts: u32) -> StoreResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO frontier (slug, priority, attempts)
             VALUES (?1, COALESCE((SELECT MIN(priority) FROM frontier), 0) - 1, ?2)",
            params![slug, attempts],
        )?;
        Ok(())
    }

    fn pop_frontier_batch(&mut self, n: usize) -> StoreResult<Vec<FrontierItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT slug, priority, attempts FROM frontier
             ORDER BY priority DESC, slug ASC LIMIT ?1",
        )?;

        let items = stmt
            .query_map(params![n as i64], |row| {
                Ok(FrontierItem {
                    slug: row.get(0)?,
                    priority: row.get(1)?,
                    attempts: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        for item in &items {
            self.conn
                .execute("DELETE FROM frontier WHERE slug = ?1", params![item.slug])?;
        }

        Ok(items)
    }

    fn frontier_len(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM frontier", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn clear_frontier(&mut self) -> StoreResult<()> {
        self.conn.execute("DELETE FROM frontier", [])?;
        Ok(())
    }
}
