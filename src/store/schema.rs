//! Database schema definitions
//!
//! All SQL schema for the shelfmap database lives here.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Extracted catalog titles, one row per slug. List fields are stored as
-- delimiter-joined text: genres/themes comma-joined, authors/characters
-- pipe-joined (names may contain commas).
CREATE TABLE IF NOT EXISTS titles (
    slug TEXT PRIMARY KEY,
    title TEXT NOT NULL DEFAULT '',
    year INTEGER NOT NULL DEFAULT 0,
    ratings_count INTEGER NOT NULL DEFAULT 0,
    score REAL NOT NULL DEFAULT 0,
    synopsis TEXT NOT NULL DEFAULT '',
    genres TEXT NOT NULL DEFAULT '',
    themes TEXT NOT NULL DEFAULT '',
    authors TEXT NOT NULL DEFAULT '',
    characters TEXT NOT NULL DEFAULT '',
    first_seen TEXT NOT NULL,
    updated_at TEXT
);

-- Reviews, deduplicated solely by content fingerprint.
CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    reviewer TEXT NOT NULL,
    title_slug TEXT NOT NULL,
    rating INTEGER,
    body TEXT NOT NULL,
    fingerprint TEXT NOT NULL UNIQUE,
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reviews_title ON reviews(title_slug);
CREATE INDEX IF NOT EXISTS idx_reviews_reviewer ON reviews(reviewer);

-- Crawl frontier: slugs awaiting extraction. At most one live row per slug.
CREATE TABLE IF NOT EXISTS frontier (
    slug TEXT PRIMARY KEY,
    priority INTEGER NOT NULL,
    attempts INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_frontier_priority ON frontier(priority);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in ["titles", "reviews", "frontier"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }
}
