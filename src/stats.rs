//! Status reporting from the store
//!
//! Backs the `status` subcommand: a point-in-time snapshot of the frontier
//! and the record counts. Everything here is reconstructible, nothing is
//! crawl state.

use crate::store::Store;
use crate::Result;

/// Point-in-time crawl status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Slugs waiting in the frontier
    pub frontier: u64,

    /// Stored title records
    pub titles: u64,

    /// Stored title records with at least one missing field
    pub incomplete: u64,

    /// Stored review records
    pub reviews: u64,
}

/// Loads a status snapshot from the store
pub fn load_status(store: &dyn Store) -> Result<Status> {
    Ok(Status {
        frontier: store.frontier_len()?,
        titles: store.count_titles()?,
        incomplete: store.count_incomplete()?,
        reviews: store.count_reviews()?,
    })
}

/// Prints a status snapshot to stdout
pub fn print_status(status: &Status) {
    println!("Frontier:            {}", status.frontier);
    println!("Titles stored:       {}", status.titles);
    println!("  of which partial:  {}", status.incomplete);
    println!("Reviews stored:      {}", status.reviews);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ReviewRecord, SqliteStore, TitleRecord};

    #[test]
    fn test_load_status_counts() {
        let mut store = SqliteStore::new_in_memory().unwrap();

        store
            .upsert_title(&TitleRecord {
                slug: "partial".to_string(),
                title: "Something".to_string(),
                ..Default::default()
            })
            .unwrap();
        store
            .insert_review(&ReviewRecord::new("r", "partial", Some(4), "ok"))
            .unwrap();
        store.push_frontier("queued").unwrap();

        let status = load_status(&store).unwrap();

        assert_eq!(
            status,
            Status {
                frontier: 1,
                titles: 1,
                incomplete: 1,
                reviews: 1,
            }
        );
    }
}
