//! Field extraction with per-field fallback chains
//!
//! Every target field is resolved independently: try the primary selector,
//! then each fallback in order, and settle on the field's zero-value default
//! if the whole chain misses. A miss on one field never blocks the others
//! and never fails the page; absence stays observable through
//! [`TitleRecord::missing_fields`]. Page-level failure exists only for pages
//! that did not load, which is the fetcher's domain.

pub mod selectors;

use crate::fetch::Document;
use crate::store::TitleRecord;

/// Cap on multi-value fields; the source shows at most this many entries
/// without a click-through, and the truncation is intentional.
pub const MAX_LIST_ITEMS: usize = 10;

/// One review parsed from a reviewer's history page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewerEntry {
    /// Slug of the title the review points at
    pub title_slug: String,
    pub rating: Option<i64>,
    pub body: String,
}

/// Resolves a text field through its fallback chain
fn first_text(doc: &Document, chain: &[&str]) -> Option<String> {
    chain.iter().find_map(|sel| doc.find_text(sel))
}

/// Resolves an integer field through its fallback chain
fn first_count(doc: &Document, chain: &[&str]) -> Option<i64> {
    chain.iter().find_map(|sel| doc.find_text(sel)).and_then(|raw| parse_count(&raw))
}

/// Resolves a decimal field through its fallback chain
fn first_score(doc: &Document, chain: &[&str]) -> Option<f64> {
    chain.iter().find_map(|sel| doc.find_text(sel)).and_then(|raw| parse_score(&raw))
}

/// Resolves a list field: first selector in the chain with any matches wins
fn collect_text(doc: &Document, chain: &[&str], cap: usize) -> Vec<String> {
    for sel in chain {
        let mut values = doc.find_all_text(sel);
        if !values.is_empty() {
            values.truncate(cap);
            return values;
        }
    }
    Vec::new()
}

/// Parses an integer count, tolerating thousands separators
///
/// Non-numeric text is a miss, not an error.
pub fn parse_count(raw: &str) -> Option<i64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned.trim().parse().ok()
}

/// Parses a decimal score, tolerating thousands separators
pub fn parse_score(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned.trim().parse().ok().filter(|v: &f64| v.is_finite())
}

/// Extracts a title record from a title detail page
///
/// Each field settles independently; the result may be partial.
pub fn extract_title(doc: &Document, slug: &str) -> TitleRecord {
    let record = TitleRecord {
        slug: slug.to_string(),
        title: first_text(doc, selectors::TITLE_NAME).unwrap_or_default(),
        year: first_count(doc, selectors::TITLE_YEAR).unwrap_or_default(),
        ratings_count: first_count(doc, selectors::TITLE_RATINGS_COUNT).unwrap_or_default(),
        score: first_score(doc, selectors::TITLE_SCORE).unwrap_or_default(),
        synopsis: first_text(doc, selectors::TITLE_SYNOPSIS).unwrap_or_default(),
        genres: collect_text(doc, selectors::TITLE_GENRES, MAX_LIST_ITEMS),
        themes: collect_text(doc, selectors::TITLE_THEMES, MAX_LIST_ITEMS),
        authors: collect_text(doc, selectors::TITLE_AUTHORS, MAX_LIST_ITEMS),
        characters: collect_text(doc, selectors::TITLE_CHARACTERS, MAX_LIST_ITEMS),
    };

    let missing = record.missing_fields();
    if !missing.is_empty() {
        tracing::debug!(
            "Partial extraction for {}: missing {}",
            doc.url(),
            missing.join(", ")
        );
    }

    record
}

/// Extracts candidate title slugs from a catalog listing page
pub fn extract_listing(doc: &Document) -> Vec<String> {
    for sel in selectors::LISTING_TITLE_LINKS {
        let hrefs = doc.find_all_attr(sel, "href");
        if !hrefs.is_empty() {
            return hrefs.iter().filter_map(|h| slug_from_href(h)).collect();
        }
    }
    Vec::new()
}

/// Extracts reviewer handles from a title's review listing page
pub fn extract_reviewers(doc: &Document) -> Vec<String> {
    for sel in selectors::REVIEWER_LINKS {
        let hrefs = doc.find_all_attr(sel, "href");
        if !hrefs.is_empty() {
            let mut handles: Vec<String> = hrefs
                .iter()
                .filter_map(|h| segment_after(h, "reviewer"))
                .collect();
            handles.dedup();
            return handles;
        }
    }
    Vec::new()
}

/// Extracts the reviews on a reviewer's history page
///
/// Cards missing a title link cannot reference anything and are dropped;
/// rating and body fall back to their defaults per card.
pub fn extract_reviewer_history(doc: &Document) -> Vec<ReviewerEntry> {
    for sel in selectors::REVIEW_CARDS {
        let cards = doc.blocks(sel);
        if cards.is_empty() {
            continue;
        }

        return cards
            .iter()
            .filter_map(|card| {
                let href = card.find_attr(selectors::CARD_TITLE_LINK, "href")?;
                let title_slug = slug_from_href(&href)?;
                Some(ReviewerEntry {
                    title_slug,
                    rating: card
                        .find_text(selectors::CARD_RATING)
                        .and_then(|raw| parse_count(&raw)),
                    body: card
                        .find_text(selectors::CARD_BODY)
                        .unwrap_or_default(),
                })
            })
            .collect();
    }
    Vec::new()
}

/// Takes the last path segment of an href as a slug
///
/// Query strings and fragments are stripped first.
fn slug_from_href(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or("");
    path.split('/')
        .filter(|s| !s.is_empty())
        .next_back()
        .map(|s| s.to_string())
}

/// Takes the path segment following `marker`, e.g. the handle in
/// `/reviewer/{handle}/reviews`
fn segment_after(href: &str, marker: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or("");
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    segments
        .by_ref()
        .find(|s| *s == marker)
        .and_then(|_| segments.next())
        .map(|s| s.to_string())
}
