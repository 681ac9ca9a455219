//! Selector tables, one group per page kind
//!
//! Each field has a primary selector followed by ordered fallbacks covering
//! older markup revisions of the site. Earlier entries win.

// ===== Title detail page =====

pub const TITLE_NAME: &[&str] = &[
    "h1.title-name",
    ".title-header h1",
    "[itemprop='name']",
];

pub const TITLE_YEAR: &[&str] = &[
    ".title-header .release-year",
    ".title-meta .year",
    "[itemprop='datePublished']",
];

pub const TITLE_RATINGS_COUNT: &[&str] = &[
    ".rating-summary .ratings-count",
    "[itemprop='ratingCount']",
];

pub const TITLE_SCORE: &[&str] = &[
    ".rating-summary .score",
    "[itemprop='ratingValue']",
];

pub const TITLE_SYNOPSIS: &[&str] = &[
    ".synopsis .full-text",
    ".synopsis",
    "[itemprop='description']",
];

pub const TITLE_GENRES: &[&str] = &[
    ".genre-list a.genre",
    ".title-meta .genres a",
];

pub const TITLE_THEMES: &[&str] = &[
    ".theme-list a.theme",
    ".title-meta .themes a",
];

pub const TITLE_AUTHORS: &[&str] = &[
    ".byline a.contributor",
    "[itemprop='author']",
];

pub const TITLE_CHARACTERS: &[&str] = &[
    ".character-list .character-name",
    ".characters li a",
];

// ===== Catalog listing page =====

pub const LISTING_TITLE_LINKS: &[&str] = &[
    ".catalog-row a.title-link",
    ".listing-grid .entry > a",
];

// ===== Per-title review listing =====

pub const REVIEWER_LINKS: &[&str] = &[
    ".review .reviewer a.handle",
    ".review-list .byline a",
];

// ===== Reviewer history page =====

pub const REVIEW_CARDS: &[&str] = &[
    ".review-history .review-card",
    ".reviews .review",
];

pub const CARD_TITLE_LINK: &str = "a.title-link";
pub const CARD_RATING: &str = ".rating-value";
pub const CARD_BODY: &str = ".review-body";
