use serde::Deserialize;

/// Main configuration structure for shelfmap
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Target site layout: base URL plus the path templates for each page kind.
///
/// Templates carry a single `{}` placeholder filled with a page number,
/// title slug, or reviewer handle.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base URL of the catalog site (scheme + host, no trailing slash)
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Paginated catalog listing path, e.g. "/titles?page={}"
    #[serde(rename = "listing-path")]
    pub listing_path: String,

    /// Title detail page path, e.g. "/title/{}"
    #[serde(rename = "title-path")]
    pub title_path: String,

    /// Per-title review listing path, e.g. "/title/{}/reviews"
    #[serde(rename = "reviews-path")]
    pub reviews_path: String,

    /// Reviewer history page path, e.g. "/reviewer/{}/reviews"
    #[serde(rename = "reviewer-path")]
    pub reviewer_path: String,
}

impl SiteConfig {
    pub fn listing_url(&self, page: u64) -> String {
        format!(
            "{}{}",
            self.base_url,
            self.listing_path.replacen("{}", &page.to_string(), 1)
        )
    }

    pub fn title_url(&self, slug: &str) -> String {
        format!("{}{}", self.base_url, self.title_path.replacen("{}", slug, 1))
    }

    pub fn reviews_url(&self, slug: &str) -> String {
        format!(
            "{}{}",
            self.base_url,
            self.reviews_path.replacen("{}", slug, 1)
        )
    }

    pub fn reviewer_url(&self, handle: &str) -> String {
        format!(
            "{}{}",
            self.base_url,
            self.reviewer_path.replacen("{}", handle, 1)
        )
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of frontier entries drained per batch
    #[serde(rename = "batch-size")]
    pub batch_size: u32,

    /// Frontier size at which expansion stops pushing new slugs
    #[serde(rename = "max-frontier-size")]
    pub max_frontier_size: u64,

    /// Fixed delay between records (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Page load timeout (milliseconds); expiry counts as a fetch failure
    #[serde(rename = "page-load-timeout-ms")]
    pub page_load_timeout_ms: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the full user-agent string sent with every request
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        SiteConfig {
            base_url: "https://catalog.example".to_string(),
            listing_path: "/titles?page={}".to_string(),
            title_path: "/title/{}".to_string(),
            reviews_path: "/title/{}/reviews".to_string(),
            reviewer_path: "/reviewer/{}/reviews".to_string(),
        }
    }

    #[test]
    fn test_listing_url() {
        assert_eq!(
            site().listing_url(3),
            "https://catalog.example/titles?page=3"
        );
    }

    #[test]
    fn test_title_url() {
        assert_eq!(
            site().title_url("dune-1965"),
            "https://catalog.example/title/dune-1965"
        );
    }

    #[test]
    fn test_reviews_url() {
        assert_eq!(
            site().reviews_url("dune-1965"),
            "https://catalog.example/title/dune-1965/reviews"
        );
    }

    #[test]
    fn test_reviewer_url() {
        assert_eq!(
            site().reviewer_url("sand-reader"),
            "https://catalog.example/reviewer/sand-reader/reviews"
        );
    }

    #[test]
    fn test_user_agent_header_value() {
        let ua = UserAgentConfig {
            crawler_name: "shelfmap".to_string(),
            crawler_version: "0.3".to_string(),
            contact_url: "https://example.com/bot".to_string(),
            contact_email: "ops@example.com".to_string(),
        };
        assert_eq!(
            ua.header_value(),
            "shelfmap/0.3 (+https://example.com/bot; ops@example.com)"
        );
    }
}
