use crate::config::types::{Config, CrawlerConfig, SiteConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_path(&config.output.database_path)?;
    Ok(())
}

/// Validates the site layout configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|_| ConfigError::InvalidUrl(config.base_url.clone()))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must be http(s), got scheme '{}'",
            base.scheme()
        )));
    }

    if config.base_url.ends_with('/') {
        return Err(ConfigError::Validation(
            "base-url must not end with a slash (path templates start with one)".to_string(),
        ));
    }

    for (name, template) in [
        ("listing-path", &config.listing_path),
        ("title-path", &config.title_path),
        ("reviews-path", &config.reviews_path),
        ("reviewer-path", &config.reviewer_path),
    ] {
        if !template.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "{} must start with '/', got '{}'",
                name, template
            )));
        }
        if !template.contains("{}") {
            return Err(ConfigError::Validation(format!(
                "{} must contain a '{{}}' placeholder, got '{}'",
                name, template
            )));
        }
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.batch_size < 1 || config.batch_size > 1000 {
        return Err(ConfigError::Validation(format!(
            "batch-size must be between 1 and 1000, got {}",
            config.batch_size
        )));
    }

    if config.request_delay_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "request-delay-ms must be >= 100ms, got {}ms",
            config.request_delay_ms
        )));
    }

    if config.page_load_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "page-load-timeout-ms must be >= 1000ms, got {}ms",
            config.page_load_timeout_ms
        )));
    }

    // max_frontier_size = 0 is legal: it disables expansion entirely.

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|_| ConfigError::InvalidUrl(config.contact_url.clone()))?;

    if !config.contact_email.contains('@') {
        return Err(ConfigError::Validation(format!(
            "contact-email does not look like an email address: '{}'",
            config.contact_email
        )));
    }

    Ok(())
}

/// Validates the output database path
fn validate_output_path(path: &str) -> Result<(), ConfigError> {
    if path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::OutputConfig;

    fn valid_config() -> Config {
        Config {
            site: SiteConfig {
                base_url: "https://catalog.example".to_string(),
                listing_path: "/titles?page={}".to_string(),
                title_path: "/title/{}".to_string(),
                reviews_path: "/title/{}/reviews".to_string(),
                reviewer_path: "/reviewer/{}/reviews".to_string(),
            },
            crawler: CrawlerConfig {
                batch_size: 10,
                max_frontier_size: 500,
                request_delay_ms: 1000,
                page_load_timeout_ms: 30000,
            },
            user_agent: UserAgentConfig {
                crawler_name: "shelfmap".to_string(),
                crawler_version: "0.3".to_string(),
                contact_url: "https://example.com/bot".to_string(),
                contact_email: "ops@example.com".to_string(),
            },
            output: OutputConfig {
                database_path: "./shelfmap.db".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_zero_max_frontier_is_legal() {
        let mut config = valid_config();
        config.crawler.max_frontier_size = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_trailing_slash_base_url() {
        let mut config = valid_config();
        config.site.base_url = "https://catalog.example/".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_template_without_placeholder() {
        let mut config = valid_config();
        config.site.title_path = "/title/fixed".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut config = valid_config();
        config.site.base_url = "ftp://catalog.example".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        let mut config = valid_config();
        config.crawler.batch_size = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_tiny_request_delay() {
        let mut config = valid_config();
        config.crawler.request_delay_ms = 10;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_bad_crawler_name() {
        let mut config = valid_config();
        config.user_agent.crawler_name = "bad name!".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_bad_email() {
        let mut config = valid_config();
        config.user_agent.contact_email = "not-an-email".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }
}
