use crate::config::types::{Config, CrawlerConfig, OutputConfig, ProxyConfig, SiteConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Individual seed URLs are not checked here: a bad seed is dropped with a
/// warning when the crawl starts, it does not fail the run.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    if let Some(proxy) = &config.proxy {
        validate_proxy_config(proxy)?;
    }
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the target site layout
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            base.scheme()
        )));
    }

    if base.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            config.base_url
        )));
    }

    for (name, segment) in [
        ("api-prefix", &config.api_prefix),
        ("movie-segment", &config.movie_segment),
        ("show-segment", &config.show_segment),
        ("browse-segment", &config.browse_segment),
    ] {
        validate_segment(name, segment)?;
    }

    Ok(())
}

/// A path segment must be non-empty and contain no slash
fn validate_segment(name: &str, segment: &str) -> Result<(), ConfigError> {
    if segment.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }

    if segment.contains('/') {
        return Err(ConfigError::Validation(format!(
            "{} must be a single path segment, got '{}'",
            name, segment
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_results == 0 is allowed: the run emits nothing

    if config.max_concurrent_pages < 1 || config.max_concurrent_pages > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-pages must be between 1 and 100, got {}",
            config.max_concurrent_pages
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates proxy configuration
fn validate_proxy_config(config: &ProxyConfig) -> Result<(), ConfigError> {
    Url::parse(&config.url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy url: {}", e)))?;

    if config.password.is_some() && config.username.is_none() {
        return Err(ConfigError::Validation(
            "proxy password given without a username".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_site_is_valid() {
        assert!(validate_site_config(&SiteConfig::default()).is_ok());
    }

    #[test]
    fn test_site_base_url_rules() {
        let mut site = SiteConfig::default();
        site.base_url = "ftp://www.rottentomatoes.com".to_string();
        assert!(matches!(
            validate_site_config(&site),
            Err(ConfigError::InvalidUrl(_))
        ));

        site.base_url = "not a url".to_string();
        assert!(validate_site_config(&site).is_err());
    }

    #[test]
    fn test_validate_segment() {
        assert!(validate_segment("movie-segment", "m").is_ok());
        assert!(validate_segment("movie-segment", "").is_err());
        assert!(validate_segment("movie-segment", "m/x").is_err());
    }

    #[test]
    fn test_crawler_limits() {
        let mut crawler = CrawlerConfig::default();
        assert!(validate_crawler_config(&crawler).is_ok());

        crawler.max_results = 0;
        assert!(validate_crawler_config(&crawler).is_ok());

        crawler.max_concurrent_pages = 101;
        assert!(validate_crawler_config(&crawler).is_err());

        crawler.max_concurrent_pages = 5;
        crawler.request_timeout_secs = 0;
        assert!(validate_crawler_config(&crawler).is_err());
    }

    #[test]
    fn test_proxy_rules() {
        let proxy = ProxyConfig {
            url: "http://proxy.example:8000".to_string(),
            username: None,
            password: Some("secret".to_string()),
        };
        assert!(validate_proxy_config(&proxy).is_err());

        let proxy = ProxyConfig {
            url: "::".to_string(),
            username: None,
            password: None,
        };
        assert!(matches!(
            validate_proxy_config(&proxy),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_output_path_required() {
        let output = OutputConfig {
            path: "  ".to_string(),
            ..OutputConfig::default()
        };
        assert!(validate_output_config(&output).is_err());
    }
}
