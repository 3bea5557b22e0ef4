use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses and validates a TOML configuration file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use tomato_harvest::config::load_config;
///
/// let config = load_config(Path::new("crawl.toml")).unwrap();
/// println!("Max results: {}", config.crawler.max_results);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
///
/// The seed list is checked on the raw document first so that a missing or
/// non-list `start-urls` reports as an input error rather than a generic
/// deserialization failure.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let table: toml::Table = toml::from_str(content)?;

    match table.get("start-urls") {
        None => return Err(ConfigError::MissingStartUrls),
        Some(toml::Value::Array(_)) => {}
        Some(other) => {
            return Err(ConfigError::StartUrlsNotList(
                other.type_str().to_string(),
            ))
        }
    }

    let config: Config = toml::from_str(content)?;
    validate(&config)?;

    Ok(config)
}

/// Loads a configuration together with the hash of the exact text parsed
///
/// The hash is stored with SQLite dataset runs.
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(content.as_bytes())))
}

fn hash_content(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutputFormat, DEFAULT_MAX_RESULTS};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
start-urls = [
    "https://www.rottentomatoes.com/m/the_matrix",
    { url = "https://www.rottentomatoes.com/tv/severance", label = "TV" },
]

[crawler]
max-results = 25
max-concurrent-pages = 4

[output]
format = "sqlite"
path = "./dataset.db"
"#;

        let file = write_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.start_urls.len(), 2);
        assert_eq!(
            config.start_urls[0].url(),
            Some("https://www.rottentomatoes.com/m/the_matrix")
        );
        assert_eq!(config.start_urls[1].label(), Some("TV"));
        assert_eq!(config.crawler.max_results, 25);
        assert_eq!(config.crawler.max_concurrent_pages, 4);
        assert_eq!(config.output.format, OutputFormat::Sqlite);
        assert_eq!(config.site.base_url, "https://www.rottentomatoes.com");
    }

    #[test]
    fn test_defaults_applied() {
        let config = parse_config(r#"start-urls = ["https://www.rottentomatoes.com/"]"#).unwrap();

        assert_eq!(config.crawler.max_results, DEFAULT_MAX_RESULTS);
        assert_eq!(config.site.api_prefix, "napi");
        assert_eq!(config.site.movie_segment, "m");
        assert_eq!(config.site.show_segment, "tv");
        assert_eq!(config.site.browse_segment, "browse");
        assert_eq!(config.output.format, OutputFormat::Jsonl);
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_missing_start_urls() {
        let result = parse_config("[crawler]\nmax-results = 5\n");
        assert!(matches!(result, Err(ConfigError::MissingStartUrls)));
    }

    #[test]
    fn test_start_urls_not_a_list() {
        let result = parse_config(r#"start-urls = "https://www.rottentomatoes.com/m/x""#);
        match result {
            Err(ConfigError::StartUrlsNotList(kind)) => assert_eq!(kind, "string"),
            other => panic!("expected StartUrlsNotList, got {:?}", other),
        }
    }

    #[test]
    fn test_entry_without_url_is_accepted() {
        let config = parse_config(r#"start-urls = [{ label = "MOVIE" }]"#).unwrap();
        assert_eq!(config.start_urls[0].url(), None);
    }

    #[test]
    fn test_proxy_section() {
        let config = parse_config(
            r#"
start-urls = []

[proxy]
url = "http://proxy.example:8000"
username = "user"
password = "secret"
"#,
        )
        .unwrap();

        let proxy = config.proxy.unwrap();
        assert_eq!(proxy.url, "http://proxy.example:8000");
        assert_eq!(proxy.username.as_deref(), Some("user"));
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/crawl.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = write_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
start-urls = []

[crawler]
max-concurrent-pages = 0
"#;

        let file = write_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_config_hash() {
        let first = write_config("start-urls = []\n");
        let same = write_config("start-urls = []\n");
        let other = write_config("start-urls = []\n\n[crawler]\nmax-results = 3\n");

        let (_, hash) = load_config_with_hash(first.path()).unwrap();
        let (_, same_hash) = load_config_with_hash(same.path()).unwrap();
        let (config, other_hash) = load_config_with_hash(other.path()).unwrap();

        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, same_hash);
        assert_ne!(hash, other_hash);
        assert_eq!(config.crawler.max_results, 3);
    }
}
