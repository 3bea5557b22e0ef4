use serde::Deserialize;

/// Default cap on emitted records when `max-results` is absent
pub const DEFAULT_MAX_RESULTS: u64 = 100;

/// Main configuration structure for Tomato-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "start-urls")]
    pub start_urls: Vec<StartUrl>,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

/// A seed URL, either a bare string or a table with an optional label
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StartUrl {
    Plain(String),
    Request {
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        label: Option<String>,
    },
}

impl StartUrl {
    /// The seed URL, if the entry carries one
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Plain(url) => Some(url),
            Self::Request { url, .. } => url.as_deref(),
        }
    }

    /// The optional pre-label (`MOVIE`, `TV`, `BROWSE`, `OTHER`)
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Plain(_) => None,
            Self::Request { label, .. } => label.as_deref(),
        }
    }
}

/// Target site layout
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Scheme and host every crawled URL must share
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// First path segment of the listing API (`{site}/{api-prefix}/browse/...`)
    #[serde(rename = "api-prefix", default = "default_api_prefix")]
    pub api_prefix: String,

    #[serde(rename = "movie-segment", default = "default_movie_segment")]
    pub movie_segment: String,

    #[serde(rename = "show-segment", default = "default_show_segment")]
    pub show_segment: String,

    #[serde(rename = "browse-segment", default = "default_browse_segment")]
    pub browse_segment: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            movie_segment: default_movie_segment(),
            show_segment: default_show_segment(),
            browse_segment: default_browse_segment(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of records emitted by a run
    #[serde(rename = "max-results", default = "default_max_results")]
    pub max_results: u64,

    /// Maximum number of handlers running at once
    #[serde(rename = "max-concurrent-pages", default = "default_max_concurrent_pages")]
    pub max_concurrent_pages: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retries for 5xx responses and timeouts
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between retries (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            max_concurrent_pages: default_max_concurrent_pages(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Proxy passed through to the HTTP client
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Output sink format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jsonl,
    Sqlite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_format")]
    pub format: OutputFormat,

    /// Path to the JSON Lines file or SQLite database
    #[serde(default = "default_output_path")]
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_output_format(),
            path: default_output_path(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.rottentomatoes.com".to_string()
}

fn default_api_prefix() -> String {
    "napi".to_string()
}

fn default_movie_segment() -> String {
    "m".to_string()
}

fn default_show_segment() -> String {
    "tv".to_string()
}

fn default_browse_segment() -> String {
    "browse".to_string()
}

fn default_max_results() -> u64 {
    DEFAULT_MAX_RESULTS
}

fn default_max_concurrent_pages() -> u32 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_crawler_name() -> String {
    "tomato-harvest".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Jsonl
}

fn default_output_path() -> String {
    "./dataset.jsonl".to_string()
}
