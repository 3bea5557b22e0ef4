//! Tomato-Harvest: a movie and TV show record crawler
//!
//! This crate crawls a media-review site starting from seed URLs, follows
//! links to movie and TV show detail pages, paginates browse listings through
//! the site's listing API, and stops once a configured number of records has
//! been emitted.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Tomato-Harvest operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// `MissingStartUrls` and `StartUrlsNotList` are the input errors that abort
/// a run before any crawling starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Start urls are not provided")]
    MissingStartUrls,

    #[error("Start urls must be a list, got {0}")]
    StartUrlsNotList(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Reasons a URL is rejected during classification
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("URL {url} is not on the target site {expected}")]
    ForeignHost { url: String, expected: String },

    #[error("Detail URL {0} needs at least two path segments")]
    MalformedDetailPath(String),
}

/// Transport, HTTP, and decoding failures from the fetch layer
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Result type alias for Tomato-Harvest operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use crate::config::Config;
pub use crate::state::{AbortSignal, ResultBudget, TargetKind, WorkItem};
pub use crate::url::UrlClassifier;
