//! Configuration module for Tomato-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use tomato_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Run will stop after {} records", config.crawler.max_results);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, OutputFormat, ProxyConfig, SiteConfig, StartUrl,
    UserAgentConfig, DEFAULT_MAX_RESULTS,
};

// Re-export parser functions
pub use parser::{load_config, load_config_with_hash, parse_config};

// Re-exported so command-line overrides can be checked after loading
pub use validation::validate;
