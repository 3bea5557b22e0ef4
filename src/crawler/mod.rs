//! Crawler module for fetching and processing pages
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Listing API pagination against the shared result budget
//! - Link harvesting from generic pages
//! - Field extraction from movie and TV show pages
//! - Frontier ownership and handler dispatch

mod driver;
mod extractor;
mod fetcher;
mod frontier;
mod harvester;
mod listing;

pub use driver::{dispatch, CrawlContext, CrawlDriver, DispatchOutcome};
pub use extractor::{clean_detail_values, DetailExtractor, DEFAULT_NAME_LIMIT};
pub use fetcher::{build_http_client, FetchedPage, Fetcher};
pub use frontier::Frontier;
pub use harvester::{HarvestReport, LinkHarvester};
pub use listing::{
    listing_endpoint, next_state, ListingEntry, ListingGrid, ListingPaginator, ListingResponse,
    PageInfo, PaginationSummary, PaginatorState, StopReason,
};

use crate::config::Config;
use crate::output::{open_sink, RunSummary};
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the configured record sink
/// 2. Classify and queue the start URLs
/// 3. Dispatch work until the frontier is empty or the result limit aborts the run
/// 4. Close the sink with the run summary
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `config_hash` - Hash of the configuration file, stored with SQLite runs
///
/// # Returns
///
/// * `Ok(RunSummary)` - Crawl completed or stopped at the result limit
/// * `Err(CrawlError)` - The sink or HTTP client could not be set up
pub async fn crawl(config: &Config, config_hash: &str) -> Result<RunSummary, CrawlError> {
    let sink = open_sink(&config.output, config_hash, config.crawler.max_results)?;

    let mut driver = CrawlDriver::new(config, sink.clone())?;
    driver.seed(&config.start_urls);

    let summary = driver.run().await?;
    sink.finish(&summary)?;

    Ok(summary)
}
