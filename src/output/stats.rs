//! Run statistics
//!
//! `RunStats` is updated concurrently by handlers during the crawl and
//! snapshotted into a `RunSummary` when the run ends. `DatasetStatistics`
//! describes what a SQLite dataset holds across runs.

use crate::storage::SqliteStorage;
use crate::CrawlError;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The frontier ran dry
    Completed,
    /// The result budget was exhausted and the run aborted
    BudgetReached,
}

/// Live counters shared by every handler of a run
#[derive(Debug, Default)]
pub struct RunStats {
    records_emitted: AtomicU64,
    detail_failures: AtomicU64,
    generic_failures: AtomicU64,
    listing_pages: AtomicU64,
    listing_failures: AtomicU64,
    links_harvested: AtomicU64,
    urls_rejected: AtomicU64,
    duplicates_skipped: AtomicU64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_emitted(&self) {
        self.records_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn detail_failed(&self) {
        self.detail_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn generic_failed(&self) {
        self.generic_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn listing_pages_fetched(&self, pages: u64) {
        self.listing_pages.fetch_add(pages, Ordering::Relaxed);
    }

    pub fn listing_failed(&self) {
        self.listing_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn links_harvested(&self, links: u64) {
        self.links_harvested.fetch_add(links, Ordering::Relaxed);
    }

    pub fn urls_rejected(&self, urls: u64) {
        self.urls_rejected.fetch_add(urls, Ordering::Relaxed);
    }

    pub fn duplicate_skipped(&self) {
        self.duplicates_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn records_emitted(&self) -> u64 {
        self.records_emitted.load(Ordering::Relaxed)
    }

    /// Freezes the counters into a summary
    pub fn summarize(
        &self,
        started_at: DateTime<Utc>,
        outcome: RunOutcome,
        max_results: u64,
        planned: u64,
        left_in_frontier: u64,
    ) -> RunSummary {
        RunSummary {
            started_at,
            finished_at: Utc::now(),
            outcome,
            max_results,
            planned,
            records_emitted: self.records_emitted.load(Ordering::Relaxed),
            detail_failures: self.detail_failures.load(Ordering::Relaxed),
            generic_failures: self.generic_failures.load(Ordering::Relaxed),
            listing_pages: self.listing_pages.load(Ordering::Relaxed),
            listing_failures: self.listing_failures.load(Ordering::Relaxed),
            links_harvested: self.links_harvested.load(Ordering::Relaxed),
            urls_rejected: self.urls_rejected.load(Ordering::Relaxed),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::Relaxed),
            left_in_frontier,
        }
    }
}

/// Final numbers of one crawl run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: RunOutcome,
    pub max_results: u64,
    pub planned: u64,
    pub records_emitted: u64,
    pub detail_failures: u64,
    /// Generic pages that could not be fetched
    pub generic_failures: u64,
    pub listing_pages: u64,
    pub listing_failures: u64,
    pub links_harvested: u64,
    pub urls_rejected: u64,
    pub duplicates_skipped: u64,
    /// Work items never dispatched because the run aborted
    pub left_in_frontier: u64,
}

impl RunSummary {
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Prints a run summary to stdout
pub fn print_run_summary(summary: &RunSummary) {
    println!("=== Crawl Summary ===\n");

    let outcome = match summary.outcome {
        RunOutcome::Completed => "completed",
        RunOutcome::BudgetReached => "stopped at result limit",
    };
    println!("Outcome: {} after {}s", outcome, summary.duration_seconds());
    println!(
        "Records: {} emitted (limit {}, {} planned by listings)",
        summary.records_emitted, summary.max_results, summary.planned
    );
    println!(
        "Listings: {} pages fetched, {} loops failed",
        summary.listing_pages, summary.listing_failures
    );
    println!("Links harvested: {}", summary.links_harvested);
    println!("Detail pages failed: {}", summary.detail_failures);
    println!("Generic pages failed: {}", summary.generic_failures);
    println!(
        "URLs rejected: {}, duplicates skipped: {}",
        summary.urls_rejected, summary.duplicates_skipped
    );
    if summary.left_in_frontier > 0 {
        println!("Left undispatched: {}", summary.left_in_frontier);
    }
}

/// What a SQLite dataset holds
#[derive(Debug, Clone)]
pub struct DatasetStatistics {
    pub total_runs: u64,
    pub total_records: u64,
    /// Records per kind label, sorted by label
    pub records_by_kind: Vec<(String, u64)>,
    pub latest_run: Option<crate::storage::RunRecord>,
    /// Records written by the latest run
    pub latest_run_records: u64,
}

/// Loads statistics from a SQLite dataset
pub fn load_statistics(storage: &SqliteStorage) -> Result<DatasetStatistics, CrawlError> {
    let latest_run = storage.get_latest_run()?;
    let latest_run_records = match &latest_run {
        Some(run) => storage.count_records_for_run(run.id)?,
        None => 0,
    };

    Ok(DatasetStatistics {
        total_runs: storage.count_runs()?,
        total_records: storage.count_records()?,
        records_by_kind: storage.count_records_by_kind()?,
        latest_run,
        latest_run_records,
    })
}

/// Prints dataset statistics to stdout
pub fn print_statistics(stats: &DatasetStatistics) {
    println!("=== Dataset Statistics ===\n");

    println!("Runs: {}", stats.total_runs);
    println!("Records: {}", stats.total_records);
    println!();

    if !stats.records_by_kind.is_empty() {
        println!("Records by Kind:");
        for (kind, count) in &stats.records_by_kind {
            let percentage = if stats.total_records > 0 {
                (*count as f64 / stats.total_records as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", kind, count, percentage);
        }
        println!();
    }

    if let Some(run) = &stats.latest_run {
        println!("Latest Run:");
        println!("  Id: {}", run.id);
        println!("  Started: {}", run.started_at);
        println!(
            "  Finished: {}",
            run.finished_at.as_deref().unwrap_or("(not finished)")
        );
        println!("  Status: {}", run.status.to_db_string());
        println!("  Max results: {}", run.max_results);
        println!("  Records: {}", stats.latest_run_records);
    }
}
