//! Output module for extracted records and run reports
//!
//! This module handles:
//! - The `Record` type emitted for every detail page
//! - Append-only record sinks (JSON Lines file, SQLite dataset)
//! - Run and dataset statistics

mod jsonl;
mod record;
mod sqlite_output;
pub mod stats;
mod traits;

pub use jsonl::JsonLinesSink;
pub use record::{Record, REQUIRED_FIELDS};
pub use sqlite_output::SqliteRecordSink;
pub use stats::{
    load_statistics, print_run_summary, print_statistics, DatasetStatistics, RunOutcome,
    RunStats, RunSummary,
};
pub use traits::{OutputError, OutputResult, RecordSink};

use crate::config::{OutputConfig, OutputFormat};
use crate::storage::SqliteStorage;
use std::path::Path;
use std::sync::Arc;

/// Opens the sink described by the output configuration
///
/// # Arguments
///
/// * `config` - Output format and path
/// * `config_hash` - Hash of the configuration file, stored with SQLite runs
/// * `max_results` - Result limit of the run, stored with SQLite runs
pub fn open_sink(
    config: &OutputConfig,
    config_hash: &str,
    max_results: u64,
) -> Result<Arc<dyn RecordSink>, crate::CrawlError> {
    let path = Path::new(&config.path);

    let sink: Arc<dyn RecordSink> = match config.format {
        OutputFormat::Jsonl => Arc::new(JsonLinesSink::open(path)?),
        OutputFormat::Sqlite => {
            let storage = SqliteStorage::new(path)?;
            Arc::new(SqliteRecordSink::start_run(storage, config_hash, max_results)?)
        }
    };

    tracing::info!("Writing {:?} records to {}", config.format, path.display());
    Ok(sink)
}
