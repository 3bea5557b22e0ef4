//! SQLite-based record sink
//!
//! This module provides a sink that appends records to the SQLite dataset and
//! closes the run row when the crawl finishes.

use crate::output::record::Record;
use crate::output::stats::{RunOutcome, RunSummary};
use crate::output::traits::{OutputError, OutputResult, RecordSink};
use crate::state::TargetKind;
use crate::storage::{RunStatus, SqliteStorage};
use std::sync::Mutex;

/// SQLite-based record sink
pub struct SqliteRecordSink {
    storage: Mutex<SqliteStorage>,
    run_id: i64,
}

impl SqliteRecordSink {
    /// Opens a new run in `storage` and returns a sink appending to it
    pub fn start_run(
        mut storage: SqliteStorage,
        config_hash: &str,
        max_results: u64,
    ) -> OutputResult<Self> {
        let run_id = storage
            .create_run(config_hash, max_results)
            .map_err(|e| OutputError::Storage(e.to_string()))?;
        tracing::debug!("Opened dataset run {}", run_id);

        Ok(Self {
            storage: Mutex::new(storage),
            run_id,
        })
    }

    fn lock(&self) -> OutputResult<std::sync::MutexGuard<'_, SqliteStorage>> {
        self.storage
            .lock()
            .map_err(|e| OutputError::Storage(format!("Failed to lock storage: {}", e)))
    }
}

impl RecordSink for SqliteRecordSink {
    fn write(&self, kind: TargetKind, record: &Record) -> OutputResult<()> {
        let data = serde_json::to_string(record)?;
        let url = record.get("url").unwrap_or_default();

        let mut storage = self.lock()?;
        storage
            .insert_record(self.run_id, kind.label(), url, &data)
            .map_err(|e| OutputError::Storage(e.to_string()))?;

        Ok(())
    }

    fn finish(&self, summary: &RunSummary) -> OutputResult<()> {
        let status = match summary.outcome {
            RunOutcome::Completed => RunStatus::Completed,
            RunOutcome::BudgetReached => RunStatus::LimitReached,
        };

        let mut storage = self.lock()?;
        storage
            .finish_run(self.run_id, status)
            .map_err(|e| OutputError::Storage(e.to_string()))?;

        Ok(())
    }
}
