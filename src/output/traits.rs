//! Output sink traits and types
//!
//! This module defines the trait interface for record sinks and the errors
//! they report.

use crate::output::record::Record;
use crate::output::stats::RunSummary;
use crate::state::TargetKind;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Append-only destination for extracted records
///
/// Sinks are shared by concurrently running detail handlers, so they
/// synchronize internally.
pub trait RecordSink: Send + Sync {
    /// Appends one record
    fn write(&self, kind: TargetKind, record: &Record) -> OutputResult<()>;

    /// Called once after the run has drained
    fn finish(&self, _summary: &RunSummary) -> OutputResult<()> {
        Ok(())
    }
}
