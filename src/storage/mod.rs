//! Storage module for the SQLite dataset
//!
//! This module handles all database operations of the SQLite output format:
//! - Schema initialization
//! - Run tracking (start, finish, status)
//! - Append-only record storage

mod schema;
mod sqlite;

pub use sqlite::SqliteStorage;

use thiserror::Error;

/// Failures of the SQLite dataset
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No run with id {0} in the dataset")]
    RunNotFound(i64),

    #[error("Dataset I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// One row of the `runs` table
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    /// Result limit the run was started with
    pub max_results: u64,
    pub status: RunStatus,
}

/// How a run row ended, as stored in `runs.status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    /// The frontier drained before the result limit
    Completed,
    /// The result limit stopped the run
    LimitReached,
}

impl RunStatus {
    const ALL: [RunStatus; 3] = [Self::Running, Self::Completed, Self::LimitReached];

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::LimitReached => "limit_reached",
        }
    }

    /// Unknown strings yield `None`
    pub fn from_db_string(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.to_db_string() == s)
    }
}
