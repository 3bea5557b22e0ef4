//! JSON Lines record sink
//!
//! Appends one JSON object per line. Each line is flushed as soon as it is
//! written so an interrupted run keeps every record emitted so far.

use crate::output::record::Record;
use crate::output::traits::{OutputError, OutputResult, RecordSink};
use crate::state::TargetKind;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Append-only JSON Lines file
pub struct JsonLinesSink {
    file: Mutex<File>,
}

impl JsonLinesSink {
    /// Opens `path` for appending, creating it if needed
    pub fn open(path: &Path) -> OutputResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl RecordSink for JsonLinesSink {
    fn write(&self, _kind: TargetKind, record: &Record) -> OutputResult<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = self
            .file
            .lock()
            .map_err(|e| OutputError::Write(format!("Failed to lock output file: {}", e)))?;
        file.write_all(line.as_bytes())?;
        file.flush()?;

        Ok(())
    }
}
