//! Run summary: the structured accounting of one invocation's outcome.
//!
//! This is the only artifact that outlives the run. It serializes directly
//! to the machine-parseable output record, so field names are camelCase on
//! the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::errors::ErrorKind;

/// One per-path failure, surfaced as data rather than control flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub path: PathBuf,
    pub kind: ErrorKind,
    pub message: String,
}

/// Accumulated counters and error records for one run.
///
/// Invariant: `error_count == errors.len()` — no entry is silently dropped
/// from accounting. Built incrementally (possibly per worker, then merged),
/// finalized and emitted once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub files_deleted: u64,
    pub directories_removed: u64,
    pub bytes_freed: u64,
    pub excluded_count: u64,
    pub error_count: u64,
    pub errors: Vec<ErrorRecord>,
    pub truncated: bool,
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            files_deleted: 0,
            directories_removed: 0,
            bytes_freed: 0,
            excluded_count: 0,
            error_count: 0,
            errors: Vec::new(),
            truncated: false,
            duration_ms: 0,
            started_at: Utc::now(),
        }
    }

    /// A file (or symlink) was deleted, or would have been in dry-run mode.
    pub fn record_file_deleted(&mut self, size: u64) {
        self.files_deleted += 1;
        self.bytes_freed += size;
    }

    /// A now-empty directory was removed, or would have been in dry-run mode.
    pub fn record_dir_removed(&mut self) {
        self.directories_removed += 1;
    }

    /// A candidate matched an exclusion pattern. Not an error.
    pub fn record_excluded(&mut self) {
        self.excluded_count += 1;
    }

    pub fn record_error(&mut self, path: impl Into<PathBuf>, kind: ErrorKind, message: String) {
        self.error_count += 1;
        self.errors.push(ErrorRecord {
            path: path.into(),
            kind,
            message,
        });
    }

    pub fn mark_truncated(&mut self) {
        self.truncated = true;
    }

    /// Deletion attempts that reached the filesystem (excluded entries did
    /// not). Denominator for the error-rate threshold.
    pub fn attempted(&self) -> u64 {
        self.files_deleted + self.directories_removed + self.error_count
    }

    pub fn error_rate(&self) -> f64 {
        let attempted = self.attempted();
        if attempted == 0 {
            return 0.0;
        }
        self.error_count as f64 / attempted as f64
    }

    /// Fold another worker's summary into this one. Totals are exact for any
    /// worker count; error-record order across workers is unspecified.
    pub fn merge(&mut self, other: RunSummary) {
        self.files_deleted += other.files_deleted;
        self.directories_removed += other.directories_removed;
        self.bytes_freed += other.bytes_freed;
        self.excluded_count += other.excluded_count;
        self.error_count += other.error_count;
        self.errors.extend(other.errors);
        self.truncated |= other.truncated;
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}
