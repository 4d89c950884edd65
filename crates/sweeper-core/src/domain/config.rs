//! Run configuration.
//!
//! Constructed once at job start and never mutated. The external scheduler
//! supplies one of these per invocation; the run is a pure function of the
//! configuration and the filesystem state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Immutable configuration for one deletion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Mount point of the (already mounted) shared filesystem.
    pub mount_root: PathBuf,

    /// Optional tenant subdirectory under the mount root.
    /// `None` means the whole mount root is in scope.
    #[serde(default)]
    pub tenant: Option<String>,

    /// Exclusion glob patterns, matched against base names in order.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Candidates per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Optional run-duration budget (milliseconds). `None` = unbounded.
    #[serde(default)]
    pub max_duration_ms: Option<u64>,

    /// When true, log would-be deletions without touching the filesystem.
    #[serde(default)]
    pub dry_run: bool,

    /// Parallel deletion workers over disjoint top-level subtrees.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Error rate (errors / attempted) above which the run exits nonzero.
    /// 1.0 = never trip.
    #[serde(default = "default_error_rate_threshold")]
    pub error_rate_threshold: f64,
}

fn default_batch_size() -> usize {
    500
}

fn default_workers() -> usize {
    1
}

fn default_error_rate_threshold() -> f64 {
    1.0
}

impl RunConfig {
    /// Configuration with all knobs at their defaults.
    pub fn new(mount_root: impl Into<PathBuf>) -> Self {
        Self {
            mount_root: mount_root.into(),
            tenant: None,
            exclude: Vec::new(),
            batch_size: default_batch_size(),
            max_duration_ms: None,
            dry_run: false,
            workers: default_workers(),
            error_rate_threshold: default_error_rate_threshold(),
        }
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn with_exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_max_duration(mut self, max: Duration) -> Self {
        self.max_duration_ms = Some(max.as_millis() as u64);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration_ms.map(Duration::from_millis)
    }

    /// Batch size with the zero-footgun removed.
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}
