//! Runner: one scheduled invocation, end to end.
//!
//! Pipeline: Resolving → Sweeping (walk + delete, streaming) → Reporting.
//! Only the Resolving stage may fail the process; every later problem
//! degrades to a partial summary. The external scheduler triggers runs and
//! keeps them from overlapping — but overlap is safe anyway, deletions are
//! idempotent and a concurrent "already gone" is just a not-found record.

use std::time::Instant;

use tokio::sync::watch;
use tracing::Instrument;

use crate::delete::Deleter;
use crate::domain::{InvalidScopeError, RunConfig, RunId, RunSummary};
use crate::report;
use crate::scope;

/// The finished run: summary plus the exit code the process should use.
#[derive(Debug)]
pub struct RunOutcome {
    pub summary: RunSummary,
    pub exit_code: i32,
}

/// One-shot deletion runner over a single configuration.
pub struct Runner {
    config: RunConfig,
}

impl Runner {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Execute the run. `cancel` is flipped by the caller (Ctrl-C, operator
    /// abort); workers stop at the next batch boundary and the partial
    /// summary is still returned.
    ///
    /// Returns `Err` only for scope-resolution failures, before anything is
    /// deleted.
    pub async fn run(
        &self,
        cancel: watch::Receiver<bool>,
    ) -> Result<RunOutcome, InvalidScopeError> {
        let run_id = RunId::generate();
        let span = tracing::info_span!("sweep_run", %run_id);

        async {
            let started = Instant::now();

            let scope = scope::resolve(&self.config)?;
            tracing::info!(
                root = %scope.root().display(),
                dry_run = self.config.dry_run,
                workers = self.config.workers,
                batch_size = self.config.batch_size,
                "scope resolved"
            );

            let mut summary = Deleter::new(self.config.clone())
                .run(&scope, cancel)
                .await;
            summary.duration_ms = started.elapsed().as_millis() as u64;

            let exit_code = report::exit_code(&summary, self.config.error_rate_threshold);
            tracing::info!(
                files_deleted = summary.files_deleted,
                directories_removed = summary.directories_removed,
                bytes_freed = summary.bytes_freed,
                excluded = summary.excluded_count,
                errors = summary.error_count,
                truncated = summary.truncated,
                duration_ms = summary.duration_ms,
                exit_code,
                "run finished"
            );

            Ok(RunOutcome { summary, exit_code })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{EXIT_SUCCESS, EXIT_TRUNCATED};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn no_cancel() -> watch::Receiver<bool> {
        let (_tx, rx) = watch::channel(false);
        rx
    }

    #[tokio::test]
    async fn clean_run_exits_zero() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("a.txt"), b"x").unwrap();

        let outcome = Runner::new(RunConfig::new(root.path()))
            .run(no_cancel())
            .await
            .unwrap();

        assert_eq!(outcome.exit_code, EXIT_SUCCESS);
        assert_eq!(outcome.summary.files_deleted, 1);
        assert!(!outcome.summary.truncated);
    }

    #[tokio::test]
    async fn escaping_tenant_fails_before_deleting_anything() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("a.txt"), b"x").unwrap();

        let config = RunConfig::new(root.path()).with_tenant("../evil");
        let err = Runner::new(config).run(no_cancel()).await.unwrap_err();

        assert!(matches!(err, InvalidScopeError::EscapesRoot { .. }));
        assert!(root.path().join("a.txt").exists());
    }

    #[tokio::test]
    async fn truncated_run_exits_two_with_partial_counts() {
        let root = TempDir::new().unwrap();
        for i in 0..20 {
            fs::write(root.path().join(format!("f{i}.txt")), b"x").unwrap();
        }

        let config = RunConfig::new(root.path()).with_max_duration(Duration::from_millis(0));
        let outcome = Runner::new(config).run(no_cancel()).await.unwrap();

        assert_eq!(outcome.exit_code, EXIT_TRUNCATED);
        assert!(outcome.summary.truncated);
        // The record is still complete and consistent.
        assert_eq!(outcome.summary.error_count as usize, outcome.summary.errors.len());
    }

    #[tokio::test]
    async fn duration_is_reported() {
        let root = TempDir::new().unwrap();

        let outcome = Runner::new(RunConfig::new(root.path()))
            .run(no_cancel())
            .await
            .unwrap();

        // Zero candidates is a normal outcome, and the record still reports
        // an elapsed duration (possibly 0ms on a fast machine).
        assert_eq!(outcome.summary.files_deleted, 0);
        assert_eq!(outcome.exit_code, EXIT_SUCCESS);
    }

    #[tokio::test]
    async fn dry_run_end_to_end_leaves_the_tree_alone() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("sub")).unwrap();
        fs::write(root.path().join("sub/a.txt"), b"x").unwrap();

        let config = RunConfig::new(root.path()).with_dry_run(true);
        let outcome = Runner::new(config).run(no_cancel()).await.unwrap();

        assert_eq!(outcome.exit_code, EXIT_SUCCESS);
        assert_eq!(outcome.summary.files_deleted, 1);
        assert_eq!(outcome.summary.directories_removed, 1);
        assert!(root.path().join("sub/a.txt").exists());
    }
}
