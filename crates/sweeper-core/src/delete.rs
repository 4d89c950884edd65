//! Batch deleter: consumes candidates in bounded batches and issues the
//! actual unlink/rmdir calls.
//!
//! Parallelism model: work units are the scope root's immediate
//! subdirectories (disjoint subtrees) plus one unit for the root's direct
//! files. Each worker owns its subtree end-to-end — walk and delete,
//! including the subtree's own directory — so the bottom-up ordering
//! invariant holds per subtree without any cross-worker coordination. Each
//! worker builds a local [`RunSummary`]; the caller merges them after join,
//! so totals are exact for any worker count.
//!
//! Every worker checks the deadline and the cancellation signal between
//! batches. Tripping either finishes the in-flight batch boundary, marks the
//! summary truncated, and stops pulling work; the run still reports.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::watch;

use crate::domain::{Batch, CandidateEntry, ErrorKind, RunConfig, RunSummary};
use crate::scope::{ExclusionSet, Scope};
use crate::walk::{PostOrderWalk, WalkItem};

/// Absolute point in time after which no further batch may start.
#[derive(Debug, Clone, Copy)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    pub fn after(budget: Option<Duration>) -> Self {
        Self(budget.map(|d| Instant::now() + d))
    }

    pub fn exceeded(&self) -> bool {
        match self.0 {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }
}

/// One unit of work a worker pulls from the shared queue.
#[derive(Debug)]
enum WorkUnit {
    /// A whole subtree, swept bottom-up including its own directory.
    Subtree(PathBuf),
    /// The scope root's direct (non-directory) children.
    RootFiles(Vec<PathBuf>),
}

/// Shared, immutable sweep parameters (参照は全ワーカーで共有).
struct SweepContext {
    exclusions: ExclusionSet,
    batch_size: usize,
    dry_run: bool,
    deadline: Deadline,
    cancel: watch::Receiver<bool>,
}

impl SweepContext {
    /// True when no further batch may start.
    fn should_stop(&self) -> bool {
        self.deadline.exceeded() || *self.cancel.borrow()
    }
}

/// Batch deleter over one resolved scope.
pub struct Deleter {
    config: RunConfig,
}

impl Deleter {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Sweep the scope and return the accumulated summary.
    ///
    /// Never fails: every per-path problem lands in the summary as data.
    /// `truncated` is set when the deadline or the cancellation signal cut
    /// the run short.
    pub async fn run(&self, scope: &Scope, cancel: watch::Receiver<bool>) -> RunSummary {
        let mut summary = RunSummary::new();

        let context = Arc::new(SweepContext {
            exclusions: scope.exclusions().clone(),
            batch_size: self.config.effective_batch_size(),
            dry_run: self.config.dry_run,
            deadline: Deadline::after(self.config.max_duration()),
            cancel,
        });

        let queue = partition(scope.root(), &mut summary);
        let total_units = queue.len();
        let queue = Arc::new(Mutex::new(queue));

        let worker_count = self.config.workers.max(1).min(total_units.max(1));
        tracing::debug!(worker_count, total_units, "starting sweep workers");

        let mut joins = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let queue = Arc::clone(&queue);
            let context = Arc::clone(&context);
            joins.push(tokio::task::spawn_blocking(move || {
                worker_loop(worker_id, queue, context)
            }));
        }

        for join in joins {
            match join.await {
                Ok(worker_summary) => summary.merge(worker_summary),
                Err(err) => {
                    // A panicked worker loses its local counts but must not
                    // lose the run; surface it as a run-level error record.
                    tracing::error!(%err, "sweep worker panicked");
                    summary.record_error(
                        PathBuf::new(),
                        ErrorKind::Other,
                        format!("sweep worker panicked: {err}"),
                    );
                }
            }
        }

        // Work left in the queue means we stopped early.
        if !queue.lock().expect("queue lock").is_empty() {
            summary.mark_truncated();
        }

        summary
    }
}

/// Split the scope root's immediate children into disjoint work units.
///
/// Read failures at this level are recorded as traversal errors; there is
/// nothing below them we could reach anyway.
fn partition(root: &Path, summary: &mut RunSummary) -> VecDeque<WorkUnit> {
    let mut units = VecDeque::new();
    let mut root_files = Vec::new();

    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) => {
            summary.record_error(root, ErrorKind::Traversal, format!("read_dir failed: {err}"));
            return units;
        }
    };

    let mut children = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => children.push(entry.path()),
            Err(err) => summary.record_error(
                root,
                ErrorKind::Traversal,
                format!("read_dir entry failed: {err}"),
            ),
        }
    }
    children.sort();

    for child in children {
        match fs::symlink_metadata(&child) {
            Ok(meta) if meta.file_type().is_dir() => {
                units.push_back(WorkUnit::Subtree(child));
            }
            Ok(_) => root_files.push(child),
            Err(err) => {
                summary.record_error(&child, ErrorKind::Traversal, format!("stat failed: {err}"));
            }
        }
    }

    if !root_files.is_empty() {
        units.push_back(WorkUnit::RootFiles(root_files));
    }
    units
}

/// Pull work units until the queue is drained or the run is cut short.
fn worker_loop(
    worker_id: usize,
    queue: Arc<Mutex<VecDeque<WorkUnit>>>,
    context: Arc<SweepContext>,
) -> RunSummary {
    let mut summary = RunSummary::new();

    loop {
        let unit = queue.lock().expect("queue lock").pop_front();
        let Some(unit) = unit else {
            break;
        };

        if context.should_stop() {
            // 期限切れ or キャンセル: 未処理の unit は戻して止まる
            // (truncated は「残作業があるのに止まった」ときだけ)
            queue.lock().expect("queue lock").push_front(unit);
            summary.mark_truncated();
            break;
        }

        match unit {
            WorkUnit::Subtree(dir) => {
                tracing::debug!(worker_id, path = %dir.display(), "sweeping subtree");
                sweep_subtree(&dir, &context, &mut summary);
            }
            WorkUnit::RootFiles(paths) => {
                tracing::debug!(worker_id, count = paths.len(), "sweeping root files");
                sweep_root_files(&paths, &context, &mut summary);
            }
        }
    }

    summary
}

/// Walk one subtree bottom-up and delete in batches, finishing with the
/// subtree's own directory.
fn sweep_subtree(dir: &Path, context: &SweepContext, summary: &mut RunSummary) {
    let mut batch = Batch::new(context.batch_size);
    let mut completed = true;

    for item in PostOrderWalk::new(dir) {
        match item {
            WalkItem::Entry(entry) => {
                batch.push(entry);
                if batch.is_full() {
                    if context.should_stop() {
                        // Stop consuming. Buffered candidates were never
                        // attempted, so they are not accounted.
                        summary.mark_truncated();
                        completed = false;
                        break;
                    }
                    process_batch(&mut batch, context, summary);
                }
            }
            WalkItem::Failed { path, message } => {
                summary.record_error(path, ErrorKind::Traversal, message);
            }
        }
    }

    if completed && !context.should_stop() {
        // Final partial batch, then the subtree root itself (its children
        // are gone by now if nothing was excluded or failed).
        batch.push(CandidateEntry::dir(dir));
        process_batch(&mut batch, context, summary);
    } else {
        summary.mark_truncated();
    }
}

fn sweep_root_files(paths: &[PathBuf], context: &SweepContext, summary: &mut RunSummary) {
    let mut batch = Batch::new(context.batch_size);

    for path in paths {
        let size = fs::symlink_metadata(path).map(|m| m.len()).unwrap_or(0);
        batch.push(CandidateEntry::file(path, size));
        if batch.is_full() {
            if context.should_stop() {
                summary.mark_truncated();
                return;
            }
            process_batch(&mut batch, context, summary);
        }
    }

    if batch.is_empty() {
        return;
    }
    if context.should_stop() {
        // Buffered but never attempted, so never accounted.
        summary.mark_truncated();
    } else {
        process_batch(&mut batch, context, summary);
    }
}

/// Attempt every candidate in the batch, exactly once each.
fn process_batch(batch: &mut Batch, context: &SweepContext, summary: &mut RunSummary) {
    if batch.is_empty() {
        return;
    }

    let batch_id = batch.id;
    let entries = batch.take();
    let mut deleted = 0usize;
    let mut failed = 0usize;

    for entry in entries {
        if !context.exclusions.eligible(&entry.path) {
            summary.record_excluded();
            continue;
        }

        if context.dry_run {
            tracing::info!(path = %entry.path.display(), kind = ?entry.kind, "dry-run: would delete");
            if entry.is_dir() {
                summary.record_dir_removed();
            } else {
                summary.record_file_deleted(entry.size);
            }
            continue;
        }

        match delete_entry(&entry) {
            Ok(()) => {
                deleted += 1;
                if entry.is_dir() {
                    summary.record_dir_removed();
                } else {
                    summary.record_file_deleted(entry.size);
                }
            }
            Err((kind, message)) => {
                failed += 1;
                tracing::warn!(path = %entry.path.display(), ?kind, %message, "deletion failed");
                summary.record_error(entry.path, kind, message);
            }
        }
    }

    tracing::debug!(%batch_id, deleted, failed, "batch finished");
    *batch = Batch::new(context.batch_size);
}

/// One unlink/rmdir call. A directory is removed with `remove_dir`, which
/// re-checks emptiness at the time of attempt — concurrent writers make the
/// walker's view stale, and "directory not empty" must be a recorded
/// outcome, never a crash.
fn delete_entry(entry: &CandidateEntry) -> Result<(), (ErrorKind, String)> {
    let result = if entry.is_dir() {
        fs::remove_dir(&entry.path)
    } else {
        fs::remove_file(&entry.path)
    };
    result.map_err(|err| (ErrorKind::from_io(&err), err.to_string()))
}
