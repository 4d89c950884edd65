//! Tree walker: lazy depth-first post-order traversal.
//!
//! Files are yielded before their parent directory, and a directory is only
//! yielded after all of its children — so the deleter can remove now-empty
//! directories bottom-up in a single pass.
//!
//! Hard safety rule: symbolic links are NEVER followed. A symlink is yielded
//! as a File-kind candidate (only the link itself may be unlinked), even when
//! it points at a directory. Traversal therefore follows only real directory
//! edges and cannot loop.
//!
//! An unreadable subtree (permission denied, vanished entry) is reported as a
//! [`WalkItem::Failed`] and skipped; siblings keep going. One bad entry must
//! not void an entire day's cleanup.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::CandidateEntry;

/// One item of a traversal: a deletion candidate, or a subtree that could
/// not be read.
#[derive(Debug)]
pub enum WalkItem {
    Entry(CandidateEntry),
    Failed { path: PathBuf, message: String },
}

struct Frame {
    dir: PathBuf,
    children: VecDeque<PathBuf>,
}

/// Lazy post-order traversal of one scope root.
///
/// Restartable: a fresh `PostOrderWalk::new` begins a fresh traversal, there
/// is no cross-call state. The root itself is never yielded.
pub struct PostOrderWalk {
    stack: Vec<Frame>,
    pending: VecDeque<WalkItem>,
}

impl PostOrderWalk {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let mut pending = VecDeque::new();
        let mut stack = Vec::new();

        match read_children(&root, &mut pending) {
            Some(children) => stack.push(Frame { dir: root, children }),
            None => {} // root unreadable: the Failed item is already pending
        }

        Self { stack, pending }
    }
}

impl Iterator for PostOrderWalk {
    type Item = WalkItem;

    fn next(&mut self) -> Option<WalkItem> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(item);
            }

            let frame = self.stack.last_mut()?;

            let Some(child) = frame.children.pop_front() else {
                // Frame exhausted: yield the directory itself, unless it is
                // the scope root (the root is never a candidate).
                let frame = self.stack.pop().expect("frame exists");
                if self.stack.is_empty() {
                    return None;
                }
                return Some(WalkItem::Entry(CandidateEntry::dir(frame.dir)));
            };

            // symlink_metadata: stat without following links
            let meta = match fs::symlink_metadata(&child) {
                Ok(meta) => meta,
                Err(err) => {
                    // vanished or unstat-able entry
                    return Some(WalkItem::Failed {
                        path: child,
                        message: format!("stat failed: {err}"),
                    });
                }
            };

            if meta.file_type().is_dir() {
                match read_children(&child, &mut self.pending) {
                    Some(children) => {
                        self.stack.push(Frame { dir: child, children });
                        // Descending yields nothing by itself; loop on.
                    }
                    None => {
                        // pending already holds the Failed item; subtree skipped
                    }
                }
            } else {
                // Regular files and symlinks alike: unlink candidates.
                return Some(WalkItem::Entry(CandidateEntry::file(child, meta.len())));
            }
        }
    }
}

/// Read a directory's children (sorted for deterministic traversal).
///
/// On failure, queues a `Failed` item for the directory and returns `None`
/// so the caller skips the subtree. Individual unreadable entries are queued
/// the same way without aborting the listing.
fn read_children(dir: &Path, pending: &mut VecDeque<WalkItem>) -> Option<VecDeque<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(path = %dir.display(), %err, "skipping unreadable subtree");
            pending.push_back(WalkItem::Failed {
                path: dir.to_path_buf(),
                message: format!("read_dir failed: {err}"),
            });
            return None;
        }
    };

    let mut children = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => children.push(entry.path()),
            Err(err) => pending.push_back(WalkItem::Failed {
                path: dir.to_path_buf(),
                message: format!("read_dir entry failed: {err}"),
            }),
        }
    }
    children.sort();
    Some(children.into())
}
