//! Candidate entries discovered by traversal.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What kind of filesystem object a candidate is.
///
/// Symbolic links are File-kind: only the link itself may be unlinked, its
/// target is never followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Dir,
}

/// A discovered path considered for deletion.
///
/// Produced by the walker, consumed and discarded by the deleter. `size` is
/// best-effort (0 when stat fails) and only feeds the `bytesFreed` counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
    pub size: u64,
}

impl CandidateEntry {
    pub fn file(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            size,
        }
    }

    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Dir,
            size: 0,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_kind() {
        let f = CandidateEntry::file("/mnt/share/a.txt", 42);
        assert_eq!(f.kind, EntryKind::File);
        assert_eq!(f.size, 42);
        assert!(!f.is_dir());

        let d = CandidateEntry::dir("/mnt/share/sub");
        assert!(d.is_dir());
        assert_eq!(d.size, 0);
    }
}
