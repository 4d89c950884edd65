//! Error taxonomy.
//!
//! Two very different kinds of failure live here:
//! - [`InvalidScopeError`]: fatal, aborts the run before anything is deleted.
//! - [`ErrorKind`]: per-path classification, accumulated into the summary as
//!   data. A bulk deletion job must always finish and report; one bad path
//!   never stops the run.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;

/// Fatal scope-resolution failure (exit code 1, zero deletions performed).
#[derive(Debug, thiserror::Error)]
pub enum InvalidScopeError {
    /// The tenant segment resolved outside the mount root.
    #[error("tenant {tenant:?} escapes mount root {mount_root}")]
    EscapesRoot { tenant: String, mount_root: PathBuf },

    #[error("scope root does not exist: {0}")]
    Missing(PathBuf),

    #[error("scope root is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("invalid exclusion pattern {pattern:?}: {source}")]
    BadPattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("failed to canonicalize {path}: {source}")]
    Canonicalize {
        path: PathBuf,
        source: io::Error,
    },
}

/// ErrorKind は per-path エラーの分類
///
/// # 分類
/// - PermissionDenied: unlink/rmdir が EACCES/EPERM で拒否された
/// - NotFound: 対象が既に消えていた（並行 run でも正常な結果）
/// - NotEmpty: ディレクトリが空でなかった（並行書き込みのレース）
/// - Traversal: subtree の走査自体に失敗した（その subtree はスキップ）
/// - Other: 上記以外
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    PermissionDenied,
    NotFound,
    NotEmpty,
    Traversal,
    Other,
}

impl ErrorKind {
    /// Classify a deletion failure from the underlying io error.
    ///
    /// Traversal is never produced here; it is assigned by the walker when a
    /// whole subtree cannot be read.
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::DirectoryNotEmpty => Self::NotEmpty,
            _ => Self::Other,
        }
    }
}
