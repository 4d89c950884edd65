//! Domain identifiers (strongly-typed IDs).
//!
//! ULID ベースの ID + ジェネリック実装:
//! - **時刻でソート可能**: timestamp が先頭にあるため、生成順序でソートできる
//! - **調整なしで生成可能**: 複数の並列 run でも衝突しない
//!
//! `Id<T>` は Phantom type パターンで共通実装を提供しつつ、
//! `RunId` と `BatchId` を混同できないようにする。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"run-", "batch-"）を提供する。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
///
/// `T` は PhantomData で、実行時にはメモリを消費しないが、
/// コンパイル時に型安全性を提供する。
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    /// Allocate a fresh id.
    pub fn generate() -> Self {
        Self::from_ulid(Ulid::new())
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// Run のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Run {}

impl IdMarker for Run {
    fn prefix() -> &'static str {
        "run-"
    }
}

/// Batch のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Batch {}

impl IdMarker for Batch {
    fn prefix() -> &'static str {
        "batch-"
    }
}

/// Identifier of one invocation of the deletion runner.
pub type RunId = Id<Run>;

/// Identifier of one bounded group of candidates.
pub type BatchId = Id<Batch>;
