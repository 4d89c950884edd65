//! sweeper-core
//!
//! Core building blocks for the sweeper deletion runner: safe, scoped,
//! auditable bulk deletion on an already-mounted shared filesystem, invoked
//! on a cadence by an external scheduler.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（config, entry, batch, summary, errors, ids）
//! - **scope**: スコープ解決（mount root + tenant + exclusion patterns）
//! - **walk**: post-order 走査（symlink は絶対に辿らない）
//! - **delete**: バッチ削除（dry-run, deadline, worker pool, 集計）
//! - **report**: 出力レコードの整形と exit code の決定
//! - **app**: パイプライン全体のオーケストレーション（Runner）
//!
//! The run is a pure function from (configuration, filesystem state) to
//! (filesystem mutation, run summary). Only scope resolution can fail the
//! process; every per-path problem is accumulated into the summary as data.

pub mod app;
pub mod delete;
pub mod domain;
pub mod report;
pub mod scope;
pub mod walk;

pub use app::{RunOutcome, Runner};
pub use domain::{RunConfig, RunSummary};
