//! App - アプリケーション層
//!
//! domain / scope / walk / delete / report を束ねて 1 回の run を実行する。
//!
//! # 主要コンポーネント
//! - **Runner**: Resolving → Sweeping → Reporting のパイプライン

pub mod runner;

pub use self::runner::{RunOutcome, Runner};
