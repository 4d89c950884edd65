//! Domain model (configuration, candidates, summary, errors, IDs).

pub mod batch;
pub mod config;
pub mod entry;
pub mod errors;
pub mod ids;
pub mod summary;

pub use self::batch::Batch;
pub use self::config::RunConfig;
pub use self::entry::{CandidateEntry, EntryKind};
pub use self::errors::{ErrorKind, InvalidScopeError};
pub use self::ids::{BatchId, RunId};
pub use self::summary::{ErrorRecord, RunSummary};
