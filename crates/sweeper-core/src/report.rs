//! Run reporter: pure formatting of the output record and exit-code mapping.
//!
//! No filesystem access here. An empty run or an all-errors run is a normal
//! outcome and still produces a record — a scheduled job that dies silently
//! is worse than one that reports a bad night.

use crate::domain::RunSummary;

/// Run completed; error rate within threshold.
pub const EXIT_SUCCESS: i32 = 0;
/// Scope resolution failed (nothing deleted), or error rate above threshold.
pub const EXIT_SCOPE_FAILURE: i32 = 1;
/// Run truncated by the duration budget or a cancellation signal.
pub const EXIT_TRUNCATED: i32 = 2;

/// Render the machine-parseable output record (one JSON object, one line).
pub fn render(summary: &RunSummary) -> serde_json::Result<String> {
    serde_json::to_string(summary)
}

/// Map a finalized summary to the process exit code.
///
/// Truncation wins over the error-rate threshold: the external scheduler
/// needs to know the window was blown regardless of how the attempted work
/// went.
pub fn exit_code(summary: &RunSummary, error_rate_threshold: f64) -> i32 {
    if summary.truncated {
        return EXIT_TRUNCATED;
    }
    if summary.error_rate() > error_rate_threshold {
        return EXIT_SCOPE_FAILURE;
    }
    EXIT_SUCCESS
}
