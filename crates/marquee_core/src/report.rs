//! Completion reports emitted once per work item.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Terminal status of one work item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CompletionStatus {
    /// A genuine attempt was made (possibly finding nothing)
    Completed,
    /// Preconditions said there was nothing to do
    Skipped,
    /// An unexpected fault stopped the run
    Failed,
}

/// Completion signal for one work item.
///
/// # Examples
///
/// ```
/// use marquee_core::{CompletionReport, CompletionStatus};
/// use std::time::Duration;
///
/// let report = CompletionReport::skipped("a1b2", Duration::from_millis(3), "not a video");
/// assert_eq!(report.status, CompletionStatus::Skipped);
/// assert_eq!(report.reason.as_deref(), Some("not a video"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionReport {
    /// Store-level content reference of the work item
    pub content_ref: String,
    /// Terminal status
    pub status: CompletionStatus,
    /// Wall-clock duration of the run in milliseconds
    pub elapsed_ms: u64,
    /// Error detail for failed runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Why the run was skipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Number of store operations that succeeded
    #[serde(default)]
    pub fields_written: usize,
}

impl CompletionReport {
    /// A completed run.
    pub fn completed(content_ref: impl Into<String>, elapsed: Duration, fields_written: usize) -> Self {
        Self {
            content_ref: content_ref.into(),
            status: CompletionStatus::Completed,
            elapsed_ms: elapsed.as_millis() as u64,
            error: None,
            reason: None,
            fields_written,
        }
    }

    /// A skipped run.
    pub fn skipped(
        content_ref: impl Into<String>,
        elapsed: Duration,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            content_ref: content_ref.into(),
            status: CompletionStatus::Skipped,
            elapsed_ms: elapsed.as_millis() as u64,
            error: None,
            reason: Some(reason.into()),
            fields_written: 0,
        }
    }

    /// A failed run.
    pub fn failed(content_ref: impl Into<String>, elapsed: Duration, error: impl Into<String>) -> Self {
        Self {
            content_ref: content_ref.into(),
            status: CompletionStatus::Failed,
            elapsed_ms: elapsed.as_millis() as u64,
            error: Some(error.into()),
            reason: None,
            fields_written: 0,
        }
    }
}
