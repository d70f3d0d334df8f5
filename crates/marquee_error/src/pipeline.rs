//! Pipeline orchestration error types.

use std::time::Duration;

/// Pipeline-specific error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PipelineErrorKind {
    /// A stage exceeded its time budget
    #[display("Stage '{}' timed out after {:?}", stage, budget)]
    StageTimeout {
        /// Stage name
        stage: String,
        /// Time budget that was exceeded
        budget: Duration,
    },
    /// The task running the work item panicked or was aborted
    #[display("Work item task aborted: {}", _0)]
    TaskAborted(String),
}

/// Pipeline error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The kind of error that occurred
    pub kind: PipelineErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new pipeline error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
