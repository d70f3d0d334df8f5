//! Configuration and intake error types.

/// What went wrong while assembling run inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// A configuration layer could not be read or merged
    #[display("Cannot load configuration from {}: {}", origin, reason)]
    Load {
        /// File or layer name
        origin: String,
        /// Underlying reason
        reason: String,
    },
    /// Merged settings do not fit the expected shape
    #[display("Invalid configuration: {}", _0)]
    Invalid(String),
    /// A work item file could not be read
    #[display("Cannot read work items from {}: {}", path, reason)]
    Intake {
        /// Work item file
        path: String,
        /// Underlying reason
        reason: String,
    },
    /// A required component was not supplied
    #[display("Missing component: {}", _0)]
    MissingComponent(String),
}

/// Configuration error with location tracking.
///
/// # Examples
///
/// ```
/// use marquee_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::Invalid("pipeline.concurrency".to_string()));
/// assert!(err.to_string().contains("pipeline.concurrency"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// The kind of error that occurred
    pub kind: ConfigErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new configuration error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
