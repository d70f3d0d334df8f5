//! Metadata store error types.

/// Kinds of metadata store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StoreErrorKind {
    /// Failed to build the HTTP client
    #[display("Failed to create store client: {}", _0)]
    ClientCreation(String),
    /// Store could not be reached
    #[display("Store request failed: {}", _0)]
    Transport(String),
    /// Store answered with an unexpected status
    #[display("Store returned HTTP {}: {}", status_code, message)]
    HttpStatus {
        /// HTTP status code
        status_code: u16,
        /// Response body
        message: String,
    },
    /// Store response could not be decoded
    #[display("Failed to parse store response: {}", _0)]
    Parse(String),
}

/// Metadata store error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    /// The kind of error that occurred
    pub kind: StoreErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StoreError {
    /// Create a new store error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
