//! Byte source error types.

/// Kinds of byte source errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Failed to create a directory
    #[display("Failed to create directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write file
    #[display("Failed to write file: {}", _0)]
    FileWrite(String),
    /// Failed to read file
    #[display("Failed to read file: {}", _0)]
    FileRead(String),
    /// Nothing exists at the specified location
    #[display("File not found: {}", _0)]
    NotFound(String),
    /// Requested byte range lies outside the file
    #[display("Invalid byte range {}..{} for {}", start, end, path)]
    InvalidRange {
        /// Path that was read
        path: String,
        /// Inclusive start offset
        start: u64,
        /// Exclusive end offset
        end: u64,
    },
    /// Invalid storage path
    #[display("Invalid storage path: {}", _0)]
    InvalidPath(String),
    /// Invalid backend configuration
    #[display("Invalid configuration: {}", _0)]
    InvalidConfig(String),
    /// Backend is unreachable
    #[display("Storage unavailable: {}", _0)]
    Unavailable(String),
    /// Digest could not be wrapped into a content identifier
    #[display("Failed to derive content identifier: {}", _0)]
    Digest(String),
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use marquee_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::NotFound("/path/to/file".to_string()));
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether the error means the path does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, StorageErrorKind::NotFound(_))
    }
}
