//! Cache store error types.

/// Kinds of cache errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum CacheErrorKind {
    /// Could not read a cache entry
    #[display("Failed to read cache entry {}: {}", key, reason)]
    Read {
        /// Cache key
        key: String,
        /// Underlying reason
        reason: String,
    },
    /// Could not write a cache entry
    #[display("Failed to write cache entry {}: {}", key, reason)]
    Write {
        /// Cache key
        key: String,
        /// Underlying reason
        reason: String,
    },
    /// Stored entry is not valid JSON
    #[display("Corrupt cache entry {}: {}", key, reason)]
    Corrupt {
        /// Cache key
        key: String,
        /// Underlying reason
        reason: String,
    },
}

/// Cache error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Cache Error: {} at line {} in {}", kind, line, file)]
pub struct CacheError {
    /// The kind of error that occurred
    pub kind: CacheErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CacheError {
    /// Create a new cache error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CacheErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
