//! Catalog API error types and retry classification.

/// Catalog-specific error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CatalogErrorKind {
    /// Failed to build the HTTP client
    #[display("Failed to create catalog client: {}", _0)]
    ClientCreation(String),
    /// Request never produced a response
    #[display("Catalog request failed: {}", _0)]
    Transport(String),
    /// Request exceeded its deadline
    #[display("Catalog request timed out: {}", _0)]
    Timeout(String),
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    HttpStatus {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// Response body did not match the expected shape
    #[display("Failed to parse catalog response: {}", _0)]
    Parse(String),
    /// Payload lacks the fields needed to build a record
    #[display("Catalog payload cannot be normalized: {}", _0)]
    Normalize(String),
}

impl CatalogErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            CatalogErrorKind::HttpStatus { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            CatalogErrorKind::Transport(_) => true,
            CatalogErrorKind::Timeout(_) => true,
            _ => false,
        }
    }

    /// Whether the catalog reported that the requested resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogErrorKind::HttpStatus { status_code: 404, .. })
    }
}

/// Catalog error with location tracking.
///
/// # Examples
///
/// ```
/// use marquee_error::{CatalogError, CatalogErrorKind};
///
/// let err = CatalogError::new(CatalogErrorKind::HttpStatus {
///     status_code: 503,
///     message: "busy".to_string(),
/// });
/// assert!(err.kind.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Catalog Error: {} at line {} in {}", kind, line, file)]
pub struct CatalogError {
    /// The kind of error that occurred
    pub kind: CatalogErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CatalogError {
    /// Create a new catalog error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CatalogErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
