//! Top-level error wrapper types.

use crate::{
    CacheError, CatalogError, ConfigError, JsonError, PipelineError, StorageError, StoreError,
};

/// Every error condition the workspace can surface.
///
/// # Examples
///
/// ```
/// use marquee_error::{MarqueeError, MarqueeErrorKind, ConfigError, ConfigErrorKind};
///
/// let err: MarqueeError =
///     ConfigError::new(ConfigErrorKind::Invalid("catalog.base_url is empty".to_string())).into();
/// assert!(matches!(err.kind(), MarqueeErrorKind::Config(_)));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum MarqueeErrorKind {
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Byte source error
    #[from(StorageError)]
    Storage(StorageError),
    /// Cache store error
    #[from(CacheError)]
    Cache(CacheError),
    /// Catalog API error
    #[from(CatalogError)]
    Catalog(CatalogError),
    /// Metadata store error
    #[from(StoreError)]
    Store(StoreError),
    /// Orchestration error
    #[from(PipelineError)]
    Pipeline(PipelineError),
}

/// Marquee error with kind discrimination.
///
/// # Examples
///
/// ```
/// use marquee_error::{MarqueeResult, ConfigError, ConfigErrorKind};
///
/// fn might_fail() -> MarqueeResult<()> {
///     Err(ConfigError::new(ConfigErrorKind::MissingComponent("catalog".to_string())))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Marquee Error: {}", _0)]
pub struct MarqueeError(Box<MarqueeErrorKind>);

impl MarqueeError {
    /// Create a new error from a kind.
    pub fn new(kind: MarqueeErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &MarqueeErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to MarqueeErrorKind
impl<T> From<T> for MarqueeError
where
    T: Into<MarqueeErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Marquee operations.
pub type MarqueeResult<T> = std::result::Result<T, MarqueeError>;
