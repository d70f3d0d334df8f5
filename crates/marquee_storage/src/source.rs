//! Byte source trait definition.

use async_trait::async_trait;
use marquee_error::MarqueeResult;
use std::time::SystemTime;

/// Result of a `stat` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Total size in bytes
    pub size: u64,
    /// Last modification time, when the backend reports one
    pub modified: Option<SystemTime>,
}

/// Capability interface over a file store.
///
/// Paths are backend-relative, `/`-separated strings. Implementations must
/// return exactly the bytes `start..end` from `read_range` or fail, so that
/// content identifiers computed through different backends agree.
#[async_trait]
pub trait ByteSource: Send + Sync {
    /// Backend name (e.g., "filesystem", "http").
    fn backend_name(&self) -> &'static str;

    /// Size and modification time of a file.
    ///
    /// # Errors
    ///
    /// `StorageErrorKind::NotFound` when nothing exists at `path`.
    async fn stat(&self, path: &str) -> MarqueeResult<FileStat>;

    /// Read bytes `start..end` (end exclusive).
    async fn read_range(&self, path: &str, start: u64, end: u64) -> MarqueeResult<Vec<u8>>;

    /// Read the whole file.
    async fn read_all(&self, path: &str) -> MarqueeResult<Vec<u8>>;

    /// Create or replace a file.
    async fn write_all(&self, path: &str, data: &[u8]) -> MarqueeResult<()>;

    /// Check whether a file exists.
    async fn exists(&self, path: &str) -> MarqueeResult<bool>;
}
