//! File-backed cache store.

use crate::CacheStore;
use async_trait::async_trait;
use marquee_error::{CacheError, CacheErrorKind, MarqueeResult};
use serde_json::Value as JsonValue;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Durable cache holding one JSON file per entry.
///
/// Layout: `{dir}/{key[0:2]}/{key[2:4]}/{key}.json`. Every write goes
/// through its own temporary file and a rename, so concurrent writers of the
/// same key leave one complete entry behind (last write wins).
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    /// Create a cache rooted at `dir`; the directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        tracing::debug!(dir = %dir.display(), "Creating file cache store");
        Self { dir }
    }

    /// Root directory of the cache.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, CacheError> {
        if key.len() < 4 || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CacheError::new(CacheErrorKind::Read {
                key: key.to_string(),
                reason: "keys must be at least 4 ASCII alphanumeric characters".to_string(),
            }));
        }
        Ok(self
            .dir
            .join(&key[0..2])
            .join(&key[2..4])
            .join(format!("{key}.json")))
    }
}

#[async_trait]
impl CacheStore for FileCacheStore {
    #[tracing::instrument(skip(self))]
    async fn try_get(&self, key: &str) -> MarqueeResult<Option<JsonValue>> {
        let path = self.entry_path(key)?;

        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CacheError::new(CacheErrorKind::Read {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
                .into());
            }
        };

        let value = serde_json::from_slice(&data).map_err(|e| {
            CacheError::new(CacheErrorKind::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })
        })?;
        Ok(Some(value))
    }

    #[tracing::instrument(skip(self, value))]
    async fn try_put(&self, key: &str, value: &JsonValue) -> MarqueeResult<()> {
        let path = self.entry_path(key)?;
        let write_error = |reason: String| {
            CacheError::new(CacheErrorKind::Write {
                key: key.to_string(),
                reason,
            })
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| write_error(format!("{}: {}", parent.display(), e)))?;
        }

        let data = serde_json::to_vec(value).map_err(|e| write_error(e.to_string()))?;
        let size = data.len();
        let target = path.clone();
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let dir = target.parent().unwrap_or(Path::new("."));
            let mut temp = tempfile::NamedTempFile::new_in(dir)?;
            temp.write_all(&data)?;
            temp.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| write_error(e.to_string()))?
        .map_err(|e| write_error(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), size, "Wrote cache entry");
        Ok(())
    }
}
