//! Cache store trait and configuration.

use async_trait::async_trait;
use derive_getters::Getters;
use marquee_error::MarqueeResult;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Storage for raw catalog payloads keyed by content identifier.
///
/// Implementors provide the fallible `try_*` operations; callers use
/// [`get`](CacheStore::get) and [`put`](CacheStore::put), which treat every
/// failure as a miss or a skipped write.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read an entry.
    async fn try_get(&self, key: &str) -> MarqueeResult<Option<JsonValue>>;

    /// Create or replace an entry.
    async fn try_put(&self, key: &str, value: &JsonValue) -> MarqueeResult<()>;

    /// Read an entry, treating read failures as a miss.
    async fn get(&self, key: &str) -> Option<JsonValue> {
        match self.try_get(key).await {
            Ok(Some(value)) => {
                tracing::debug!(key, "Cache hit");
                Some(value)
            }
            Ok(None) => {
                tracing::debug!(key, "Cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Write an entry; failures are logged and swallowed.
    async fn put(&self, key: &str, value: &JsonValue) {
        match self.try_put(key, value).await {
            Ok(()) => tracing::debug!(key, "Cached payload"),
            Err(e) => tracing::warn!(key, error = %e, "Cache write failed"),
        }
    }
}

/// Configuration for the resolution cache.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(setter(into))]
pub struct CacheConfig {
    /// Whether the cache is consulted and written at all
    #[serde(default = "default_enabled")]
    #[builder(default = "default_enabled()")]
    enabled: bool,

    /// Directory holding cache entries
    #[serde(default = "default_dir")]
    #[builder(default = "default_dir()")]
    dir: String,
}

fn default_enabled() -> bool {
    true
}

fn default_dir() -> String {
    "cache".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            dir: default_dir(),
        }
    }
}
