//! In-memory cache store.

use crate::CacheStore;
use async_trait::async_trait;
use marquee_error::MarqueeResult;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local cache; entries live as long as the store.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, JsonValue>>,
}

impl MemoryCacheStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn try_get(&self, key: &str) -> MarqueeResult<Option<JsonValue>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn try_put(&self, key: &str, value: &JsonValue) -> MarqueeResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }
}
