//! Metadata store trait and configuration.

use crate::{HttpMetadataStore, MemoryMetadataStore};
use async_trait::async_trait;
use derive_getters::Getters;
use marquee_core::CallOutcome;
use marquee_error::MarqueeResult;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

/// Property map of one store item.
pub type Properties = serde_json::Map<String, JsonValue>;

/// Operations on the downstream metadata store.
///
/// Writes are idempotent: merging the same properties or adding the same set
/// member twice leaves the item unchanged.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Create or replace a single property.
    async fn set(&self, item_ref: &str, key: &str, value: &JsonValue) -> CallOutcome<()>;

    /// Read a single property.
    async fn get(&self, item_ref: &str, key: &str) -> CallOutcome<JsonValue>;

    /// Create or replace several properties at once.
    async fn merge(&self, item_ref: &str, properties: &Properties) -> CallOutcome<()>;

    /// Remove a property.
    async fn delete(&self, item_ref: &str, key: &str) -> CallOutcome<()>;

    /// Add a member to a named set; a no-op when already present.
    async fn add_to_set(&self, item_ref: &str, set: &str, value: &str) -> CallOutcome<()>;

    /// Read every property of an item.
    async fn fetch_all(&self, item_ref: &str) -> CallOutcome<Properties>;
}

/// Configuration for the metadata store client.
///
/// Without a base URL, writes go to a process-local store.
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
pub struct StoreConfig {
    /// Store API base URL
    #[serde(default)]
    #[builder(default)]
    base_url: Option<String>,

    /// Bearer token
    #[serde(default)]
    #[builder(default)]
    token: Option<String>,

    /// Per-request timeout, seconds
    #[serde(default = "default_timeout_secs")]
    #[builder(default = "default_timeout_secs()")]
    timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl StoreConfig {
    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build the configured store.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn build(&self) -> MarqueeResult<Arc<dyn MetadataStore>> {
        match &self.base_url {
            Some(base_url) => Ok(Arc::new(HttpMetadataStore::new(
                base_url,
                self.token.clone(),
                self.timeout(),
            )?)),
            None => {
                tracing::info!("No metadata store configured, writing to memory");
                Ok(Arc::new(MemoryMetadataStore::new()))
            }
        }
    }
}
