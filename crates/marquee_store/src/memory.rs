//! In-memory metadata store.

use crate::{MetadataStore, Properties};
use async_trait::async_trait;
use marquee_core::CallOutcome;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default, Clone)]
struct StoredItem {
    properties: Properties,
    sets: HashMap<String, Vec<String>>,
}

/// Process-local metadata store.
///
/// Set members keep insertion order.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    items: RwLock<HashMap<String, StoredItem>>,
}

impl MemoryMetadataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Members of a named set, in insertion order.
    pub async fn members(&self, item_ref: &str, set: &str) -> Vec<String> {
        self.items
            .read()
            .await
            .get(item_ref)
            .and_then(|item| item.sets.get(set))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn set(&self, item_ref: &str, key: &str, value: &JsonValue) -> CallOutcome<()> {
        self.items
            .write()
            .await
            .entry(item_ref.to_string())
            .or_default()
            .properties
            .insert(key.to_string(), value.clone());
        CallOutcome::Success(())
    }

    async fn get(&self, item_ref: &str, key: &str) -> CallOutcome<JsonValue> {
        match self
            .items
            .read()
            .await
            .get(item_ref)
            .and_then(|item| item.properties.get(key))
        {
            Some(value) => CallOutcome::Success(value.clone()),
            None => CallOutcome::NotFound,
        }
    }

    async fn merge(&self, item_ref: &str, properties: &Properties) -> CallOutcome<()> {
        let mut items = self.items.write().await;
        let item = items.entry(item_ref.to_string()).or_default();
        for (key, value) in properties {
            item.properties.insert(key.clone(), value.clone());
        }
        CallOutcome::Success(())
    }

    async fn delete(&self, item_ref: &str, key: &str) -> CallOutcome<()> {
        match self
            .items
            .write()
            .await
            .get_mut(item_ref)
            .and_then(|item| item.properties.remove(key))
        {
            Some(_) => CallOutcome::Success(()),
            None => CallOutcome::NotFound,
        }
    }

    async fn add_to_set(&self, item_ref: &str, set: &str, value: &str) -> CallOutcome<()> {
        let mut items = self.items.write().await;
        let members = items
            .entry(item_ref.to_string())
            .or_default()
            .sets
            .entry(set.to_string())
            .or_default();
        if !members.iter().any(|m| m == value) {
            members.push(value.to_string());
        }
        CallOutcome::Success(())
    }

    async fn fetch_all(&self, item_ref: &str) -> CallOutcome<Properties> {
        match self.items.read().await.get(item_ref) {
            Some(item) => CallOutcome::Success(item.properties.clone()),
            None => CallOutcome::NotFound,
        }
    }
}
