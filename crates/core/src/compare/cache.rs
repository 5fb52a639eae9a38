//! Detail payloads for compared listings.
//!
//! The comparison table needs the full public-data record of each selected
//! listing, which the selection itself does not carry. Payloads are kept in
//! one map keyed by listing id and are tagged with the registry they came
//! from.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Storage};

/// Storage key for the payload map.
pub const CACHE_KEY: &str = "kind:compareCache:v1";

/// Registry a payload was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CompareCacheType {
    /// Fair Trade Commission prepaid funeral-service registry.
    Ftc,
    /// Ministry of Health and Welfare funeral facility registry.
    Mohw,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompareCacheEntry {
    #[serde(rename = "type")]
    pub kind: CompareCacheType,
    pub title: String,
    pub payload: Value,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl CompareCacheEntry {
    /// Entry stamped with the current time.
    pub fn now(kind: CompareCacheType, title: impl Into<String>, payload: Value) -> Self {
        Self { kind, title: title.into(), payload, updated_at: chrono::Utc::now().timestamp_millis() }
    }
}

pub type CompareCacheMap = BTreeMap<String, CompareCacheEntry>;

/// Payload cache handle.
#[derive(Debug, Clone)]
pub struct CompareCache {
    storage: Storage,
}

impl CompareCache {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// The whole map; empty if absent or unreadable.
    pub async fn read_all(&self) -> CompareCacheMap {
        self.storage.read(CACHE_KEY, CompareCacheMap::new()).await
    }

    pub async fn write_all(&self, cache: &CompareCacheMap) -> Result<(), Error> {
        self.storage.write(CACHE_KEY, cache).await
    }

    pub async fn get(&self, id: &str) -> Option<CompareCacheEntry> {
        self.read_all().await.remove(id)
    }

    pub async fn upsert(&self, id: &str, entry: CompareCacheEntry) -> Result<(), Error> {
        let mut cache = self.read_all().await;
        cache.insert(id.to_string(), entry);
        self.write_all(&cache).await
    }

    /// Remove one entry. Nothing is written when the id is absent.
    pub async fn remove(&self, id: &str) -> Result<(), Error> {
        let mut cache = self.read_all().await;
        if cache.remove(id).is_none() {
            return Ok(());
        }
        self.write_all(&cache).await
    }

    /// Drop the whole map.
    pub async fn clear(&self) -> Result<(), Error> {
        self.storage.remove(CACHE_KEY).await
    }
}
