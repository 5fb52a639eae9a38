//! Local key-value persistence shared by every store.
//!
//! Values are JSON documents under string keys. Backends implement
//! [`KeyValueStore`] on raw strings; [`Storage`] layers the typed contract
//! the stores rely on:
//!
//! - `read` never fails: a missing key, undecodable JSON or an unavailable
//!   backend all yield the caller's fallback.
//! - `write` and `remove` report failures, and callers are free to ignore them.
//!
//! Backends: SQLite via tokio-rusqlite ([`StoreDb`]) and a process-local map
//! ([`MemoryStore`]).

pub mod connection;
pub mod memory;
pub mod migrations;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::Error;

pub use connection::StoreDb;
pub use memory::MemoryStore;

/// Raw string key-value backend.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the raw JSON stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store raw JSON under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), Error>;

    /// Delete `key`. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), Error>;
}

/// Typed handle over a shared backend.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self { backend: Arc::new(backend) }
    }

    pub fn from_arc(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Storage that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::default())
    }

    /// Read and decode `key`, returning `fallback` on any failure.
    pub async fn read<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let raw = match self.backend.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return fallback,
            Err(e) => {
                tracing::warn!(key, error = %e, "storage read failed, using fallback");
                return fallback;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "stored value is not valid JSON, using fallback");
                fallback
            }
        }
    }

    /// Encode and store `value` under `key`.
    pub async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), Error> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(key, raw).await
    }

    /// Delete `key`.
    pub async fn remove(&self, key: &str) -> Result<(), Error> {
        self.backend.remove(key).await
    }

    /// Write and log instead of returning a failure.
    pub(crate) async fn write_best_effort<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.write(key, value).await {
            tracing::warn!(key, error = %e, "storage write failed, keeping in-memory state");
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend that rejects every operation, like a disabled or full browser store.
    #[derive(Debug, Default)]
    pub struct UnavailableStore {
        pub attempts: AtomicUsize,
    }

    #[async_trait]
    impl KeyValueStore for UnavailableStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, Error> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(Error::StorageUnavailable("storage disabled".into()))
        }

        async fn set(&self, _key: &str, _value: String) -> Result<(), Error> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(Error::StorageUnavailable("quota exceeded".into()))
        }

        async fn remove(&self, _key: &str) -> Result<(), Error> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(Error::StorageUnavailable("storage disabled".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::UnavailableStore;
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_read_missing_returns_fallback() {
        let storage = Storage::in_memory();
        let value: Vec<String> = storage.read("missing", vec!["fallback".to_string()]).await;
        assert_eq!(value, vec!["fallback".to_string()]);
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let storage = Storage::in_memory();
        let mut map = HashMap::new();
        map.insert("a".to_string(), 1u32);
        storage.write("map", &map).await.unwrap();

        let read: HashMap<String, u32> = storage.read("map", HashMap::new()).await;
        assert_eq!(read.get("a"), Some(&1));
    }

    #[tokio::test]
    async fn test_invalid_json_returns_fallback() {
        let backend = MemoryStore::default();
        backend.set("broken", "{not json".to_string()).await.unwrap();
        let storage = Storage::new(backend);

        let value: Vec<u32> = storage.read("broken", Vec::new()).await;
        assert!(value.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_shape_returns_fallback() {
        let storage = Storage::in_memory();
        storage.write("shape", &"a string").await.unwrap();

        let value: Vec<u32> = storage.read("shape", vec![7]).await;
        assert_eq!(value, vec![7]);
    }

    #[tokio::test]
    async fn test_unavailable_backend() {
        let storage = Storage::new(UnavailableStore::default());

        let value: u32 = storage.read("anything", 42).await;
        assert_eq!(value, 42);

        assert!(matches!(storage.write("anything", &1u32).await, Err(Error::StorageUnavailable(_))));
        assert!(storage.remove("anything").await.is_err());

        storage.write_best_effort("anything", &1u32).await;
    }

    #[tokio::test]
    async fn test_sqlite_backend_through_storage() {
        let db = StoreDb::open_in_memory().await.unwrap();
        let storage = Storage::new(db);

        storage.write("kind:prefs", &serde_json::json!({"completed": true})).await.unwrap();
        let value: serde_json::Value = storage.read("kind:prefs", serde_json::Value::Null).await;
        assert_eq!(value["completed"], true);

        storage.remove("kind:prefs").await.unwrap();
        let value: serde_json::Value = storage.read("kind:prefs", serde_json::Value::Null).await;
        assert!(value.is_null());
    }
}
