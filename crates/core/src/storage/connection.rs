//! SQLite-backed key-value store.
//!
//! Opens the database, applies pragmas, runs migrations, and implements
//! [`KeyValueStore`] over the `kv_entries` table.

use super::{KeyValueStore, migrations};
use crate::Error;
use async_trait::async_trait;
use std::path::Path;
use tokio_rusqlite::{Connection, params, rusqlite};

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;
     PRAGMA foreign_keys=ON;";

/// Key-value database handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread.
#[derive(Clone, Debug)]
pub struct StoreDb {
    pub(crate) conn: Connection,
}

impl StoreDb {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies pragmas,
    /// and runs any pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn })
    }

    /// Number of stored keys.
    pub async fn len(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM kv_entries", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait]
impl KeyValueStore for StoreDb {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result = conn.query_row("SELECT value FROM kv_entries WHERE key = ?1", params![key], |row| {
                    row.get::<_, String>(0)
                });

                match result {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), Error> {
        let key = key.to_string();
        let updated_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, ?3)
                    ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        updated_at = excluded.updated_at",
                    params![key, value, updated_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn remove(&self, key: &str) -> Result<(), Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = StoreDb::open_in_memory().await.unwrap();
        let version = db
            .conn
            .call(|conn| conn.query_row("SELECT sqlite_version()", [], |row| row.get::<_, String>(0)))
            .await
            .unwrap();
        assert!(!version.is_empty());
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let db = StoreDb::open_in_memory().await.unwrap();
        assert!(db.get("kind:prefs").await.unwrap().is_none());

        db.set("kind:prefs", r#"{"completed":false}"#.to_string()).await.unwrap();
        assert_eq!(db.get("kind:prefs").await.unwrap().as_deref(), Some(r#"{"completed":false}"#));

        db.remove("kind:prefs").await.unwrap();
        assert!(db.get("kind:prefs").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let db = StoreDb::open_in_memory().await.unwrap();
        db.set("geocode_cache", "{}".to_string()).await.unwrap();
        db.set("geocode_cache", r#"{"a":1}"#.to_string()).await.unwrap();

        assert_eq!(db.get("geocode_cache").await.unwrap().as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(db.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_remove_missing_is_ok() {
        let db = StoreDb::open_in_memory().await.unwrap();
        assert!(db.remove("nope").await.is_ok());
    }

    #[tokio::test]
    async fn test_file_backed_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kind.sqlite");

        {
            let db = StoreDb::open(&path).await.unwrap();
            db.set("kind:compareItems", "[]".to_string()).await.unwrap();
        }

        let db = StoreDb::open(&path).await.unwrap();
        assert_eq!(db.get("kind:compareItems").await.unwrap().as_deref(), Some("[]"));
    }
}
