//! SQLite implementation of the local cache seams.
//!
//! One database file backs the plaintext cache, the session slot, and the
//! raw document cache, so a logout can wipe all of them in one place.
//! Uses rusqlite with bundled SQLite, wrapped in async via
//! tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use pagevault_core::{DecryptedResource, ResourceId, Session};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{DocumentCache, ResourceCache, SessionStore};

/// SQLite-backed cache, session slot, and document cache.
///
/// Document names are prefixed with a namespace so several installations
/// can share one database file without colliding. Thread-safe via internal
/// Mutex; all operations run on the blocking pool.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    namespace: String,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>, namespace: impl Into<String>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            namespace: namespace.into(),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory(namespace: impl Into<String>) -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            namespace: namespace.into(),
        })
    }

    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|e| {
                StoreError::Database(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
                    Some(format!("mutex poisoned: {}", e)),
                ))
            })?;
            f(&conn)
        })
        .await
        .map_err(|e| {
            StoreError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some(format!("spawn_blocking failed: {}", e)),
            ))
        })?
    }

    fn namespaced(&self, name: &str) -> String {
        format!("{}.{}", self.namespace, name)
    }
}

#[async_trait]
impl ResourceCache for SqliteStore {
    async fn put_all(&self, resources: Vec<DecryptedResource>) -> Result<()> {
        self.with_conn(move |conn| {
            for resource in &resources {
                conn.execute(
                    "INSERT OR REPLACE INTO resources (resource_id, content) VALUES (?1, ?2)",
                    params![resource.resource_id.as_str(), resource.content],
                )?;
            }
            debug!(count = resources.len(), "cached decrypted resources");
            Ok(())
        })
        .await
    }

    async fn get(&self, resource_id: &ResourceId) -> Result<Option<DecryptedResource>> {
        let resource_id = resource_id.clone();
        self.with_conn(move |conn| {
            let content: Option<String> = conn
                .query_row(
                    "SELECT content FROM resources WHERE resource_id = ?1",
                    params![resource_id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(content.map(|content| DecryptedResource {
                resource_id,
                content,
            }))
        })
        .await
    }

    async fn clear_all(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM resources", [])?;
            conn.execute("DELETE FROM documents", [])?;
            debug!("cleared resource and document caches");
            Ok(())
        })
        .await
    }

    async fn clear_records_only(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM resources", [])?;
            debug!("cleared resource cache");
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl SessionStore for SqliteStore {
    async fn load(&self) -> Result<Option<Session>> {
        let data: Option<String> = self
            .with_conn(|conn| {
                Ok(conn
                    .query_row("SELECT data FROM session WHERE slot = 0", [], |row| {
                        row.get(0)
                    })
                    .optional()?)
            })
            .await?;
        match data {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_string(session)?;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO session (slot, data) VALUES (0, ?1)",
                params![json],
            )?;
            Ok(())
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM session", [])?;
            debug!("cleared session slot");
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl DocumentCache for SqliteStore {
    async fn get_document(&self, name: &str) -> Result<Option<String>> {
        let key = self.namespaced(name);
        self.with_conn(move |conn| {
            Ok(conn
                .query_row(
                    "SELECT body FROM documents WHERE name = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?)
        })
        .await
    }

    async fn put_document(&self, name: &str, body: &str) -> Result<()> {
        let key = self.namespaced(name);
        let body = body.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO documents (name, body) VALUES (?1, ?2)",
                params![key, body],
            )?;
            Ok(())
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM documents", [])?;
            debug!("cleared document cache");
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use pagevault_core::RoleName;

    use super::*;

    #[tokio::test]
    async fn test_resource_cache_roundtrip() {
        let store = SqliteStore::open_memory("test").unwrap();
        store
            .put_all(vec![DecryptedResource {
                resource_id: ResourceId::new("frag-1"),
                content: "hello".to_string(),
            }])
            .await
            .unwrap();

        let hit = store.get(&ResourceId::new("frag-1")).await.unwrap();
        assert_eq!(hit.unwrap().content, "hello");
        assert!(store.get(&ResourceId::new("frag-2")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_records_only_keeps_documents() {
        let store = SqliteStore::open_memory("test").unwrap();
        store
            .put_all(vec![DecryptedResource {
                resource_id: ResourceId::new("frag-1"),
                content: "hello".to_string(),
            }])
            .await
            .unwrap();
        store.put_document("users", "{}").await.unwrap();

        store.clear_records_only().await.unwrap();
        assert!(store.get(&ResourceId::new("frag-1")).await.unwrap().is_none());
        assert_eq!(store.get_document("users").await.unwrap().unwrap(), "{}");

        store.clear_all().await.unwrap();
        assert!(store.get_document("users").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");

        {
            let store = SqliteStore::open(&path, "test").unwrap();
            let session = Session::new("alice", vec![RoleName::new("editor")], "token")
                .with_version("v1");
            store.save(&session).await.unwrap();
        }

        let store = SqliteStore::open(&path, "test").unwrap();
        let session = store.load().await.unwrap().unwrap();
        assert_eq!(session.username, "alice");
        assert_eq!(session.cached_version.as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn test_documents_are_namespaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");

        let a = SqliteStore::open(&path, "site-a").unwrap();
        let b = SqliteStore::open(&path, "site-b").unwrap();

        a.put_document("users", "a-doc").await.unwrap();
        assert!(b.get_document("users").await.unwrap().is_none());
        assert_eq!(a.get_document("users").await.unwrap().unwrap(), "a-doc");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_writers_share_one_connection() {
        let store = Arc::new(SqliteStore::open_memory("test").unwrap());

        let mut handles = Vec::new();
        for i in 0..4 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .put_all(vec![DecryptedResource {
                        resource_id: ResourceId::new(format!("frag-{i}")),
                        content: format!("body {i}"),
                    }])
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        for i in 0..4 {
            let hit = store.get(&ResourceId::new(format!("frag-{i}"))).await.unwrap();
            assert_eq!(hit.unwrap().content, format!("body {i}"));
        }
    }
}
