use std::{path::Path, sync::Mutex};

use async_trait::async_trait;
use log::info;
use rusqlite::{params, Connection, OptionalExtension};

use super::{Scope, Storage};
use crate::error::StorageError;

const SHARED_SCOPE: &str = "shared";
const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS storage (
    scope TEXT NOT NULL,
    key   TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (scope, key)
)";

/// Storage backed by one SQLite table. Private keys are partitioned by the
/// client name, shared keys live under a single scope every client reads.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Mutex<Connection>,
    /// `client:<name>`, never equal to `SHARED_SCOPE`
    private_scope: String,
}

impl SqliteStorage {
    pub fn open(path: &Path, client: &str) -> Result<Self, StorageError> {
        if path.exists() {
            info!("Connecting to database: {}", path.display());
        } else {
            info!("Creating database: {}", path.display());
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::from_connection(Connection::open(path)?, client)
    }

    pub fn from_connection(conn: Connection, client: &str) -> Result<Self, StorageError> {
        conn.execute_batch(CREATE_TABLE_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
            private_scope: format!("client:{}", client),
        })
    }

    fn scope(&self, scope: Scope) -> &str {
        match scope {
            Scope::Private => &self.private_scope,
            Scope::Shared => SHARED_SCOPE,
        }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(f(&conn)?)
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn get(&self, key: &str, scope: Scope) -> Result<Option<String>, StorageError> {
        let scope = self.scope(scope);
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM storage WHERE scope = ?1 AND key = ?2",
                params![scope, key],
                |row| row.get(0),
            )
            .optional()
        })
    }

    async fn set(&self, key: &str, value: &str, scope: Scope) -> Result<(), StorageError> {
        let scope = self.scope(scope);
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO storage (scope, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT (scope, key) DO UPDATE SET value = excluded.value",
                params![scope, key, value],
            )
        })?;
        Ok(())
    }

    async fn delete(&self, key: &str, scope: Scope) -> Result<(), StorageError> {
        let scope = self.scope(scope);
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM storage WHERE scope = ?1 AND key = ?2",
                params![scope, key],
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(client: &str) -> SqliteStorage {
        let conn = Connection::open_in_memory().unwrap();
        SqliteStorage::from_connection(conn, client).unwrap()
    }

    #[tokio::test]
    async fn set_overwrites_and_delete_removes() {
        let storage = storage("local");
        assert_eq!(storage.get("k", Scope::Shared).await.unwrap(), None);

        storage.set("k", "one", Scope::Shared).await.unwrap();
        storage.set("k", "two", Scope::Shared).await.unwrap();
        assert_eq!(storage.get("k", Scope::Shared).await.unwrap().as_deref(), Some("two"));

        storage.delete("k", Scope::Shared).await.unwrap();
        assert_eq!(storage.get("k", Scope::Shared).await.unwrap(), None);

        // deleting a missing key is fine
        storage.delete("k", Scope::Shared).await.unwrap();
    }

    #[tokio::test]
    async fn private_keys_are_per_client() {
        let path = std::env::temp_dir().join(format!("emoji-feed-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let a = SqliteStorage::open(&path, "a").unwrap();
        let b = SqliteStorage::open(&path, "b").unwrap();

        a.set("current_user", "alice", Scope::Private).await.unwrap();
        a.set("all_posts", "[]", Scope::Shared).await.unwrap();

        assert_eq!(b.get("current_user", Scope::Private).await.unwrap(), None);
        assert_eq!(b.get("all_posts", Scope::Shared).await.unwrap().as_deref(), Some("[]"));

        // a client named like the shared scope still keeps its keys private
        let shared = SqliteStorage::open(&path, SHARED_SCOPE).unwrap();
        shared.set("current_user", "aram", Scope::Private).await.unwrap();
        assert_eq!(shared.get("current_user", Scope::Private).await.unwrap().as_deref(), Some("aram"));
        assert_eq!(a.get("current_user", Scope::Shared).await.unwrap(), None);
        assert_eq!(b.get("current_user", Scope::Shared).await.unwrap(), None);

        drop((a, b, shared));
        let _ = std::fs::remove_file(&path);
    }
}
