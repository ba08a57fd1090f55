mod memory;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StorageError;

/// Who can see a key
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Scope {
    /// Only the current client
    Private,
    /// Every client of the service
    Shared,
}

/// String key-value service. Absence is `Ok(None)`, never an error.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, key: &str, scope: Scope) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str, scope: Scope) -> Result<(), StorageError>;
    async fn delete(&self, key: &str, scope: Scope) -> Result<(), StorageError>;
}

#[async_trait]
impl<T: Storage + ?Sized> Storage for Arc<T> {
    async fn get(&self, key: &str, scope: Scope) -> Result<Option<String>, StorageError> {
        (**self).get(key, scope).await
    }
    async fn set(&self, key: &str, value: &str, scope: Scope) -> Result<(), StorageError> {
        (**self).set(key, value, scope).await
    }
    async fn delete(&self, key: &str, scope: Scope) -> Result<(), StorageError> {
        (**self).delete(key, scope).await
    }
}
