use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;

use super::{Scope, Storage};
use crate::error::StorageError;

/// In-process storage. Clones share the same maps, so two stores built on
/// clones of one `MemoryStorage` behave like two clients of one service.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<(Scope, String), String>>>,
    offline: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with `StorageError::Unavailable`
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable);
        }
        Ok(())
    }

    fn with_entries<T>(
        &self,
        f: impl FnOnce(&mut HashMap<(Scope, String), String>) -> T,
    ) -> Result<T, StorageError> {
        self.check()?;
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(f(&mut entries))
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str, scope: Scope) -> Result<Option<String>, StorageError> {
        self.with_entries(|entries| entries.get(&(scope, key.to_string())).cloned())
    }

    async fn set(&self, key: &str, value: &str, scope: Scope) -> Result<(), StorageError> {
        self.with_entries(|entries| {
            entries.insert((scope, key.to_string()), value.to_string());
        })
    }

    async fn delete(&self, key: &str, scope: Scope) -> Result<(), StorageError> {
        self.with_entries(|entries| {
            entries.remove(&(scope, key.to_string()));
        })
    }
}
