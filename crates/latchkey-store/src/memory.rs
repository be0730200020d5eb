//! In-memory store: the fallback when no secure storage is available.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{check_key, SessionStore, StoreError};

/// A [`SessionStore`] that keeps everything in a process-lifetime map.
///
/// Nothing written here survives a restart. It is what
/// [`PlatformStore`](crate::PlatformStore) maps to when the secure store
/// can't be opened, and it's the store of choice in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of keys currently holding a value.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` if no key holds a value.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl SessionStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        check_key(key)?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        tracing::trace!(key, "memory store: value set");
        Ok(())
    }

    async fn erase(&self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.entries.write().await.remove(key);
        tracing::trace!(key, "memory store: key erased");
        Ok(())
    }
}
