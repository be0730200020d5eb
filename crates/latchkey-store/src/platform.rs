//! Maps platform capability to a concrete store.
//!
//! Devices with a usable private data directory get the durable
//! [`FileStore`]. Everywhere else (read-only filesystems, sandboxes with no
//! writable location) the session falls back to a [`MemoryStore`]: weaker,
//! since nothing survives a restart, but the app still works and the user
//! simply signs in again next launch.

use std::path::PathBuf;

use crate::{FileStore, MemoryStore, SessionStore, StoreError};

/// Key written and erased once when probing the secure store.
const CHECK_KEY: &str = "latchkey_check";

/// The store chosen for this device.
#[derive(Debug)]
pub enum PlatformStore {
    /// Durable, owner-only file storage.
    Secure(FileStore),
    /// Process-lifetime fallback.
    Fallback(MemoryStore),
}

impl PlatformStore {
    /// Opens the secure store at `dir`, or falls back to memory if it
    /// can't be used.
    ///
    /// The secure store counts as usable only if a check value can be
    /// written, read back, and erased.
    pub async fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        match check_usable(dir.clone()).await {
            Ok(store) => {
                tracing::info!(dir = %dir.display(), "using secure file store");
                Self::Secure(store)
            }
            Err(e) => {
                tracing::warn!(
                    dir = %dir.display(),
                    error = %e,
                    "secure store unavailable, falling back to memory; \
                     sessions will not survive a restart"
                );
                Self::Fallback(MemoryStore::new())
            }
        }
    }

    /// A store that never touches the disk.
    pub fn memory() -> Self {
        Self::Fallback(MemoryStore::new())
    }

    /// Returns `true` if values persist across restarts.
    pub fn is_secure(&self) -> bool {
        matches!(self, Self::Secure(_))
    }
}

async fn check_usable(dir: PathBuf) -> Result<FileStore, StoreError> {
    let store = FileStore::open(dir).await?;
    store.set(CHECK_KEY, "ok").await?;
    let read_back = store.read(CHECK_KEY).await?;
    store.erase(CHECK_KEY).await?;
    if read_back.as_deref() != Some("ok") {
        return Err(StoreError::Unavailable(
            "check value did not read back".into(),
        ));
    }
    Ok(store)
}

impl SessionStore for PlatformStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            Self::Secure(store) => store.read(key).await,
            Self::Fallback(store) => store.read(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            Self::Secure(store) => store.set(key, value).await,
            Self::Fallback(store) => store.set(key, value).await,
        }
    }

    async fn erase(&self, key: &str) -> Result<(), StoreError> {
        match self {
            Self::Secure(store) => store.erase(key).await,
            Self::Fallback(store) => store.erase(key).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_writable_dir_is_secure() {
        let tmp = tempfile::tempdir().unwrap();

        let store = PlatformStore::open(tmp.path().join("session")).await;

        assert!(store.is_secure());
        // The check value must not linger.
        assert_eq!(store.read(CHECK_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_open_unusable_dir_falls_back_to_memory() {
        // A regular file where the directory should be can never be
        // opened as a store directory.
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, b"occupied").unwrap();

        let store = PlatformStore::open(blocker.join("session")).await;

        assert!(!store.is_secure());
        store.set("user_phone", "+911111111111").await.unwrap();
        assert_eq!(
            store.read("user_phone").await.unwrap().as_deref(),
            Some("+911111111111")
        );
    }

    #[test]
    fn test_memory_is_not_secure() {
        assert!(!PlatformStore::memory().is_secure());
    }
}
