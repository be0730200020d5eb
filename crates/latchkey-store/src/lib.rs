//! Session storage abstraction for Latchkey.
//!
//! Provides the [`SessionStore`] trait: a durable `key → string` map with
//! three operations (read, set, erase). The store knows nothing about what
//! it holds; the session layer decides what goes under each [`StorageKey`].
//!
//! # Implementations
//!
//! - [`FileStore`]: secure on-device storage, one file per key
//! - [`MemoryStore`]: process-lifetime map, the weaker fallback
//! - [`PlatformStore`]: picks one of the above depending on whether the
//!   secure store is usable on this device
//!
//! Failures are reported as [`StoreError`] rather than collapsed into
//! "absent". Callers decide whether to surface or degrade.

mod error;
mod file;
mod memory;
mod platform;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use platform::PlatformStore;

use std::fmt;
use std::future::Future;

/// The well-known keys the session layer persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// The last phone number used to sign in. Survives sign-out.
    UserPhone,
    /// The serialized identity of the signed-in user.
    UserData,
    /// The opaque session token.
    SessionToken,
}

impl StorageKey {
    /// All keys, in the order they are written during sign-in.
    pub const ALL: [StorageKey; 3] = [
        StorageKey::UserData,
        StorageKey::UserPhone,
        StorageKey::SessionToken,
    ];

    /// Returns the stable on-disk name of this key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserPhone => "user_phone",
            Self::UserData => "user_data",
            Self::SessionToken => "session_token",
        }
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks that a key is usable by every store implementation.
///
/// Keys end up as file names in [`FileStore`], so they are restricted to
/// `[A-Za-z0-9_.-]`, must be non-empty, and may not start with a dot.
pub fn check_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// Durable `key → string` storage.
///
/// # Trait bounds
///
/// - `Send + Sync` → one store is shared by the session manager across
///   async tasks.
/// - `'static` → the store lives as long as the manager that owns it.
///
/// Every operation may suspend while the underlying storage is accessed,
/// but none of them block the runtime.
pub trait SessionStore: Send + Sync + 'static {
    /// Returns the value stored under `key`.
    ///
    /// `Ok(None)` means the key was never written or has been erased.
    /// `Err` means the storage itself could not be read.
    fn read(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removes any value stored under `key`. Erasing an absent key is a
    /// no-op.
    fn erase(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Stores `value` under `key`, or erases `key` when `value` is `None`.
    fn write(
        &self,
        key: &str,
        value: Option<&str>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        async move {
            match value {
                Some(value) => self.set(key, value).await,
                None => self.erase(key).await,
            }
        }
    }
}
