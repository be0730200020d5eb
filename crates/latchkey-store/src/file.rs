//! Secure on-device store: one file per key inside a private directory.
//!
//! Writes never leave a half-written value behind. The new value goes to a
//! temporary file next to the target, which is then renamed over it. A
//! rename within one directory is atomic, so a reader sees either the old
//! value or the new one.
//!
//! On Unix the directory is created `0700` and every value file `0600`, so
//! other local users can't read the session.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::{check_key, SessionStore, StoreError};

/// A [`SessionStore`] backed by files in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `dir`.
    ///
    /// # Errors
    /// Returns [`StoreError::Unavailable`] if the directory can't be
    /// created or its permissions can't be restricted.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(|e| {
            StoreError::Unavailable(format!(
                "cannot create {}: {e}",
                dir.display()
            ))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o700))
                .await
                .map_err(|e| {
                    StoreError::Unavailable(format!(
                        "cannot restrict {}: {e}",
                        dir.display()
                    ))
                })?;
        }

        tracing::debug!(dir = %dir.display(), "file store opened");
        Ok(Self { dir })
    }

    /// Returns the directory this store writes to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    async fn write_atomically(
        &self,
        key: &str,
        value: &str,
    ) -> std::io::Result<()> {
        let target = self.path_for(key);
        let temp = self
            .dir
            .join(format!(".{key}.{:08x}.tmp", rand::random::<u32>()));

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let result = async {
            let mut file = options.open(&temp).await?;
            file.write_all(value.as_bytes()).await?;
            file.sync_all().await?;
            fs::rename(&temp, &target).await
        }
        .await;

        if result.is_err() {
            // The rename never happened; don't leave the temp file around.
            let _ = fs::remove_file(&temp).await;
        }
        result
    }
}

impl SessionStore for FileStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        check_key(key)?;
        match fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(key, e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.write_atomically(key, value)
            .await
            .map_err(|e| StoreError::io(key, e))?;
        tracing::trace!(key, "file store: value set");
        Ok(())
    }

    async fn erase(&self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => {
                tracing::trace!(key, "file store: key erased");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("session");

        let store = FileStore::open(&dir).await.expect("should open");

        assert!(dir.is_dir());
        assert_eq!(store.dir(), dir.as_path());
    }

    #[tokio::test]
    async fn test_set_leaves_no_temp_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).await.unwrap();

        store.set("user_data", "{\"id\":\"1\"}").await.unwrap();
        store.set("user_data", "{\"id\":\"2\"}").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["user_data".to_string()]);
    }

    #[tokio::test]
    async fn test_erase_absent_key_is_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).await.unwrap();

        store.erase("session_token").await.expect("no-op");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_set_creates_owner_only_file() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).await.unwrap();

        store.set("session_token", "tok").await.unwrap();

        let mode = std::fs::metadata(tmp.path().join("session_token"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_read_directory_in_place_of_key_returns_io_error() {
        // A directory where a value file should be is an I/O failure,
        // not an absent value.
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).await.unwrap();
        std::fs::create_dir(tmp.path().join("user_data")).unwrap();

        let result = store.read("user_data").await;

        assert!(
            matches!(result, Err(StoreError::Io { ref key, .. }) if key == "user_data"),
            "got {result:?}"
        );
    }
}
