//! Durable credential registry: a JSON array of records in one file.
//!
//! The whole registry is loaded at open and kept in memory. Every insert
//! writes the full array to a temp file and renames it over the old one,
//! so the file on disk is always either the previous registry or the new
//! one, never a torn write. Records hold PIN digests, never PINs.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::{CredentialError, CredentialProvider, CredentialRecord};

/// A [`CredentialProvider`] persisted to a JSON file.
#[derive(Debug)]
pub struct FileCredentials {
    path: PathBuf,
    records: Mutex<Vec<CredentialRecord>>,
}

impl FileCredentials {
    /// Opens the registry at `path`. A missing file is an empty registry;
    /// the file is created on the first insert. Loaded ids are reserved,
    /// so [`UserId::generate`](latchkey_identity::UserId::generate) never
    /// hands one of them out again, even if the clock went backwards.
    ///
    /// # Errors
    /// - [`CredentialError::Io`]: the file exists but can't be read
    /// - [`CredentialError::Corrupt`]: the file isn't a JSON array of
    ///   records
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, CredentialError> {
        let path = path.into();
        let records = match fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => Vec::new(),
            Ok(contents) => serde_json::from_str::<Vec<CredentialRecord>>(&contents)
                .map_err(CredentialError::Corrupt)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        for record in &records {
            record.identity().id.reserve();
        }

        tracing::debug!(
            path = %path.display(),
            records = records.len(),
            "credential registry loaded"
        );
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// Returns the file backing this registry.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of registered records.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Returns `true` if nobody is registered.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    async fn save(&self, records: &[CredentialRecord]) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(records).map_err(std::io::Error::other)?;
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "credentials".to_string());
        let temp = self.path.with_file_name(format!("{file_name}.tmp"));

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let result: std::io::Result<()> = async {
            let mut file = options.open(&temp).await?;
            file.write_all(json.as_bytes()).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp, &self.path).await
        }
        .await;

        if result.is_err() {
            let _ = fs::remove_file(&temp).await;
        }
        result.map_err(CredentialError::from)
    }
}

impl CredentialProvider for FileCredentials {
    async fn find_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<CredentialRecord>, CredentialError> {
        let records = self.records.lock().await;
        Ok(records.iter().find(|r| r.phone() == phone).cloned())
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CredentialRecord>, CredentialError> {
        let records = self.records.lock().await;
        Ok(records.iter().find(|r| r.email() == email).cloned())
    }

    async fn insert(&self, record: CredentialRecord) -> Result<(), CredentialError> {
        let mut records = self.records.lock().await;
        if records.iter().any(|r| r.conflicts_with(&record)) {
            return Err(CredentialError::Duplicate);
        }

        // Only commit in memory once the file reflects the new record.
        records.push(record);
        if let Err(e) = self.save(&records).await {
            records.pop();
            tracing::error!(
                path = %self.path.display(),
                error = %e,
                "failed to persist credential registry"
            );
            return Err(e);
        }

        if let Some(added) = records.last() {
            tracing::debug!(user_id = %added.identity().id, "credential record persisted");
        }
        Ok(())
    }
}
