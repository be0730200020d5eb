//! In-memory credential registry.
//!
//! Stand-in for an identity backend: records live for the lifetime of the
//! process and are gone after a restart. Accounts created by sign-up must
//! be registered again next launch. Use
//! [`FileCredentials`](crate::FileCredentials) for a registry that
//! survives.

use tokio::sync::RwLock;

use crate::{CredentialError, CredentialProvider, CredentialRecord};

/// An append-only, process-lifetime [`CredentialProvider`].
#[derive(Debug, Default)]
pub struct MemoryCredentials {
    records: RwLock<Vec<CredentialRecord>>,
}

impl MemoryCredentials {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with `records`.
    ///
    /// Records conflicting with an earlier one (same id, phone or email)
    /// are skipped with a warning. Kept ids are reserved against
    /// [`UserId::generate`](latchkey_identity::UserId::generate).
    pub fn with_records(records: impl IntoIterator<Item = CredentialRecord>) -> Self {
        let mut kept: Vec<CredentialRecord> = Vec::new();
        for record in records {
            if kept.iter().any(|r| r.conflicts_with(&record)) {
                tracing::warn!(
                    user_id = %record.identity().id,
                    "skipping seed record that duplicates an earlier one"
                );
                continue;
            }
            record.identity().id.reserve();
            kept.push(record);
        }
        Self {
            records: RwLock::new(kept),
        }
    }

    /// Returns the number of registered records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns `true` if nobody is registered.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl CredentialProvider for MemoryCredentials {
    async fn find_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<CredentialRecord>, CredentialError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.phone() == phone).cloned())
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CredentialRecord>, CredentialError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.email() == email).cloned())
    }

    async fn insert(&self, record: CredentialRecord) -> Result<(), CredentialError> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.conflicts_with(&record)) {
            return Err(CredentialError::Duplicate);
        }
        tracing::debug!(user_id = %record.identity().id, "credential record added");
        records.push(record);
        Ok(())
    }
}
