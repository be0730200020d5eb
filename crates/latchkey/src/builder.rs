//! `LatchkeyBuilder`: wires a store, a credential provider and a session
//! manager together from configuration.

use std::path::PathBuf;

use latchkey_session::{
    CredentialError, CredentialProvider, CredentialRecord, Credentials, FileCredentials,
    MemoryCredentials, SessionConfig, SessionManager,
};
use latchkey_store::PlatformStore;

use crate::{LatchkeyConfig, LatchkeyError};

/// The session manager the builder produces.
pub type Latchkey = SessionManager<PlatformStore, Credentials>;

/// Builder for a ready-to-use [`Latchkey`] session manager.
///
/// # Example
///
/// ```rust,no_run
/// use latchkey::prelude::*;
///
/// # async fn run() -> Result<(), LatchkeyError> {
/// let config = LatchkeyConfig::from_file("latchkey.json")?.with_env();
/// let session = LatchkeyBuilder::new().config(config).build().await?;
///
/// if !session.is_authenticated() {
///     let phone = session.stored_phone_number().await;
///     // show the sign-in screen, pre-filled with `phone`
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct LatchkeyBuilder {
    config: LatchkeyConfig,
    seeds: Vec<CredentialRecord>,
}

impl LatchkeyBuilder {
    /// Creates a builder with the default configuration: in-memory store,
    /// in-memory registry, best-effort persistence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: LatchkeyConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the directory of the secure session store.
    pub fn store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.store_dir = Some(dir.into());
        self
    }

    /// Sets the file of the durable credential registry.
    pub fn credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.credentials_file = Some(path.into());
        self
    }

    /// Registers an account at build time (e.g. a demo account).
    /// Seeds that clash with an existing account are skipped.
    pub fn seed(mut self, record: CredentialRecord) -> Self {
        self.seeds.push(record);
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.config.session = config;
        self
    }

    /// Opens the store and registry and restores the stored session.
    ///
    /// The returned manager is never `Loading`. An unusable store
    /// directory is not an error: the session falls back to memory.
    ///
    /// # Errors
    /// Returns [`LatchkeyError::Credentials`] if the credential registry
    /// file can't be read or parsed, or a seed can't be saved to it.
    pub async fn build(self) -> Result<Latchkey, LatchkeyError> {
        let store = match &self.config.store_dir {
            Some(dir) => PlatformStore::open(dir).await,
            None => PlatformStore::memory(),
        };

        let credentials = match &self.config.credentials_file {
            Some(path) => {
                let registry = FileCredentials::open(path).await?;
                for record in self.seeds {
                    match registry.insert(record).await {
                        Ok(()) | Err(CredentialError::Duplicate) => {}
                        Err(e) => return Err(e.into()),
                    }
                }
                Credentials::File(registry)
            }
            None => Credentials::Memory(MemoryCredentials::with_records(self.seeds)),
        };

        tracing::debug!(
            secure_store = store.is_secure(),
            persistence = ?self.config.session.persistence,
            "building session manager"
        );
        Ok(SessionManager::restore(store, credentials, self.config.session).await)
    }
}
