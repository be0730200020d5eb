//! The session manager: the one authority on who is signed in.
//!
//! It's responsible for:
//! - Restoring the session from storage when the app starts
//! - Signing users in and up against the credential provider
//! - Persisting the session (identity, phone, token) to the store
//! - Signing out, keeping the phone number for the next sign-in
//! - Publishing the current [`AuthState`] for the UI to render from
//!
//! # Concurrency note
//!
//! Every operation that changes the session (`load`, `sign_in`, `sign_up`,
//! `sign_out`) takes an internal lock for its whole duration, so two
//! overlapping button presses run one after the other instead of
//! interleaving their storage writes. Reads of the published state never
//! wait on that lock.
//!
//! # Storage layout
//!
//! | key             | value                          | cleared by sign-out |
//! |-----------------|--------------------------------|---------------------|
//! | `user_data`     | identity blob (via the codec)  | yes                 |
//! | `user_phone`    | last phone used to sign in     | no                  |
//! | `session_token` | [`SessionToken`]               | yes                 |
//!
//! Writes go identity → phone → token and sign-out erases token →
//! identity, so a token is never left in storage without its identity.

use latchkey_identity::{Codec, Identity, JsonCodec, SignUpDetails, UserId};
use latchkey_store::{SessionStore, StorageKey};
use tokio::sync::{watch, Mutex};

use crate::credentials::PinHash;
use crate::{
    AuthError, AuthState, CredentialError, CredentialProvider,
    CredentialRecord, PersistencePolicy, SessionConfig, SessionToken,
};

/// Owns the session state machine and mediates between the UI, the
/// session store, and the credential provider.
///
/// Construct one at startup, hand it to the UI by reference (or `Arc`),
/// and call [`load`](Self::load) (or use [`restore`](Self::restore))
/// before deciding which screen to show.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ [Loading] ──load()──→ [Unauthenticated] ──sign_in()/sign_up()──→ [Authenticated]
///                         │                ↑                                        │
///                         │                └──────────────sign_out()────────────────┘
///                         └──(stored identity)──→ [Authenticated]
/// ```
pub struct SessionManager<S, P, C = JsonCodec> {
    /// Where the session is persisted.
    store: S,

    /// Who may sign in.
    credentials: P,

    /// Turns identities into storable strings.
    codec: C,

    config: SessionConfig,

    /// The published state. The sender keeps the current value even with
    /// no subscribers, so it doubles as the state cell.
    state: watch::Sender<AuthState>,

    /// Serializes state-changing operations.
    op_lock: Mutex<()>,
}

impl<S, P> SessionManager<S, P, JsonCodec>
where
    S: SessionStore,
    P: CredentialProvider,
{
    /// Creates a manager in the `Loading` state, storing identities as
    /// JSON.
    pub fn new(store: S, credentials: P, config: SessionConfig) -> Self {
        Self::with_codec(store, credentials, JsonCodec, config)
    }

    /// Creates a manager and immediately restores the stored session.
    ///
    /// The returned manager is never `Loading`.
    pub async fn restore(store: S, credentials: P, config: SessionConfig) -> Self {
        let manager = Self::new(store, credentials, config);
        manager.load().await;
        manager
    }
}

impl<S, P, C> SessionManager<S, P, C>
where
    S: SessionStore,
    P: CredentialProvider,
    C: Codec,
{
    /// Creates a manager in the `Loading` state with a custom codec.
    pub fn with_codec(store: S, credentials: P, codec: C, config: SessionConfig) -> Self {
        let (state, _) = watch::channel(AuthState::Loading);
        Self {
            store,
            credentials,
            codec,
            config,
            state,
            op_lock: Mutex::new(()),
        }
    }

    // =====================================================================
    // Observable state
    // =====================================================================

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Returns the signed-in identity, if any.
    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    /// Returns `true` until the stored session has been read.
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// Returns `true` if a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Subscribes to state changes. The receiver starts at the current
    /// state and is notified on every transition.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Returns the underlying session store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the underlying credential provider.
    pub fn credentials(&self) -> &P {
        &self.credentials
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // =====================================================================
    // Operations
    // =====================================================================

    /// Reads the stored identity and leaves the `Loading` state.
    ///
    /// A well-formed stored identity → `Authenticated`. No identity, a
    /// malformed one, or a storage failure → `Unauthenticated` (failures
    /// are logged). Only the first call reads storage; later calls just
    /// return the current state, since `Loading` is never re-entered.
    pub async fn load(&self) -> AuthState {
        let _guard = self.op_lock.lock().await;
        if !self.is_loading() {
            return self.state();
        }

        let next = match self.store.read(StorageKey::UserData.as_str()).await {
            Ok(Some(blob)) => match self.codec.decode::<Identity>(&blob) {
                Ok(identity) => AuthState::Authenticated(identity),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "stored identity is malformed, treating as signed out"
                    );
                    AuthState::Unauthenticated
                }
            },
            Ok(None) => AuthState::Unauthenticated,
            Err(e) => {
                tracing::error!(error = %e, "failed to read stored identity");
                AuthState::Unauthenticated
            }
        };

        if let AuthState::Authenticated(identity) = &next {
            self.check_stored_token(&identity.id).await;
        }

        tracing::info!(state = %next, "session restored");
        self.state.send_replace(next.clone());
        next
    }

    /// Signs in with a phone number and PIN.
    ///
    /// Both must match a registered account exactly. On success the
    /// session is persisted and the state becomes `Authenticated`.
    ///
    /// # Errors
    /// - [`AuthError::InvalidCredentials`]: no account with this phone,
    ///   or wrong PIN (indistinguishable on purpose)
    /// - [`AuthError::Credentials`]: the credential provider failed
    /// - [`AuthError::Persistence`] / [`AuthError::Codec`]: the session
    ///   could not be saved (only under [`PersistencePolicy::Strict`])
    pub async fn sign_in(&self, phone: &str, pin: &str) -> Result<Identity, AuthError> {
        let _guard = self.op_lock.lock().await;

        let record = self
            .credentials
            .find_by_phone(phone)
            .await
            .map_err(|e| credential_failure("sign-in", e))?;

        let identity = match record {
            Some(record) if record.verify_pin(pin) => record.identity().clone(),
            Some(record) => {
                tracing::debug!(
                    user_id = %record.identity().id,
                    reason = "pin_mismatch",
                    "sign-in rejected"
                );
                return Err(AuthError::InvalidCredentials);
            }
            None => {
                // Take as long as a real PIN check would.
                PinHash::burn(pin);
                tracing::debug!(reason = "unknown_phone", "sign-in rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        self.establish(identity).await
    }

    /// Registers a new account and signs it in.
    ///
    /// The details are trusted as given: validate them with
    /// [`SignUpDetails::validate`] first.
    ///
    /// # Errors
    /// - [`AuthError::UserExists`]: the phone or email is already taken
    /// - [`AuthError::Credentials`]: the credential provider failed
    /// - [`AuthError::AccountNotSignedIn`]: the account was registered
    ///   but the session could not be saved (only under
    ///   [`PersistencePolicy::Strict`]). Signing in later works.
    pub async fn sign_up(&self, details: &SignUpDetails) -> Result<Identity, AuthError> {
        let _guard = self.op_lock.lock().await;

        let taken = self
            .credentials
            .find_by_phone(&details.phone)
            .await
            .map_err(|e| credential_failure("sign-up", e))?
            .is_some()
            || self
                .credentials
                .find_by_email(&details.email)
                .await
                .map_err(|e| credential_failure("sign-up", e))?
                .is_some();
        if taken {
            tracing::info!("sign-up rejected: account already exists");
            return Err(AuthError::UserExists);
        }

        let id = UserId::generate();
        let record = CredentialRecord::from_details(id.clone(), details);
        let identity = record.identity().clone();
        match self.credentials.insert(record).await {
            Ok(()) => {}
            Err(CredentialError::Duplicate) => return Err(AuthError::UserExists),
            Err(e) => return Err(credential_failure("sign-up", e)),
        }
        tracing::info!(user_id = %id, "account registered");

        self.establish(identity)
            .await
            .map_err(|e| AuthError::AccountNotSignedIn(Box::new(e)))
    }

    /// Signs out.
    ///
    /// Erases the stored identity and token but keeps the phone number,
    /// so the sign-in screen can pre-fill it. Never fails: storage errors
    /// are logged and the state becomes `Unauthenticated` regardless.
    pub async fn sign_out(&self) {
        let _guard = self.op_lock.lock().await;

        self.clear_persisted().await;
        let previous = self.state.send_replace(AuthState::Unauthenticated);
        if let Some(identity) = previous.identity() {
            tracing::info!(user_id = %identity.id, "signed out");
        }
    }

    /// Returns the phone number of the last sign-in, if one is stored.
    ///
    /// Survives sign-out. A storage failure is logged and reads as
    /// `None`.
    pub async fn stored_phone_number(&self) -> Option<String> {
        match self.store.read(StorageKey::UserPhone.as_str()).await {
            Ok(phone) => phone,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored phone number");
                None
            }
        }
    }

    // =====================================================================
    // Internals
    // =====================================================================

    /// Persists `identity` and publishes it as signed in, subject to the
    /// persistence policy. Caller holds `op_lock`.
    async fn establish(&self, identity: Identity) -> Result<Identity, AuthError> {
        let token = SessionToken::issue(&identity.id);

        if let Err(e) = self.persist(&identity, &token).await {
            match self.config.persistence {
                PersistencePolicy::BestEffort => {
                    tracing::warn!(
                        user_id = %identity.id,
                        error = %e,
                        "session only partially persisted; it may not survive a restart"
                    );
                }
                PersistencePolicy::Strict => {
                    tracing::error!(
                        user_id = %identity.id,
                        error = %e,
                        "session could not be persisted, rolling back"
                    );
                    // The previous session's keys may already be
                    // overwritten, so it can't be kept either.
                    self.clear_persisted().await;
                    if self.is_authenticated() {
                        self.state.send_replace(AuthState::Unauthenticated);
                    }
                    return Err(e);
                }
            }
        }

        tracing::info!(user_id = %identity.id, "signed in");
        self.state.send_replace(AuthState::Authenticated(identity.clone()));
        Ok(identity)
    }

    /// Writes identity → phone → token, stopping at the first failure.
    async fn persist(&self, identity: &Identity, token: &SessionToken) -> Result<(), AuthError> {
        let blob = self.codec.encode(identity).map_err(AuthError::Codec)?;
        let writes = [
            (StorageKey::UserData, blob.as_str()),
            (StorageKey::UserPhone, identity.phone.as_str()),
            (StorageKey::SessionToken, token.as_str()),
        ];
        for (key, value) in writes {
            self.store
                .set(key.as_str(), value)
                .await
                .map_err(AuthError::Persistence)?;
        }
        Ok(())
    }

    /// Erases token → identity. Both are attempted; failures are logged.
    async fn clear_persisted(&self) {
        for key in [StorageKey::SessionToken, StorageKey::UserData] {
            if let Err(e) = self.store.erase(key.as_str()).await {
                tracing::error!(%key, error = %e, "failed to erase session key");
            }
        }
    }

    /// Logs when the stored token doesn't belong to the restored identity.
    async fn check_stored_token(&self, user_id: &UserId) {
        match self.store.read(StorageKey::SessionToken.as_str()).await {
            Ok(Some(token)) if SessionToken::is_for(&token, user_id) => {}
            Ok(Some(_)) => {
                tracing::warn!(%user_id, "stored session token belongs to another user")
            }
            Ok(None) => tracing::debug!(%user_id, "stored identity has no session token"),
            Err(e) => tracing::debug!(error = %e, "could not read session token"),
        }
    }
}

fn credential_failure(operation: &'static str, e: CredentialError) -> AuthError {
    tracing::error!(operation, error = %e, "credential provider failed");
    AuthError::Credentials(e)
}

// =========================================================================
// Tests
// =========================================================================
