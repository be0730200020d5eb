//! Error types for the session layer.

use latchkey_identity::IdentityError;
use latchkey_store::StoreError;

/// Why a sign-in or sign-up was refused.
///
/// The `Display` text of each variant is user-facing: a sign-in screen
/// shows it under the PIN field as is.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No account matches this phone and PIN.
    ///
    /// Deliberately the same for an unknown phone and a wrong PIN, so the
    /// message doesn't reveal whether an account exists.
    #[error("Invalid phone number or PIN")]
    InvalidCredentials,

    /// Sign-up found an account with the same phone number or email.
    #[error("User already exists with this phone number or email")]
    UserExists,

    /// The credential provider itself failed (I/O, corrupt registry).
    #[error("Authentication failed")]
    Credentials(#[source] CredentialError),

    /// The session could not be written to storage. Only returned under
    /// [`PersistencePolicy::Strict`](crate::PersistencePolicy::Strict).
    #[error("Could not save your session, please try again")]
    Persistence(#[source] StoreError),

    /// The identity could not be encoded for storage.
    #[error("Could not save your session, please try again")]
    Codec(#[source] IdentityError),

    /// Sign-up registered the account, but the session could not be
    /// saved (wraps [`Persistence`](Self::Persistence) or
    /// [`Codec`](Self::Codec)). Retrying the sign-up would hit
    /// [`UserExists`](Self::UserExists); signing in works.
    #[error("Your account was created but we could not sign you in, please sign in")]
    AccountNotSignedIn(#[source] Box<AuthError>),
}

/// Errors reported by a [`CredentialProvider`](crate::CredentialProvider).
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// A record with the same id, phone number or email already exists.
    #[error("a user with this id, phone number or email already exists")]
    Duplicate,

    /// Reading or writing the durable registry failed.
    #[error("credential registry I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The durable registry exists but can't be parsed.
    #[error("credential registry is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
}
