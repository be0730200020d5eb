//! Unified error type for Latchkey.

use std::path::PathBuf;

use latchkey_identity::IdentityError;
use latchkey_session::{AuthError, CredentialError};
use latchkey_store::StoreError;

/// The one error type applications handle.
///
/// Each Latchkey crate has its own error enum; this wraps them all so
/// callers can use `?` across layers. The `#[from]` conversions are
/// generated per variant.
#[derive(Debug, thiserror::Error)]
pub enum LatchkeyError {
    /// A storage-level error (unavailable, I/O, bad key).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An identity-level error (encode, decode, invalid id).
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// A credential-provider error (duplicate, I/O, corrupt registry).
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    /// A sign-in or sign-up was refused.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The configuration file couldn't be read.
    #[error("failed to read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file isn't valid JSON for [`LatchkeyConfig`](crate::LatchkeyConfig).
    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_store_error() {
        let err = StoreError::InvalidKey("../etc".into());
        let latchkey_err: LatchkeyError = err.into();
        assert!(matches!(latchkey_err, LatchkeyError::Store(_)));
        assert!(latchkey_err.to_string().contains("../etc"));
    }

    #[test]
    fn test_from_identity_error() {
        let err = IdentityError::InvalidId("".into());
        let latchkey_err: LatchkeyError = err.into();
        assert!(matches!(latchkey_err, LatchkeyError::Identity(_)));
    }

    #[test]
    fn test_from_credential_error() {
        let latchkey_err: LatchkeyError = CredentialError::Duplicate.into();
        assert!(matches!(latchkey_err, LatchkeyError::Credentials(_)));
    }

    #[test]
    fn test_from_auth_error_keeps_user_message() {
        let latchkey_err: LatchkeyError = AuthError::InvalidCredentials.into();
        assert!(matches!(latchkey_err, LatchkeyError::Auth(_)));
        assert_eq!(latchkey_err.to_string(), "Invalid phone number or PIN");
    }
}
