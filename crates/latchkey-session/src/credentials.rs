//! Credential provider: who may sign in, and with which PIN.
//!
//! Latchkey doesn't run an identity backend. It defines the
//! [`CredentialProvider`] trait instead: look a user up by phone or email,
//! register a new one. The session manager only talks to the trait, so the
//! provider behind it can be swapped without touching session logic:
//! - [`MemoryCredentials`](crate::MemoryCredentials): process-lifetime
//!   registry, gone on restart
//! - [`FileCredentials`](crate::FileCredentials): durable registry on disk
//! - a client for a real identity service

use std::fmt;
use std::future::Future;

use latchkey_identity::{Identity, SignUpDetails, UserId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::session::random_hex;
use crate::{CredentialError, FileCredentials, MemoryCredentials};

/// Number of SHA-256 rounds when digesting a PIN.
const PIN_HASH_ITERATIONS: u32 = 10_000;

/// Salt used to burn time when a sign-in names an unknown phone.
const DUMMY_SALT: &str = "00000000000000000000000000000000";

// ---------------------------------------------------------------------------
// PinHash
// ---------------------------------------------------------------------------

/// A salted, iterated SHA-256 digest of a PIN.
///
/// The PIN itself is never stored. Verification recomputes the digest and
/// compares in constant time.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinHash {
    salt: String,
    digest: String,
}

impl PinHash {
    /// Digests `pin` under a fresh random salt.
    pub fn new(pin: &str) -> Self {
        let salt = random_hex();
        let digest = digest_pin(pin, &salt);
        Self { salt, digest }
    }

    /// Returns `true` if `pin` is the PIN this digest was made from.
    pub fn verify(&self, pin: &str) -> bool {
        let attempt = digest_pin(pin, &self.salt);
        constant_time_eq(attempt.as_bytes(), self.digest.as_bytes())
    }

    /// Spends the same time as a [`verify`](Self::verify) without
    /// checking anything. Used when there is no record to verify against.
    pub(crate) fn burn(pin: &str) {
        std::hint::black_box(digest_pin(std::hint::black_box(pin), DUMMY_SALT));
    }
}

impl fmt::Debug for PinHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PinHash(<redacted>)")
    }
}

fn digest_pin(pin: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(pin.as_bytes());
    let mut digest = hasher.finalize();

    for _ in 1..PIN_HASH_ITERATIONS {
        let mut hasher = Sha256::new();
        hasher.update(digest);
        hasher.update(salt.as_bytes());
        digest = hasher.finalize();
    }

    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

// ---------------------------------------------------------------------------
// CredentialRecord
// ---------------------------------------------------------------------------

/// An identity plus the digest of its PIN.
///
/// Lives only inside a credential provider. It never reaches the session
/// store or the UI; sign-in hands out [`identity`](Self::identity) only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    #[serde(flatten)]
    identity: Identity,
    pin: PinHash,
}

impl CredentialRecord {
    /// Creates a record, digesting `pin`.
    pub fn new(identity: Identity, pin: &str) -> Self {
        Self {
            identity,
            pin: PinHash::new(pin),
        }
    }

    /// Creates the record for a sign-up under the given id.
    pub fn from_details(id: UserId, details: &SignUpDetails) -> Self {
        Self::new(details.to_identity(id), &details.pin)
    }

    /// The non-secret half of the record.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn phone(&self) -> &str {
        &self.identity.phone
    }

    pub fn email(&self) -> &str {
        &self.identity.email
    }

    /// Returns `true` if `pin` matches exactly.
    pub fn verify_pin(&self, pin: &str) -> bool {
        self.pin.verify(pin)
    }

    /// Returns `true` if this record and `other` share an id, a phone or
    /// an email.
    pub(crate) fn conflicts_with(&self, other: &CredentialRecord) -> bool {
        self.identity.id == other.identity.id
            || self.phone() == other.phone()
            || self.email() == other.email()
    }
}

// ---------------------------------------------------------------------------
// CredentialProvider
// ---------------------------------------------------------------------------

/// Looks up and registers credential records.
///
/// Matching is exact: no case folding, trimming, or phone normalization.
/// Callers normalize before calling if they want to.
///
/// # Trait bounds
///
/// - `Send + Sync` → shared by the session manager across tasks.
/// - `'static` → lives as long as the manager.
///
/// # Example
///
/// ```rust
/// use latchkey_session::{CredentialError, CredentialProvider, CredentialRecord};
///
/// /// A provider with no accounts and no way to register one.
/// struct Closed;
///
/// impl CredentialProvider for Closed {
///     async fn find_by_phone(
///         &self,
///         _phone: &str,
///     ) -> Result<Option<CredentialRecord>, CredentialError> {
///         Ok(None)
///     }
///
///     async fn find_by_email(
///         &self,
///         _email: &str,
///     ) -> Result<Option<CredentialRecord>, CredentialError> {
///         Ok(None)
///     }
///
///     async fn insert(
///         &self,
///         _record: CredentialRecord,
///     ) -> Result<(), CredentialError> {
///         Err(CredentialError::Io(std::io::Error::other("registration closed")))
///     }
/// }
/// ```
pub trait CredentialProvider: Send + Sync + 'static {
    /// Returns the record registered under `phone`, if any.
    fn find_by_phone(
        &self,
        phone: &str,
    ) -> impl Future<Output = Result<Option<CredentialRecord>, CredentialError>> + Send;

    /// Returns the record registered under `email`, if any.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<CredentialRecord>, CredentialError>> + Send;

    /// Registers a new record.
    ///
    /// # Errors
    /// Returns [`CredentialError::Duplicate`] if a record with the same
    /// id, phone or email already exists. The check and the insert happen
    /// together, so two racing sign-ups can't both succeed.
    fn insert(
        &self,
        record: CredentialRecord,
    ) -> impl Future<Output = Result<(), CredentialError>> + Send;
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// One of the built-in providers, chosen at startup from configuration.
#[derive(Debug)]
pub enum Credentials {
    Memory(MemoryCredentials),
    File(FileCredentials),
}

impl CredentialProvider for Credentials {
    async fn find_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<CredentialRecord>, CredentialError> {
        match self {
            Self::Memory(p) => p.find_by_phone(phone).await,
            Self::File(p) => p.find_by_phone(phone).await,
        }
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CredentialRecord>, CredentialError> {
        match self {
            Self::Memory(p) => p.find_by_email(email).await,
            Self::File(p) => p.find_by_email(email).await,
        }
    }

    async fn insert(&self, record: CredentialRecord) -> Result<(), CredentialError> {
        match self {
            Self::Memory(p) => p.insert(record).await,
            Self::File(p) => p.insert(record).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: UserId::new("1").unwrap(),
            name: "A".into(),
            email: "a@x.com".into(),
            phone: "+911111111111".into(),
        }
    }

    #[test]
    fn test_pin_hash_verifies_only_the_original_pin() {
        let hash = PinHash::new("12345");

        assert!(hash.verify("12345"));
        assert!(!hash.verify("00000"));
        assert!(!hash.verify("1234"));
        assert!(!hash.verify(""));
    }

    #[test]
    fn test_pin_hash_salts_differ_per_digest() {
        // Same PIN, different salts → different stored digests.
        let a = PinHash::new("12345");
        let b = PinHash::new("12345");

        assert_ne!(a, b);
    }

    #[test]
    fn test_pin_hash_burn_digests_under_dummy_salt() {
        // burn() must run the same digest a verify() would.
        let dummy = PinHash {
            salt: DUMMY_SALT.to_string(),
            digest: digest_pin("12345", DUMMY_SALT),
        };

        PinHash::burn("12345");

        assert!(dummy.verify("12345"));
        assert_eq!(dummy.digest.len(), 64);
    }

    #[test]
    fn test_pin_hash_debug_is_redacted() {
        assert_eq!(format!("{:?}", PinHash::new("12345")), "PinHash(<redacted>)");
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"short", b"longer"));
    }

    #[test]
    fn test_credential_record_serializes_without_plain_pin() {
        let record = CredentialRecord::new(identity(), "12345");

        let json = serde_json::to_string(&record).unwrap();
        let back: CredentialRecord = serde_json::from_str(&json).unwrap();

        assert!(!json.contains("\"12345\""));
        assert!(json.contains("\"phone\":\"+911111111111\""));
        assert_eq!(back.identity(), record.identity());
        assert!(back.verify_pin("12345"));
    }

    #[test]
    fn test_credential_record_conflicts_on_phone_or_email() {
        let a = CredentialRecord::new(identity(), "12345");
        let mut other = identity();
        other.id = UserId::new("2").unwrap();
        other.email = "b@x.com".into();
        let same_phone = CredentialRecord::new(other.clone(), "1");
        other.phone = "+922222222222".into();
        let distinct = CredentialRecord::new(other.clone(), "1");
        other.email = "a@x.com".into();
        let same_email = CredentialRecord::new(other, "1");

        assert!(a.conflicts_with(&same_phone));
        assert!(a.conflicts_with(&same_email));
        assert!(!a.conflicts_with(&distinct));
    }

    #[test]
    fn test_credential_record_conflicts_on_id() {
        let a = CredentialRecord::new(identity(), "12345");
        let mut other = identity();
        other.email = "b@x.com".into();
        other.phone = "+922222222222".into();
        let same_id = CredentialRecord::new(other.clone(), "1");
        other.id = UserId::new("2").unwrap();
        let distinct = CredentialRecord::new(other, "1");

        assert!(a.conflicts_with(&same_id));
        assert!(!a.conflicts_with(&distinct));
    }
}
