//! The identity data model.
//!
//! An [`Identity`] is everything about a user that is safe to persist and
//! display. It's what the session layer writes to storage after sign-in
//! and what the UI reads to greet the user. The secret half (the PIN)
//! never appears here; see [`SignUpDetails`] for the one place it travels
//! alongside identity fields.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::IdentityError;

// ---------------------------------------------------------------------------
// UserId
// ---------------------------------------------------------------------------

/// Highest id value handed out by [`UserId::generate`] in this process.
static LAST_ID: AtomicU64 = AtomicU64::new(0);

/// A unique identifier for a user.
///
/// Newtype over the id string so it can't be mixed up with a phone number
/// or email. Serialized as the bare string; deserializing an empty string
/// fails, so a blob with `"id": ""` is rejected as malformed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Wraps an existing id.
    ///
    /// # Errors
    /// Returns [`IdentityError::InvalidId`] if `id` is empty or blank.
    pub fn new(id: impl Into<String>) -> Result<Self, IdentityError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(IdentityError::InvalidId(id));
        }
        Ok(Self(id))
    }

    /// Allocates a fresh id.
    ///
    /// Ids are wall-clock milliseconds, bumped when needed so that every
    /// id allocated in this process is strictly greater than the last,
    /// even for two calls in the same millisecond or after the clock
    /// steps backwards.
    pub fn generate() -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let prev = LAST_ID
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        Self(now.max(prev + 1).to_string())
    }

    /// Marks an id allocated elsewhere (e.g. loaded from a registry) as
    /// taken, so [`generate`](Self::generate) only returns ids above it.
    /// Non-numeric ids can't collide with generated ones and are ignored.
    pub fn reserve(&self) {
        if let Ok(value) = self.0.parse::<u64>() {
            LAST_ID.fetch_max(value, Ordering::SeqCst);
        }
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The authenticated principal.
///
/// Created by sign-up, replaced wholesale by the next sign-in or sign-up,
/// cleared by sign-out. Never mutated in place.
///
/// Serialized as a flat JSON object: `{"id", "name", "email", "phone"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique user id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact email. Unique across registered users.
    pub email: String,
    /// Phone number in the form the user signed up with. This is the
    /// login key, unique across registered users.
    pub phone: String,
}

// ---------------------------------------------------------------------------
// SignUpDetails
// ---------------------------------------------------------------------------

/// What a sign-up form submits.
///
/// The session layer assumes these fields were already checked with
/// [`SignUpDetails::validate`] by the caller; it does not
/// validate them again.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct SignUpDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub pin: String,
}

impl SignUpDetails {
    /// Builds the identity these details describe, under the given id.
    pub fn to_identity(&self, id: UserId) -> Identity {
        Identity {
            id,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// The PIN is redacted so details can be logged or `dbg!`-ed safely.
impl fmt::Debug for SignUpDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpDetails")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("pin", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_new_rejects_blank() {
        assert!(matches!(UserId::new(""), Err(IdentityError::InvalidId(_))));
        assert!(matches!(UserId::new("   "), Err(IdentityError::InvalidId(_))));
        assert_eq!(UserId::new("42").unwrap().as_str(), "42");
    }

    #[test]
    fn test_user_id_generate_is_strictly_increasing() {
        let ids: Vec<u64> = (0..100)
            .map(|_| UserId::generate().as_str().parse().unwrap())
            .collect();

        for pair in ids.windows(2) {
            assert!(pair[1] > pair[0], "{} should exceed {}", pair[1], pair[0]);
        }
    }

    #[test]
    fn test_user_id_reserve_moves_generate_past_it() {
        let taken = UserId::new("4000000000000000").unwrap();

        taken.reserve();
        UserId::new("not-a-number").unwrap().reserve();

        let next: u64 = UserId::generate().as_str().parse().unwrap();
        assert!(next > 4_000_000_000_000_000);
    }

    #[test]
    fn test_sign_up_details_debug_redacts_pin() {
        let details = SignUpDetails {
            name: "A".into(),
            email: "a@x.com".into(),
            phone: "+911111111111".into(),
            pin: "12345".into(),
        };

        let printed = format!("{details:?}");

        assert!(!printed.contains("12345"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_sign_up_details_to_identity_drops_pin() {
        let details = SignUpDetails {
            name: "A".into(),
            email: "a@x.com".into(),
            phone: "+911111111111".into(),
            pin: "12345".into(),
        };

        let identity = details.to_identity(UserId::new("7").unwrap());

        assert_eq!(identity.id.as_str(), "7");
        assert_eq!(identity.name, "A");
        assert_eq!(identity.email, "a@x.com");
        assert_eq!(identity.phone, "+911111111111");
    }
}
