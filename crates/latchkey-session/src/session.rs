//! Session types: configuration, the observable auth state, and tokens.
//!
//! The UI never looks at storage directly. It watches an [`AuthState`]:
//! - are we still reading storage (`Loading`)?
//! - is anyone signed in (`Authenticated`), and who?
//! - or not (`Unauthenticated`)?

use std::fmt;

use latchkey_identity::{Identity, UserId};
use rand::Rng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// What to do when the session can't be fully written to storage during
/// sign-in or sign-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistencePolicy {
    /// Log the failure and sign the user in anyway. The session lives in
    /// memory; after a restart the user may find themselves signed out.
    #[default]
    BestEffort,

    /// Fail the operation, roll back whatever was written, and leave the
    /// user signed out.
    Strict,
}

/// Configuration for session behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How storage write failures during sign-in/sign-up are handled.
    ///
    /// Default: [`PersistencePolicy::BestEffort`].
    pub persistence: PersistencePolicy,
}

// ---------------------------------------------------------------------------
// AuthState
// ---------------------------------------------------------------------------

/// The published authentication state.
///
/// ```text
///   Loading ──(load)──→ Unauthenticated ←──(sign_out)── Authenticated
///      │                       │                             ↑
///      │                       └──(sign_in / sign_up)────────┘
///      └───────────(load, stored identity)───────────────────┘
/// ```
///
/// `Loading` is the initial state until storage has been read once, and
/// it is never re-entered. A UI renders a splash screen while loading and
/// must not decide which screen to show before that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Storage has not been read yet.
    Loading,

    /// Nobody is signed in.
    Unauthenticated,

    /// This identity is signed in.
    Authenticated(Identity),
}

impl AuthState {
    /// Returns `true` until the stored session has been read.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Returns `true` if a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Returns the signed-in identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading"),
            Self::Unauthenticated => write!(f, "Unauthenticated"),
            Self::Authenticated(identity) => {
                write!(f, "Authenticated({})", identity.id)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SessionToken
// ---------------------------------------------------------------------------

/// The opaque token persisted alongside a signed-in identity.
///
/// Format: `tok_<user id>_<32 hex chars>`. The id ties the token to its
/// identity; the random part (128 bits) makes each sign-in's token
/// unique. It's issued locally. A deployment with a real identity backend
/// would store the server-issued token here instead.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Issues a fresh token for `user_id`.
    pub fn issue(user_id: &UserId) -> Self {
        Self(format!("tok_{user_id}_{}", random_hex()))
    }

    /// Returns `true` if this token was issued for `user_id`.
    pub fn belongs_to(&self, user_id: &UserId) -> bool {
        Self::is_for(&self.0, user_id)
    }

    /// Returns `true` if the raw token string `token` was issued for
    /// `user_id`.
    pub fn is_for(token: &str, user_id: &UserId) -> bool {
        token
            .strip_prefix("tok_")
            .and_then(|rest| rest.rsplit_once('_'))
            .is_some_and(|(id, _)| id == user_id.as_str())
    }

    /// Returns the token string, as written to storage.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Tokens are secrets; keep them out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Generates a random 32-character hex string (128 bits of entropy).
pub(crate) fn random_hex() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
