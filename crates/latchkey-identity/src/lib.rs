//! Identity model for Latchkey.
//!
//! This crate defines who a user is, as far as the session layer is
//! concerned:
//!
//! - **Types** ([`Identity`], [`UserId`], [`SignUpDetails`]): the
//!   non-secret profile that gets persisted and shown in the UI.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how an identity becomes
//!   the string stored under the identity key, and back.
//! - **Validation** ([`validate_name`], [`validate_email`],
//!   [`validate_phone`], [`validate_pin`]): the form checks a UI runs
//!   before calling into the session manager.
//! - **Errors** ([`IdentityError`]).
//!
//! # Architecture
//!
//! ```text
//! Session Manager (above)  ← persists Identity blobs, authenticates users
//!     ↕
//! Identity (this crate)  ← data model + blob format
//!     ↕
//! Session Store (below)  ← holds the blobs as plain strings
//! ```

mod codec;
mod error;
mod types;
mod validate;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::IdentityError;
pub use types::{Identity, SignUpDetails, UserId};
pub use validate::{
    validate_email, validate_name, validate_phone, validate_pin, Field,
    FieldError, ValidationErrors, PIN_LENGTH,
};
