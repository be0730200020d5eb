//! # Latchkey
//!
//! Client-side authentication sessions for apps that sign users in with a
//! phone number and a PIN.
//!
//! Latchkey keeps track of who is signed in, persists that across
//! restarts, and publishes an observable [`AuthState`] the UI renders
//! from. Applications build one [`Latchkey`] session manager at startup
//! and call `sign_in`, `sign_up` and `sign_out` on it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use latchkey::prelude::*;
//!
//! # async fn run() -> Result<(), LatchkeyError> {
//! latchkey::logging::init("info");
//!
//! let session = LatchkeyBuilder::new()
//!     .store_dir("/var/lib/myapp/session")
//!     .credentials_file("/var/lib/myapp/users.json")
//!     .build()
//!     .await?;
//!
//! match session.sign_in("+911111111111", "12345").await {
//!     Ok(identity) => println!("welcome back, {}", identity.name),
//!     Err(e) => println!("{e}"), // "Invalid phone number or PIN"
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
mod config;
mod error;
pub mod logging;

pub use builder::{Latchkey, LatchkeyBuilder};
pub use config::{LatchkeyConfig, LOG_ENV, STORE_DIR_ENV};
pub use error::LatchkeyError;

pub use latchkey_identity::{
    Identity, SignUpDetails, UserId, ValidationErrors, validate_email, validate_name,
    validate_phone, validate_pin,
};
pub use latchkey_session::{
    AuthError, AuthState, CredentialRecord, PersistencePolicy, SessionConfig, SessionManager,
};

/// Everything an application needs to drive a session.
pub mod prelude {
    pub use crate::{
        AuthError, AuthState, CredentialRecord, Identity, Latchkey, LatchkeyBuilder,
        LatchkeyConfig, LatchkeyError, PersistencePolicy, SessionConfig, SignUpDetails, UserId,
    };
    pub use latchkey_session::CredentialProvider;
    pub use latchkey_store::SessionStore;
}
