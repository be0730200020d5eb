//! Authentication session management for Latchkey.
//!
//! This crate decides who is signed in:
//!
//! 1. **Credentials**: who may sign in, and with which PIN
//!    ([`CredentialProvider`] trait, [`MemoryCredentials`],
//!    [`FileCredentials`])
//! 2. **Session state**: the observable [`AuthState`] and the
//!    [`SessionManager`] that drives it
//! 3. **Persistence**: writing the session to a
//!    [`SessionStore`](latchkey_store::SessionStore) so it survives a
//!    restart, under a [`PersistencePolicy`]
//!
//! # How it fits in the stack
//!
//! ```text
//! Facade / UI (above)  ← calls sign_in/sign_up/sign_out, renders AuthState
//!     ↕
//! Session Layer (this crate)  ← owns the auth state machine
//!     ↕
//! Identity + Store (below)  ← Identity types and key-value persistence
//! ```

mod credentials;
mod durable;
mod error;
mod manager;
mod registry;
mod session;

pub use credentials::{CredentialProvider, CredentialRecord, Credentials, PinHash};
pub use durable::FileCredentials;
pub use error::{AuthError, CredentialError};
pub use manager::SessionManager;
pub use registry::MemoryCredentials;
pub use session::{AuthState, PersistencePolicy, SessionConfig, SessionToken};
