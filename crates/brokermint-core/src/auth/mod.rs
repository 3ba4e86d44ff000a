//! Authentication module for managing the operator session.
//!
//! This module provides:
//! - `Session`: credential + profile pair and its durable record
//! - `SessionController`: the state machine that owns the session, the
//!   active view, and reactions to rejected credentials
//! - `KeyValueStore` backends: `FileStore`, `KeyringStore`, `MemoryStore`
//!
//! Sessions are restored optimistically on startup and last until logout
//! or the first `401` from the service.

pub mod controller;
pub mod credentials;
pub mod session;
pub mod store;

pub use controller::{SessionController, SessionError, SessionState};
pub use credentials::KeyringStore;
pub use session::{Credential, Session, UserProfile, TOKEN_KEY, USER_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore};
