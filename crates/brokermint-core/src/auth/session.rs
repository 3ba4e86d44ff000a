use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::store::KeyValueStore;

/// Durable key holding the raw bearer token
pub const TOKEN_KEY: &str = "token";

/// Durable key holding the JSON-serialized `UserProfile`
pub const USER_KEY: &str = "user";

/// Opaque bearer token issued by the service at login or registration.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Profile of the signed-in operator.
///
/// Only `username` and `role` are interpreted; anything else the service
/// sends (id, email, full_name, ...) is kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub role: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn new(username: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role: role.into(),
            extra: Map::new(),
        }
    }

    pub fn full_name(&self) -> Option<&str> {
        self.extra_str("full_name")
    }

    pub fn email(&self) -> Option<&str> {
        self.extra_str("email")
    }

    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case("admin")
    }

    fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// A credential paired with the profile it authenticates.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: UserProfile,
    pub credential: Credential,
}

impl Session {
    pub fn new(user: UserProfile, credential: Credential) -> Self {
        Self { user, credential }
    }

    /// Read the durable session record.
    ///
    /// Returns `None` unless both keys are present and the profile parses.
    /// Nothing is written, so a partial record stays exactly as found.
    pub fn load(store: &dyn KeyValueStore) -> Option<Self> {
        let token = match store.get(TOKEN_KEY) {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => {
                debug!("No stored token");
                return None;
            }
            Err(e) => {
                debug!(error = %e, "Failed to read stored token");
                return None;
            }
        };

        let user_json = match store.get(USER_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => {
                debug!("Stored token has no matching user profile");
                return None;
            }
            Err(e) => {
                debug!(error = %e, "Failed to read stored user profile");
                return None;
            }
        };

        match serde_json::from_str::<UserProfile>(&user_json) {
            Ok(user) => Some(Self::new(user, Credential::new(token))),
            Err(e) => {
                debug!(error = %e, "Stored user profile is malformed");
                None
            }
        }
    }

    /// Write both durable keys.
    ///
    /// If either write fails both keys are removed, so the store holds this
    /// whole record or nothing.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        let user_json =
            serde_json::to_string(&self.user).context("Failed to serialize user profile")?;
        let written = store
            .set(TOKEN_KEY, self.credential.as_str())
            .and_then(|()| store.set(USER_KEY, &user_json));

        if written.is_err() {
            if let Err(e) = Self::clear(store) {
                warn!(error = %e, "Failed to remove partially written session");
            }
        }
        written
    }

    /// Remove both durable keys. Removing absent keys is not an error.
    pub fn clear(store: &mut dyn KeyValueStore) -> Result<()> {
        let token = store.remove(TOKEN_KEY);
        let user = store.remove(USER_KEY);
        token.and(user)
    }
}
