//! Session-related types.
//!
//! Types stored in the session for authentication state.

use std::fmt;

use serde::{Deserialize, Serialize};

use foodiefinds_core::User;

use crate::manifest::AccessToken;

/// Session-stored authentication: the backend token and a read-only copy
/// of the user it belongs to.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Backend bearer token.
    pub token: String,
    /// Cached user, refreshed on every root page load.
    pub user: User,
}

impl AuthSession {
    #[must_use]
    pub fn new(token: &AccessToken, user: User) -> Self {
        Self {
            token: token.expose().to_string(),
            user,
        }
    }

    /// The token in the form the backend client takes.
    #[must_use]
    pub fn access_token(&self) -> AccessToken {
        AccessToken::new(self.token.clone())
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// Session keys.
pub mod session_keys {
    /// Key for the current authentication.
    pub const AUTH: &str = "auth";

    /// Key for the locally patched restaurant list.
    pub const RESTAURANTS: &str = "restaurants";
}
