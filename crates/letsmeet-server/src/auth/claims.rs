//! JWT claims structure for `LetsMeet` auth.

use serde::{Deserialize, Serialize};

/// Identity carried by both access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Public identifier of the event.
    pub event_id: String,
    /// Username within the event.
    pub username: String,
    /// Whether the user created the event.
    pub admin: bool,
}

impl SessionClaims {
    pub fn new(event_id: impl Into<String>, username: impl Into<String>, admin: bool) -> Self {
        Self {
            event_id: event_id.into(),
            username: username.into(),
            admin,
        }
    }
}

/// Signed JWT payload: the session claims plus registered fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// JWT ID (unique per token).
    pub jti: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
    #[serde(flatten)]
    pub session: SessionClaims,
}
