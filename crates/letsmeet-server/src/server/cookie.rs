//! Refresh token cookie.
//!
//! The cookie is scoped to the issuing event's refresh endpoint, so a
//! browser never sends one event's refresh token to another event.

use std::fmt;

pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// A `Set-Cookie` value carrying (or clearing) a refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshCookie {
    token: String,
    path: String,
    max_age_secs: i64,
}

impl RefreshCookie {
    pub fn new(public_event_id: &str, token: &str, max_age_secs: i64) -> Self {
        Self {
            token: token.to_string(),
            path: refresh_path(public_event_id),
            max_age_secs,
        }
    }

    /// Cookie that makes the browser drop the refresh token.
    pub fn cleared(public_event_id: &str) -> Self {
        Self::new(public_event_id, "", 0)
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for RefreshCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{REFRESH_COOKIE_NAME}={}; Path={}; Max-Age={}; HttpOnly; Secure; SameSite=Strict",
            self.token, self.path, self.max_age_secs
        )
    }
}

/// Path of an event's refresh endpoint.
pub fn refresh_path(public_event_id: &str) -> String {
    format!("/{public_event_id}/refresh_token")
}

/// Pull the refresh token out of a `Cookie` request header.
pub fn refresh_token_from_header(cookie_header: &str) -> Option<&str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == REFRESH_COOKIE_NAME)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
