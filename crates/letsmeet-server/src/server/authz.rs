//! Bearer token authorization for edit operations.

use crate::auth::{SessionClaims, TokenKind, TokenService};
use crate::error::{Error, Result};

/// What the caller must be, relative to the target resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// The token's event and username match the target.
    SameUser,
    /// As `SameUser`, and the token carries the admin claim.
    Admin,
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Check an access token against the target `(event_id, username)`.
///
/// A missing header or any claim mismatch is `NotAuthorized`; an unusable
/// token reports its token error so clients can tell when to refresh.
pub fn authorize(
    tokens: &TokenService,
    authorization: Option<&str>,
    event_id: &str,
    username: &str,
    requirement: Requirement,
) -> Result<SessionClaims> {
    let token = authorization
        .and_then(bearer_token)
        .ok_or(Error::NotAuthorized)?;

    let claims = tokens.verify(token, TokenKind::Access)?;

    if claims.event_id != event_id || claims.username != username {
        return Err(Error::NotAuthorized);
    }
    if requirement == Requirement::Admin && !claims.admin {
        return Err(Error::NotAuthorized);
    }

    Ok(claims)
}
