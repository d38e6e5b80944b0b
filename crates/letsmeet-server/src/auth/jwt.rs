//! JWT token issuance and validation.
//!
//! Access and refresh tokens share a claim shape but are signed with
//! different secrets, so one kind never verifies as the other.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sha2::{Digest, Sha256};
use tracing::debug;

use letsmeet_core::config::AuthConfig;
use letsmeet_core::db::unix_timestamp;

use super::claims::{Claims, SessionClaims};

/// Which signing key a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// Token verification and signing failures.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token signature is invalid")]
    Invalid,

    #[error("Token has expired")]
    Expired,

    #[error("Token is malformed")]
    Malformed,

    #[error("Token signing failed: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::Invalid,
            _ => Self::Malformed,
        }
    }
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl KeyPair {
    fn new(secret: &[u8], ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }
}

/// Manages access/refresh token creation and validation.
pub struct TokenService {
    access: KeyPair,
    refresh: KeyPair,
    validation: Validation,
}

impl TokenService {
    /// Create a new `TokenService`. The two secrets must differ.
    pub fn new(
        access_secret: &[u8],
        refresh_secret: &[u8],
        access_ttl_secs: i64,
        refresh_ttl_secs: i64,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            access: KeyPair::new(access_secret, access_ttl_secs),
            refresh: KeyPair::new(refresh_secret, refresh_ttl_secs),
            validation,
        }
    }

    /// Build from validated configuration.
    pub fn from_config(auth: &AuthConfig) -> Self {
        Self::new(
            auth.access_token_secret.as_deref().unwrap_or_default().as_bytes(),
            auth.refresh_token_secret.as_deref().unwrap_or_default().as_bytes(),
            auth.access_token_ttl_secs,
            auth.refresh_token_ttl_secs,
        )
    }

    const fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Lifetime in seconds of tokens of the given kind.
    pub const fn ttl_secs(&self, kind: TokenKind) -> i64 {
        self.keys(kind).ttl_secs
    }

    /// Issue a short-lived access token.
    pub fn issue_access_token(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        self.issue(claims, TokenKind::Access)
    }

    /// Issue a long-lived refresh token.
    pub fn issue_refresh_token(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        self.issue(claims, TokenKind::Refresh)
    }

    fn issue(&self, claims: &SessionClaims, kind: TokenKind) -> Result<String, TokenError> {
        let keys = self.keys(kind);
        let now = unix_timestamp();
        let exp = now.checked_add(keys.ttl_secs).ok_or_else(|| {
            TokenError::Signing(format!("{} token lifetime overflows", kind.as_str()))
        })?;
        let payload = Claims {
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now,
            exp,
            session: claims.clone(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &payload, &keys.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Validate a token against the key for `kind` and return its claims.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<SessionClaims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.keys(kind).decoding, &self.validation)
            .map_err(|e| {
                debug!(kind = kind.as_str(), error = %e, "Token rejected");
                TokenError::from(e)
            })?;
        Ok(data.claims.session)
    }

    /// Hash a token for storage (we don't store raw tokens).
    pub fn digest(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
