//! Authentication module for `LetsMeet`.
//!
//! Provides JWT token management and password hashing.

pub mod claims;
pub mod jwt;
pub mod password;

pub use claims::{Claims, SessionClaims};
pub use jwt::{TokenError, TokenKind, TokenService};
pub use password::{Argon2Credentials, CredentialError, CredentialService};
