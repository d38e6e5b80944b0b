//! Service error taxonomy.
//!
//! `Display` output is safe to show to end users: storage and hashing
//! details are kept in the error source, not in the message.

use letsmeet_core::db::DatabaseError;

use crate::auth::{CredentialError, TokenError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Event not found")]
    EventNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username is already taken for this event")]
    UsernameTaken,

    #[error("At least one available interval is required")]
    EmptySchedule,

    #[error("Could not allocate a unique event identifier")]
    IdentifierExhausted,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Token expired")]
    TokenExpired,

    #[error("Malformed token")]
    TokenMalformed,

    #[error("Session is no longer valid")]
    SessionInvalid,

    #[error("Not authorized")]
    NotAuthorized,

    #[error("Token issuance failed")]
    TokenIssue(#[source] TokenError),

    #[error("Credential processing failed")]
    Credential(#[source] CredentialError),

    #[error("Storage failure")]
    StorageFailure(#[source] DatabaseError),
}

impl Error {
    /// Message for responses where revealing which of username or password
    /// was wrong would allow username enumeration.
    pub fn public_message(&self) -> String {
        match self {
            Self::UserNotFound | Self::InvalidCredentials => "Invalid credentials".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the failure is an authentication or authorization rejection.
    pub const fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound
                | Self::InvalidCredentials
                | Self::TokenInvalid
                | Self::TokenExpired
                | Self::TokenMalformed
                | Self::SessionInvalid
                | Self::NotAuthorized
        )
    }
}

impl From<DatabaseError> for Error {
    fn from(e: DatabaseError) -> Self {
        Self::StorageFailure(e)
    }
}

impl From<CredentialError> for Error {
    fn from(e: CredentialError) -> Self {
        Self::Credential(e)
    }
}

impl From<TokenError> for Error {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Invalid => Self::TokenInvalid,
            TokenError::Expired => Self::TokenExpired,
            TokenError::Malformed => Self::TokenMalformed,
            TokenError::Signing(_) => Self::TokenIssue(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_details_stay_out_of_display() {
        let err = Error::from(DatabaseError::Query("no such table: users".into()));
        assert_eq!(err.to_string(), "Storage failure");
        assert!(
            std::error::Error::source(&err)
                .is_some_and(|s| s.to_string().contains("no such table"))
        );
    }

    #[test]
    fn credential_failures_share_public_message() {
        assert_eq!(
            Error::UserNotFound.public_message(),
            Error::InvalidCredentials.public_message()
        );
        assert_eq!(Error::EmptySchedule.public_message(), Error::EmptySchedule.to_string());
    }

    #[test]
    fn token_errors_map_to_taxonomy() {
        assert!(matches!(Error::from(TokenError::Expired), Error::TokenExpired));
        assert!(matches!(Error::from(TokenError::Invalid), Error::TokenInvalid));
        assert!(matches!(Error::from(TokenError::Malformed), Error::TokenMalformed));
        assert!(Error::from(TokenError::Expired).is_auth_failure());
        assert!(!Error::UsernameTaken.is_auth_failure());
    }
}
