//! Login, token refresh, and logout for event participants.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use letsmeet_core::Interval;

use crate::auth::password::{hash_blocking, verify_blocking};
use crate::auth::{CredentialService, SessionClaims, TokenKind, TokenService};
use crate::error::{Error, Result};
use crate::server::authz::{Requirement, authorize};
use crate::server::cookie::RefreshCookie;
use crate::server::event_svc::{EventService, NewEvent, NewOwner};
use crate::storage::EventDatabase;

/// Body returned to the client on login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub public_event_id: String,
    pub access_token: String,
    /// Seconds until the access token expires.
    pub access_token_lifetime: i64,
}

/// A freshly issued token pair. The refresh token travels in a cookie,
/// not in the response body.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub response: TokenResponse,
    pub refresh_token: String,
    pub refresh_token_lifetime: i64,
}

impl SessionGrant {
    pub fn refresh_cookie(&self) -> RefreshCookie {
        RefreshCookie::new(
            &self.response.public_event_id,
            &self.refresh_token,
            self.refresh_token_lifetime,
        )
    }
}

/// Request to create an event and sign its organizer in.
#[derive(Debug, Clone)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub intervals: Vec<Interval>,
    pub username: String,
    pub password: String,
    /// Organizer availability if it differs from the candidate intervals.
    pub owner_intervals: Option<Vec<Interval>>,
}

pub struct AuthService {
    db: EventDatabase,
    events: Arc<EventService>,
    tokens: Arc<TokenService>,
    credentials: Arc<dyn CredentialService>,
}

impl AuthService {
    pub fn new(
        events: Arc<EventService>,
        tokens: Arc<TokenService>,
        credentials: Arc<dyn CredentialService>,
    ) -> Self {
        Self {
            db: events.db().clone(),
            events,
            tokens,
            credentials,
        }
    }

    /// Create an event and return a session for its admin. The admin's
    /// refresh token is stored in the creating transaction.
    #[instrument(skip(self, req), fields(op = "CreateEvent", username = %req.username))]
    pub async fn create_event(&self, req: CreateEventRequest) -> Result<SessionGrant> {
        let password_hash = hash_blocking(&self.credentials, &req.password).await?;

        let event = NewEvent {
            title: req.title,
            description: req.description,
            intervals: req.intervals,
            owner: NewOwner {
                username: req.username,
                password_hash,
                intervals: req.owner_intervals,
            },
        };
        let (_, grant) = self
            .events
            .create_event_with_session(&event, |created| {
                let claims = SessionClaims::new(&created.public_id, &event.owner.username, true);
                let (grant, digest) = self.mint(claims)?;
                Ok((grant, Some(digest)))
            })
            .await?;
        Ok(grant)
    }

    /// Register a participant and sign them in.
    #[instrument(skip(self, password, intervals), fields(op = "Register"))]
    pub async fn register(
        &self,
        public_id: &str,
        username: &str,
        password: &str,
        intervals: &[Interval],
    ) -> Result<SessionGrant> {
        if intervals.is_empty() {
            return Err(Error::EmptySchedule);
        }

        let password_hash = hash_blocking(&self.credentials, password).await?;
        let registered = self
            .events
            .register_user(public_id, username, &password_hash, intervals)
            .await?;

        let claims = SessionClaims::new(public_id, username, false);
        self.issue_session(registered.event_id, claims).await
    }

    #[instrument(skip(self, password), fields(op = "Login"))]
    pub async fn login(
        &self,
        public_id: &str,
        username: &str,
        password: &str,
    ) -> Result<SessionGrant> {
        let event_id = self
            .db
            .find_event_id(public_id)
            .await?
            .ok_or(Error::EventNotFound)?;

        let Some(user) = self.db.get_user(event_id, username).await? else {
            warn!("Login for unknown user");
            return Err(Error::UserNotFound);
        };

        let valid = verify_blocking(&self.credentials, password, &user.password_hash).await?;
        if !valid {
            warn!("Failed login attempt");
            return Err(Error::InvalidCredentials);
        }

        let claims = SessionClaims::new(public_id, user.username, user.is_admin);
        let grant = self.issue_session(event_id, claims).await?;
        info!("User logged in");
        Ok(grant)
    }

    /// Exchange a refresh token for a new pair, retiring the presented one.
    #[instrument(skip(self, refresh_token), fields(op = "RefreshToken"))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<SessionGrant> {
        let claims = self.tokens.verify(refresh_token, TokenKind::Refresh)?;

        let event_id = self
            .db
            .find_event_id(&claims.event_id)
            .await?
            .ok_or(Error::SessionInvalid)?;

        let access_token = self.tokens.issue_access_token(&claims)?;
        let new_refresh = self.tokens.issue_refresh_token(&claims)?;

        // Rotation: only succeeds while the presented token is still current.
        let rotated = self
            .db
            .replace_current_token(
                event_id,
                &claims.username,
                &TokenService::digest(refresh_token),
                &TokenService::digest(&new_refresh),
            )
            .await?;
        if !rotated {
            warn!(
                event = %claims.event_id,
                username = %claims.username,
                "Refresh with a token that is not current"
            );
            return Err(Error::SessionInvalid);
        }

        debug!(event = %claims.event_id, username = %claims.username, "Session rotated");
        Ok(self.grant(claims.event_id, access_token, new_refresh))
    }

    /// Forget the user's refresh token. Never fails.
    #[instrument(skip(self), fields(op = "Logout"))]
    pub async fn logout(&self, public_id: &str, username: &str) {
        let event_id = match self.db.find_event_id(public_id).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                debug!("Logout for unknown event");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Logout lookup failed");
                return;
            }
        };

        match self.db.clear_current_token(event_id, username).await {
            Ok(()) => info!("User logged out"),
            Err(e) => warn!(error = %e, "Clearing refresh token failed"),
        }
    }

    /// Replace the caller's own availability.
    #[instrument(skip(self, authorization, intervals), fields(op = "EditSchedule"))]
    pub async fn update_schedule(
        &self,
        authorization: Option<&str>,
        public_id: &str,
        username: &str,
        intervals: &[Interval],
    ) -> Result<()> {
        authorize(
            &self.tokens,
            authorization,
            public_id,
            username,
            Requirement::SameUser,
        )?;
        self.events
            .update_schedule(public_id, username, intervals)
            .await
    }

    /// Replace the event's candidate intervals. Admin only.
    #[instrument(skip(self, authorization, intervals), fields(op = "EditEventIntervals"))]
    pub async fn update_event_intervals(
        &self,
        authorization: Option<&str>,
        public_id: &str,
        username: &str,
        intervals: &[Interval],
    ) -> Result<()> {
        authorize(
            &self.tokens,
            authorization,
            public_id,
            username,
            Requirement::Admin,
        )?;
        self.events
            .replace_event_intervals(public_id, intervals)
            .await
    }

    /// Issue a token pair and make its refresh token the user's only live one.
    ///
    /// Runs after registration has committed; if storing the token fails the
    /// user exists without a session and can recover by logging in.
    async fn issue_session(&self, event_id: i64, claims: SessionClaims) -> Result<SessionGrant> {
        let username = claims.username.clone();
        let (grant, digest) = self.mint(claims)?;

        let stored = self.db.set_current_token(event_id, &username, &digest).await?;
        if !stored {
            return Err(Error::UserNotFound);
        }

        Ok(grant)
    }

    /// Sign a token pair; returns the grant and the refresh token's digest.
    fn mint(&self, claims: SessionClaims) -> Result<(SessionGrant, String)> {
        let access_token = self.tokens.issue_access_token(&claims)?;
        let refresh_token = self.tokens.issue_refresh_token(&claims)?;
        let digest = TokenService::digest(&refresh_token);
        Ok((self.grant(claims.event_id, access_token, refresh_token), digest))
    }

    fn grant(
        &self,
        public_event_id: String,
        access_token: String,
        refresh_token: String,
    ) -> SessionGrant {
        SessionGrant {
            response: TokenResponse {
                public_event_id,
                access_token,
                access_token_lifetime: self.tokens.ttl_secs(TokenKind::Access),
            },
            refresh_token,
            refresh_token_lifetime: self.tokens.ttl_secs(TokenKind::Refresh),
        }
    }
}
