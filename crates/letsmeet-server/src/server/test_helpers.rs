//! Shared test helpers for service test modules.

use std::sync::Arc;

use letsmeet_core::Interval;
use letsmeet_core::config::IdentifierConfig;

use crate::auth::{Argon2Credentials, TokenService};
use crate::server::auth_svc::{AuthService, CreateEventRequest};
use crate::server::event_svc::EventService;
use crate::storage::EventDatabase;

pub fn test_tokens() -> Arc<TokenService> {
    Arc::new(TokenService::new(
        b"test-access-secret",
        b"test-refresh-secret",
        900,
        604_800,
    ))
}

/// Cheap argon2 parameters so tests don't spend seconds hashing.
pub fn fast_credentials() -> Argon2Credentials {
    Argon2Credentials::with_params(256, 1).unwrap()
}

pub async fn event_service_with(config: &IdentifierConfig) -> Arc<EventService> {
    let db = EventDatabase::open_in_memory().await.unwrap();
    Arc::new(EventService::new(db, config))
}

pub async fn event_service() -> Arc<EventService> {
    event_service_with(&IdentifierConfig::default()).await
}

pub async fn auth_service() -> (AuthService, Arc<EventService>, Arc<TokenService>) {
    let events = event_service().await;
    let tokens = test_tokens();
    let svc = AuthService::new(
        Arc::clone(&events),
        Arc::clone(&tokens),
        Arc::new(fast_credentials()),
    );
    (svc, events, tokens)
}

/// Interval on 2024-01-01 between the given UTC hours.
pub fn hours(start: i64, end: i64) -> Interval {
    const JAN_1_2024: i64 = 1_704_067_200;
    Interval::from_unix_seconds(JAN_1_2024 + start * 3600, JAN_1_2024 + end * 3600).unwrap()
}

/// "Team Sync" from 09:00 to 10:00, organised by alice.
pub fn team_sync() -> CreateEventRequest {
    CreateEventRequest {
        title: "Team Sync".into(),
        description: "Weekly catch-up".into(),
        intervals: vec![hours(9, 10)],
        username: "alice".into(),
        password: "correct horse".into(),
        owner_intervals: None,
    }
}
