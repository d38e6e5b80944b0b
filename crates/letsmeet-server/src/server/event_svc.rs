//! Event creation, user registration, and schedule edits.
//!
//! Every write path runs inside one [`EventTx`]; an early return drops the
//! transaction and rolls back everything it wrote.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use letsmeet_core::config::IdentifierConfig;
use letsmeet_core::db::DatabaseError;
use letsmeet_core::ident::MAX_WORD_COUNT;
use letsmeet_core::{IdentifierGenerator, Interval};

use crate::error::{Error, Result};
use crate::storage::{EventDatabase, EventTx};

/// Event to create together with its admin.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    /// Candidate intervals; may be empty.
    pub intervals: Vec<Interval>,
    pub owner: NewOwner,
}

/// The creating user.
#[derive(Debug, Clone)]
pub struct NewOwner {
    pub username: String,
    pub password_hash: String,
    /// Owner availability. `None` reuses the event's candidate intervals.
    pub intervals: Option<Vec<Interval>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEvent {
    pub id: i64,
    pub public_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisteredUser {
    pub event_id: i64,
    pub user_id: i64,
}

/// Everything the event page shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub public_id: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub intervals: Vec<Interval>,
    /// Availability per username. Users without intervals map to `[]`.
    pub user_intervals: BTreeMap<String, Vec<Interval>>,
}

pub struct EventService {
    db: EventDatabase,
    ident: IdentifierGenerator,
    word_count: u32,
    max_attempts: u32,
}

impl EventService {
    pub fn new(db: EventDatabase, config: &IdentifierConfig) -> Self {
        Self {
            db,
            ident: IdentifierGenerator::new(config.seed),
            word_count: config.word_count.clamp(1, MAX_WORD_COUNT),
            max_attempts: config.max_attempts.max(1),
        }
    }

    pub const fn db(&self) -> &EventDatabase {
        &self.db
    }

    /// Create an event and its admin user in one transaction.
    pub async fn create_event(&self, event: &NewEvent) -> Result<CreatedEvent> {
        let (created, ()) = self
            .create_event_with_session(event, |_| Ok(((), None)))
            .await?;
        Ok(created)
    }

    /// Create an event and its admin user in one transaction.
    ///
    /// `session` runs once the public id is known and before commit. The
    /// token it returns, if any, becomes the admin's current refresh token
    /// in the same transaction; an error from it rolls everything back.
    #[instrument(skip(self, event, session), fields(op = "CreateEvent", owner = %event.owner.username))]
    pub async fn create_event_with_session<T, F>(
        &self,
        event: &NewEvent,
        session: F,
    ) -> Result<(CreatedEvent, T)>
    where
        F: FnOnce(&CreatedEvent) -> Result<(T, Option<String>)>,
    {
        let mut tx = self.db.begin().await?;

        let event_id = tx.insert_event(&event.title, &event.description).await?;
        let public_id = self.assign_public_id(&mut tx, event_id).await?;

        let owner = &event.owner;
        let user_id = tx
            .insert_user(event_id, &owner.username, &owner.password_hash, true)
            .await
            .map_err(username_conflict)?;

        tx.insert_event_intervals(event_id, &event.intervals).await?;
        let owner_intervals = owner.intervals.as_deref().unwrap_or(&event.intervals);
        tx.insert_user_intervals(user_id, owner_intervals).await?;

        let created = CreatedEvent {
            id: event_id,
            public_id,
        };
        let (value, token) = session(&created)?;
        if let Some(token) = token {
            tx.set_current_token(user_id, &token).await?;
        }

        tx.commit().await?;

        info!(event_id, public_id = %created.public_id, "Event created");
        Ok((created, value))
    }

    /// Try successively longer identifiers until one is free.
    async fn assign_public_id(&self, tx: &mut EventTx, event_id: i64) -> Result<String> {
        for attempt in 0..self.max_attempts {
            let word_count = self.word_count.saturating_add(attempt);
            let candidate = self.ident.generate(event_id, word_count);
            match tx.set_public_id(event_id, &candidate).await {
                Ok(()) => return Ok(candidate),
                Err(e) if e.is_duplicate_key() => {
                    debug!(event_id, word_count, candidate = %candidate, "Public id collision");
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(event_id, attempts = self.max_attempts, "Public id attempts exhausted");
        Err(Error::IdentifierExhausted)
    }

    /// Register a participant under an existing event.
    #[instrument(skip(self, password_hash, intervals), fields(op = "RegisterUser"))]
    pub async fn register_user(
        &self,
        public_id: &str,
        username: &str,
        password_hash: &str,
        intervals: &[Interval],
    ) -> Result<RegisteredUser> {
        if intervals.is_empty() {
            return Err(Error::EmptySchedule);
        }

        let mut tx = self.db.begin().await?;
        let event_id = tx
            .find_event_id(public_id)
            .await?
            .ok_or(Error::EventNotFound)?;

        let user_id = tx
            .insert_user(event_id, username, password_hash, false)
            .await
            .map_err(username_conflict)?;
        tx.insert_user_intervals(user_id, intervals).await?;

        tx.commit().await?;

        info!(event_id, "User registered");
        Ok(RegisteredUser { event_id, user_id })
    }

    /// Replace a user's availability wholesale.
    #[instrument(skip(self, intervals), fields(op = "UpdateSchedule"))]
    pub async fn update_schedule(
        &self,
        public_id: &str,
        username: &str,
        intervals: &[Interval],
    ) -> Result<()> {
        if intervals.is_empty() {
            return Err(Error::EmptySchedule);
        }

        let mut tx = self.db.begin().await?;
        let event_id = tx
            .find_event_id(public_id)
            .await?
            .ok_or(Error::EventNotFound)?;
        let user_id = tx
            .find_user_id(event_id, username)
            .await?
            .ok_or(Error::UserNotFound)?;

        let removed = tx.delete_user_intervals(user_id).await?;
        tx.insert_user_intervals(user_id, intervals).await?;
        tx.commit().await?;

        debug!(removed, added = intervals.len(), "Schedule replaced");
        Ok(())
    }

    /// Replace the event's candidate intervals. An empty set is allowed.
    #[instrument(skip(self, intervals), fields(op = "ReplaceEventIntervals"))]
    pub async fn replace_event_intervals(
        &self,
        public_id: &str,
        intervals: &[Interval],
    ) -> Result<()> {
        let mut tx = self.db.begin().await?;
        let event_id = tx
            .find_event_id(public_id)
            .await?
            .ok_or(Error::EventNotFound)?;

        tx.delete_event_intervals(event_id).await?;
        tx.insert_event_intervals(event_id, intervals).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Event details with everyone's availability.
    #[instrument(skip(self), fields(op = "GetEvent"))]
    pub async fn get_event(&self, public_id: &str) -> Result<EventDetails> {
        let event = self.db.get_event(public_id).await.map_err(|e| match e {
            DatabaseError::NotFound(_) => Error::EventNotFound,
            other => other.into(),
        })?;

        let intervals = self.db.get_event_intervals(event.id).await?;

        let mut user_intervals: BTreeMap<String, Vec<Interval>> = self
            .db
            .list_usernames(event.id)
            .await?
            .into_iter()
            .map(|name| (name, Vec::new()))
            .collect();
        for (username, interval) in self.db.get_user_intervals(event.id).await? {
            user_intervals.entry(username).or_default().push(interval);
        }

        Ok(EventDetails {
            public_id: event.public_id.unwrap_or_else(|| public_id.to_string()),
            title: event.title,
            description: event.description,
            created_at: DateTime::from_timestamp(event.created_at, 0).unwrap_or_default(),
            intervals,
            user_intervals,
        })
    }
}

fn username_conflict(e: DatabaseError) -> Error {
    if e.is_duplicate_key() {
        Error::UsernameTaken
    } else {
        e.into()
    }
}
