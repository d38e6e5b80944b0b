//! Data models for `LetsMeet` storage.

use serde::{Deserialize, Serialize};

use letsmeet_core::Interval;
use letsmeet_core::db::DatabaseError;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    /// `None` only inside the creating transaction.
    pub public_id: Option<String>,
    pub title: String,
    pub description: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub event_id: i64,
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub refresh_token_hash: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct IntervalRow {
    pub start_at: i64,
    pub end_at: i64,
}

impl IntervalRow {
    pub fn into_interval(self) -> Result<Interval, DatabaseError> {
        Interval::from_unix_seconds(self.start_at, self.end_at).ok_or_else(|| {
            DatabaseError::Query(format!(
                "interval out of range: {}..{}",
                self.start_at, self.end_at
            ))
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserIntervalRow {
    pub username: String,
    pub start_at: i64,
    pub end_at: i64,
}
