//! Read queries for `LetsMeet` storage.

use letsmeet_core::Interval;

use super::db::{DatabaseError, EventDatabase};
use super::models::{Event, IntervalRow, User, UserIntervalRow};

impl EventDatabase {
    // =========================================================================
    // Event queries
    // =========================================================================

    /// Get an event by its public identifier.
    pub async fn get_event(&self, public_id: &str) -> Result<Event, DatabaseError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE public_id = ?")
            .bind(public_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Event {public_id}")))
    }

    /// Resolve an event's internal id from its public identifier.
    pub async fn find_event_id(&self, public_id: &str) -> Result<Option<i64>, DatabaseError> {
        let id = sqlx::query_scalar("SELECT id FROM events WHERE public_id = ?")
            .bind(public_id)
            .fetch_optional(self.pool())
            .await?;
        Ok(id)
    }

    /// Candidate intervals of an event, earliest first.
    pub async fn get_event_intervals(&self, event_id: i64) -> Result<Vec<Interval>, DatabaseError> {
        sqlx::query_as::<_, IntervalRow>(
            "SELECT start_at, end_at FROM event_intervals WHERE event_id = ? ORDER BY start_at, end_at",
        )
        .bind(event_id)
        .fetch_all(self.pool())
        .await?
        .into_iter()
        .map(IntervalRow::into_interval)
        .collect()
    }

    // =========================================================================
    // User queries
    // =========================================================================

    /// Get a user by event and username.
    pub async fn get_user(
        &self,
        event_id: i64,
        username: &str,
    ) -> Result<Option<User>, DatabaseError> {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE event_id = ? AND username = ?")
                .bind(event_id)
                .bind(username)
                .fetch_optional(self.pool())
                .await?;
        Ok(user)
    }

    /// Availability of every user in an event, ordered by username then time.
    pub async fn get_user_intervals(
        &self,
        event_id: i64,
    ) -> Result<Vec<(String, Interval)>, DatabaseError> {
        sqlx::query_as::<_, UserIntervalRow>(
            "SELECT u.username, i.start_at, i.end_at FROM user_intervals i \
             JOIN users u ON u.id = i.user_id \
             WHERE u.event_id = ? ORDER BY u.username, i.start_at, i.end_at",
        )
        .bind(event_id)
        .fetch_all(self.pool())
        .await?
        .into_iter()
        .map(|row| {
            let interval = IntervalRow {
                start_at: row.start_at,
                end_at: row.end_at,
            }
            .into_interval()?;
            Ok((row.username, interval))
        })
        .collect()
    }

    /// Usernames registered under an event, admins included.
    pub async fn list_usernames(&self, event_id: i64) -> Result<Vec<String>, DatabaseError> {
        let names =
            sqlx::query_scalar("SELECT username FROM users WHERE event_id = ? ORDER BY username")
                .bind(event_id)
                .fetch_all(self.pool())
                .await?;
        Ok(names)
    }
}
