//! Refresh token slot: one live token per (event, user).
//!
//! Values stored here are opaque to the store; the auth layer passes token
//! digests. Every write is a single statement, so concurrent service
//! instances sharing the database see atomic transitions.

use super::db::{DatabaseError, EventDatabase};

impl EventDatabase {
    /// Overwrite the user's current token. Returns `false` if the user does
    /// not exist.
    pub async fn set_current_token(
        &self,
        event_id: i64,
        username: &str,
        token: &str,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token_hash = ? WHERE event_id = ? AND username = ?",
        )
        .bind(token)
        .bind(event_id)
        .bind(username)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// The user's current token; `None` when never issued, logged out, or
    /// the user does not exist.
    pub async fn get_current_token(
        &self,
        event_id: i64,
        username: &str,
    ) -> Result<Option<String>, DatabaseError> {
        let token: Option<Option<String>> = sqlx::query_scalar(
            "SELECT refresh_token_hash FROM users WHERE event_id = ? AND username = ?",
        )
        .bind(event_id)
        .bind(username)
        .fetch_optional(self.pool())
        .await?;

        Ok(token.flatten())
    }

    /// Replace the current token only if it still equals `expected`.
    ///
    /// Returns `false` when the slot held anything else (including nothing),
    /// in which case the slot is left untouched.
    pub async fn replace_current_token(
        &self,
        event_id: i64,
        username: &str,
        expected: &str,
        token: &str,
    ) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token_hash = ? \
             WHERE event_id = ? AND username = ? AND refresh_token_hash = ?",
        )
        .bind(token)
        .bind(event_id)
        .bind(username)
        .bind(expected)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clear the user's current token.
    pub async fn clear_current_token(
        &self,
        event_id: i64,
        username: &str,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            "UPDATE users SET refresh_token_hash = NULL WHERE event_id = ? AND username = ?",
        )
        .bind(event_id)
        .bind(username)
        .execute(self.pool())
        .await?;

        Ok(())
    }
}
