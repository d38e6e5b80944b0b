//! Transaction handle for multi-row writes.

use sqlx::{QueryBuilder, Sqlite, Transaction};

use letsmeet_core::Interval;
use letsmeet_core::db::unix_timestamp;

use super::db::DatabaseError;

/// Rows per bulk insert statement; keeps bind counts well under `SQLite`'s
/// parameter limit.
const BULK_CHUNK: usize = 500;

/// An open transaction against the event store.
///
/// Exposes exactly the writes the registration protocol needs. Nothing is
/// visible to other connections until [`EventTx::commit`]; dropping the
/// handle rolls back.
pub struct EventTx {
    tx: Transaction<'static, Sqlite>,
}

impl EventTx {
    pub(super) const fn new(tx: Transaction<'static, Sqlite>) -> Self {
        Self { tx }
    }

    /// Resolve an event's internal id from its public identifier.
    pub async fn find_event_id(&mut self, public_id: &str) -> Result<Option<i64>, DatabaseError> {
        let id = sqlx::query_scalar("SELECT id FROM events WHERE public_id = ?")
            .bind(public_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(id)
    }

    /// Insert an event without a public identifier and return its id.
    pub async fn insert_event(
        &mut self,
        title: &str,
        description: &str,
    ) -> Result<i64, DatabaseError> {
        let id = sqlx::query_scalar(
            "INSERT INTO events (title, description, created_at) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(title)
        .bind(description)
        .bind(unix_timestamp())
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(id)
    }

    /// Assign the event's public identifier.
    ///
    /// Fails with [`DatabaseError::DuplicateKey`] when another event already
    /// holds `public_id`; the transaction stays usable.
    pub async fn set_public_id(
        &mut self,
        event_id: i64,
        public_id: &str,
    ) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE events SET public_id = ? WHERE id = ?")
            .bind(public_id)
            .bind(event_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    /// Insert a user and return the row id.
    ///
    /// Fails with [`DatabaseError::DuplicateKey`] when the username is taken
    /// within the event.
    pub async fn insert_user(
        &mut self,
        event_id: i64,
        username: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<i64, DatabaseError> {
        let id = sqlx::query_scalar(
            "INSERT INTO users (event_id, username, password_hash, is_admin, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(event_id)
        .bind(username)
        .bind(password_hash)
        .bind(is_admin)
        .bind(unix_timestamp())
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(id)
    }

    /// Set a user's current refresh token inside this transaction.
    pub async fn set_current_token(&mut self, user_id: i64, token: &str) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE users SET refresh_token_hash = ? WHERE id = ?")
            .bind(token)
            .bind(user_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    pub async fn find_user_id(
        &mut self,
        event_id: i64,
        username: &str,
    ) -> Result<Option<i64>, DatabaseError> {
        let id = sqlx::query_scalar("SELECT id FROM users WHERE event_id = ? AND username = ?")
            .bind(event_id)
            .bind(username)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(id)
    }

    /// Bulk insert an event's candidate intervals. No-op when empty.
    pub async fn insert_event_intervals(
        &mut self,
        event_id: i64,
        intervals: &[Interval],
    ) -> Result<(), DatabaseError> {
        self.bulk_insert("event_intervals", "event_id", event_id, intervals)
            .await
    }

    /// Bulk insert a user's availability. No-op when empty.
    pub async fn insert_user_intervals(
        &mut self,
        user_id: i64,
        intervals: &[Interval],
    ) -> Result<(), DatabaseError> {
        self.bulk_insert("user_intervals", "user_id", user_id, intervals)
            .await
    }

    pub async fn delete_event_intervals(&mut self, event_id: i64) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM event_intervals WHERE event_id = ?")
            .bind(event_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_user_intervals(&mut self, user_id: i64) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM user_intervals WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn bulk_insert(
        &mut self,
        table: &str,
        owner_column: &str,
        owner_id: i64,
        intervals: &[Interval],
    ) -> Result<(), DatabaseError> {
        for chunk in intervals.chunks(BULK_CHUNK) {
            let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
                "INSERT INTO {table} ({owner_column}, start_at, end_at) "
            ));
            builder.push_values(chunk, |mut row, interval| {
                row.push_bind(owner_id)
                    .push_bind(interval.start_secs())
                    .push_bind(interval.end_secs());
            });
            builder.build().execute(&mut *self.tx).await?;
        }
        Ok(())
    }

    pub async fn commit(self) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), DatabaseError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
