//! `SQLite` database for `LetsMeet`.

use std::path::Path;

use sqlx::{Pool, Sqlite};
use tracing::info;

pub use letsmeet_core::db::DatabaseError;
use letsmeet_core::db::{open_pool, open_pool_in_memory};

use super::tx::EventTx;

/// Handle to the event store. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct EventDatabase {
    pool: Pool<Sqlite>,
}

impl EventDatabase {
    /// Open or create a database at the given path.
    pub async fn open(path: &Path) -> Result<Self, DatabaseError> {
        let pool = open_pool(path).await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub async fn open_in_memory() -> Result<Self, DatabaseError> {
        let pool = open_pool_in_memory().await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;

        info!("Event database migrations complete");
        Ok(())
    }

    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Start a write transaction. Dropping the handle without committing
    /// rolls every write back.
    ///
    /// The write lock is taken up front (`BEGIN IMMEDIATE`). A deferred
    /// transaction that reads first and writes later fails with `SQLITE_BUSY`
    /// once another connection has committed, before any constraint such as
    /// the username index gets a chance to report the real conflict.
    pub async fn begin(&self) -> Result<EventTx, DatabaseError> {
        Ok(EventTx::new(self.pool.begin_with("BEGIN IMMEDIATE").await?))
    }
}
