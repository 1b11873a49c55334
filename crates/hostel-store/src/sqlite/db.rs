//! Local sqlite database.

use std::path::Path;

use hostel_core::db::{DatabaseError, SqliteLocation, connect};
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::feed::ChangeFeed;

/// The local backend: a sqlite pool plus the feed its writes go to.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
    feed: ChangeFeed,
}

impl Database {
    /// Open or create a database at the given path.
    pub async fn open(path: &Path) -> Result<Self, DatabaseError> {
        let pool = connect(&SqliteLocation::File(path.to_path_buf())).await?;
        Self::init(pool).await
    }

    /// Open an in-memory database (for testing).
    pub async fn open_in_memory() -> Result<Self, DatabaseError> {
        let pool = connect(&SqliteLocation::Memory).await?;
        Self::init(pool).await
    }

    async fn init(pool: Pool<Sqlite>) -> Result<Self, DatabaseError> {
        let db = Self {
            pool,
            feed: ChangeFeed::default(),
        };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Publish writes on an existing feed instead of a private one.
    #[must_use]
    pub fn with_feed(mut self, feed: ChangeFeed) -> Self {
        self.feed = feed;
        self
    }

    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;

        info!("Hostel database migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub const fn feed(&self) -> &ChangeFeed {
        &self.feed
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
