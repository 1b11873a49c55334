//! Sqlite pool setup for the local backend.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::info;

const FILE_POOL_SIZE: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from the local sqlite backend.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Cannot prepare database directory: {0}")]
    Io(String),

    #[error("Cannot open database: {0}")]
    Connection(String),

    #[error("Schema migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => Self::NotFound("row".to_string()),
            other => Self::Query(other.to_string()),
        }
    }
}

/// Where the hostel database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteLocation {
    File(PathBuf),
    /// Private to one connection; gone when the pool closes.
    Memory,
}

impl SqliteLocation {
    fn connect_options(&self) -> SqliteConnectOptions {
        let options = match self {
            Self::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(BUSY_TIMEOUT),
            Self::Memory => SqliteConnectOptions::new().in_memory(true),
        };
        options.foreign_keys(true)
    }

    // Every in-memory connection would see its own empty database.
    const fn pool_size(&self) -> u32 {
        match self {
            Self::File(_) => FILE_POOL_SIZE,
            Self::Memory => 1,
        }
    }
}

/// Open a pool at `location`, creating the file and its directory if needed.
pub async fn connect(location: &SqliteLocation) -> Result<Pool<Sqlite>, DatabaseError> {
    if let SqliteLocation::File(path) = location {
        ensure_parent(path)?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(location.pool_size())
        .connect_with(location.connect_options())
        .await
        .map_err(|e| DatabaseError::Connection(e.to_string()))?;

    match location {
        SqliteLocation::File(path) => info!(path = %path.display(), "Hostel database opened"),
        SqliteLocation::Memory => info!("In-memory hostel database opened"),
    }
    Ok(pool)
}

fn ensure_parent(path: &Path) -> Result<(), DatabaseError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(|e| DatabaseError::Io(e.to_string()))
        }
        _ => Ok(()),
    }
}
