use crate::EventRow;
use crate::LogEvent;
use crate::LogId;
use crate::LogSourceMeta;
use crate::PersistOutcome;
use crate::StoredEvent;
use crate::format_timestamp;
use chrono::NaiveDateTime;
use log::LevelFilter;
use sqlx::ConnectOptions;
use sqlx::Row;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::sqlite::SqliteJournalMode;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::sqlite::SqliteSynchronous;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::sync::RwLock;
use tracing::debug;
use tracing::info;
use tracing::warn;

mod events;
mod schema;
mod sources;
#[cfg(test)]
mod test_support;

pub const STORE_DB_FILENAME: &str = "logsift.sqlite";

/// Handle to the relational store. Cheap to clone; every clone shares the
/// same pool and guards.
#[derive(Clone)]
pub struct LogStore {
    pool: Arc<SqlitePool>,
    /// Readers and writers hold this shared; a schema reset holds it
    /// exclusively so nobody observes a half-recreated schema.
    schema_guard: Arc<RwLock<()>>,
    /// Serializes writers so id assignment and batch inserts never contend
    /// for the SQLite write lock.
    write_lock: Arc<Mutex<()>>,
}

impl LogStore {
    /// Open (creating if needed) the store at `path` and make sure the schema
    /// exists.
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
        let pool = match open_sqlite(options, 5).await {
            Ok(pool) => pool,
            Err(err) => {
                warn!("failed to open log store at {}: {err}", path.display());
                return Err(err);
            }
        };
        let store = Self::from_pool(pool);
        store.create_schema().await?;
        info!("opened log store at {}", path.display());
        Ok(store)
    }

    /// Open a private in-memory store. The pool is pinned to one connection
    /// because every SQLite in-memory connection is its own database.
    pub async fn open_in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let store = Self::from_pool(open_sqlite(options, 1).await?);
        store.create_schema().await?;
        Ok(store)
    }

    fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool: Arc::new(pool),
            schema_guard: Arc::new(RwLock::new(())),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn open_sqlite(
    options: SqliteConnectOptions,
    max_connections: u32,
) -> anyhow::Result<SqlitePool> {
    let options = options
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5))
        .log_statements(LevelFilter::Off);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    Ok(pool)
}
