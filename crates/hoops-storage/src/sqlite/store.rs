//! [`SqliteStore`] -- SQLite-backed storage implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::error::{Result, StorageError};
use crate::sqlite::schema;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed implementation of the [`Storage`](crate::traits::Storage) trait.
///
/// Wraps a [`rusqlite::Connection`] in a `Mutex`. Every public method acquires
/// the lock, so at most one transaction is in flight per store; concurrent
/// processes are serialized by SQLite's write lock.
pub struct SqliteStore {
    pub(crate) conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens or creates the database file and brings its schema up to date.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "opening database");

        let conn = Connection::open(path).map_err(|e| {
            StorageError::Connection(format!("failed to open {}: {e}", path.display()))
        })?;
        Self::from_connection(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("failed to open in-memory db: {e}")))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.configure_connection()?;
        store.init_schema()?;
        Ok(store)
    }

    fn configure_connection(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .and_then(|_| conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(())))
            .and_then(|_| conn.pragma_update(None, "foreign_keys", true))
            .map_err(|e| StorageError::Connection(format!("failed to configure connection: {e}")))
    }

    /// Brings the schema up to [`schema::CURRENT_SCHEMA_VERSION`].
    ///
    /// The version lives in `PRAGMA user_version`, so a current database is
    /// left untouched. DDL, seed metadata, and the version bump commit together.
    pub(crate) fn init_schema(&self) -> Result<()> {
        let mut conn = self.lock_conn()?;

        let version = user_version(&conn)?;
        if version >= schema::CURRENT_SCHEMA_VERSION {
            debug!(version, "schema is current");
            return Ok(());
        }

        let migration = |step: &str| {
            let step = step.to_string();
            move |e: rusqlite::Error| StorageError::Migration {
                name: step,
                reason: e.to_string(),
            }
        };

        let tx = conn.transaction().map_err(migration("begin"))?;
        for stmt in schema::SCHEMA_STATEMENTS {
            tx.execute_batch(stmt).map_err(|e| StorageError::Migration {
                name: format!("v{}", schema::CURRENT_SCHEMA_VERSION),
                reason: format!("{e}\nStatement: {}", truncate(stmt.trim(), 120)),
            })?;
        }
        for &(key, value) in schema::DEFAULT_METADATA {
            tx.execute(
                "INSERT OR IGNORE INTO metadata (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(migration("seed metadata"))?;
        }
        tx.pragma_update(None, "user_version", schema::CURRENT_SCHEMA_VERSION)
            .map_err(migration("user_version"))?;
        tx.commit().map_err(migration("commit"))?;

        info!(
            from = version,
            to = schema::CURRENT_SCHEMA_VERSION,
            "schema upgraded"
        );
        Ok(())
    }

    /// Acquires the connection lock. Helper used by all operation modules.
    pub(crate) fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Connection(format!("mutex poisoned: {e}")))
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

fn user_version(conn: &Connection) -> Result<i32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Truncates a string for error messages.
fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
