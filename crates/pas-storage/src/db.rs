//! Database connection management.
//!
//! Wraps a single rusqlite Connection in a Mutex for thread-safe access.
//! Configures WAL mode and recommended PRAGMAs on initialization.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use pas_core::error::PasError;

use crate::migrations;

/// Thread-safe SQLite database wrapper holding the key-value table.
pub struct Database {
    conn: Mutex<Connection>,
    quota_bytes: Option<u64>,
}

impl Database {
    /// Open (or create) a database at the given path.
    ///
    /// Configures WAL mode and synchronous=NORMAL, then runs all pending
    /// migrations.
    pub fn new(path: &Path) -> Result<Self, PasError> {
        // Ensure parent directory exists.
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| PasError::Storage(format!("Failed to open database: {}", e)))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|e| PasError::Storage(format!("Failed to set pragmas: {}", e)))?;

        info!("Database opened at {}", path.display());

        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing and ephemeral runs).
    pub fn in_memory() -> Result<Self, PasError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| PasError::Storage(format!("Failed to open in-memory db: {}", e)))?;

        conn.execute_batch("PRAGMA synchronous = NORMAL;")
            .map_err(|e| PasError::Storage(format!("Failed to set pragmas: {}", e)))?;

        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, PasError> {
        let db = Self {
            conn: Mutex::new(conn),
            quota_bytes: None,
        };

        db.with_conn(migrations::run_migrations)?;

        Ok(db)
    }

    /// Reject writes that would grow the stored key+value bytes past `quota`.
    pub fn with_quota(mut self, quota: Option<u64>) -> Self {
        self.quota_bytes = quota;
        self
    }

    pub fn quota(&self) -> Option<u64> {
        self.quota_bytes
    }

    /// Execute a closure with a reference to the underlying connection.
    ///
    /// The mutex is held for the duration of the closure.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, PasError>
    where
        F: FnOnce(&Connection) -> Result<T, PasError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| PasError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("quota_bytes", &self.quota_bytes)
            .finish()
    }
}
