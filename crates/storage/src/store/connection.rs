#![forbid(unsafe_code)]

//! Connection acquisition.
//!
//! The store never holds a long-lived handle. Every operation asks its
//! [`ConnectionFactory`] for a fresh connection, runs one transaction on it,
//! and drops both on the way out.

use super::StoreError;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DB_FILE: &str = "shoplist.db";
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Filesystem path or SQLite `file:` URI.
    pub connection_string: String,
    pub busy_timeout: Duration,
}

impl StoreConfig {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Database file `shoplist.db` inside `storage_dir`.
    pub fn in_dir(storage_dir: impl AsRef<Path>) -> Self {
        let path = storage_dir.as_ref().join(DEFAULT_DB_FILE);
        Self::new(path.to_string_lossy().into_owned())
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    fn is_uri(&self) -> bool {
        self.connection_string.starts_with("file:")
    }

    fn is_memory(&self) -> bool {
        self.connection_string == ":memory:"
            || self.connection_string.is_empty()
            || self.connection_string.contains("mode=memory")
    }

    fn parent_dir(&self) -> Option<PathBuf> {
        if self.is_uri() {
            return None;
        }
        Path::new(&self.connection_string)
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }
}

/// Source of database connections. Implementations must hand out an
/// independent connection per call.
pub trait ConnectionFactory: Send + Sync {
    fn connect(&self) -> Result<Connection, StoreError>;
}

#[derive(Clone, Debug)]
pub struct SqliteConnectionFactory {
    config: StoreConfig,
}

impl SqliteConnectionFactory {
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        if config.connection_string.trim().is_empty() {
            return Err(StoreError::InvalidInput("connection string must not be empty"));
        }
        // Each operation opens and closes its own connection, so an in-memory
        // database would vanish between calls.
        if config.is_memory() {
            return Err(StoreError::InvalidInput(
                "in-memory databases are not supported",
            ));
        }
        if let Some(parent) = config.parent_dir() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

impl ConnectionFactory for SqliteConnectionFactory {
    fn connect(&self) -> Result<Connection, StoreError> {
        let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if self.config.is_uri() {
            flags |= OpenFlags::SQLITE_OPEN_URI;
        }

        let conn = Connection::open_with_flags(&self.config.connection_string, flags)?;
        conn.busy_timeout(self.config.busy_timeout)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        // journal_mode returns a row, so it cannot go through execute_batch.
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get::<_, String>(0))?;
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_dir_points_at_the_default_file() {
        let config = StoreConfig::in_dir("/var/lib/shoplist");
        assert!(config.connection_string.ends_with(DEFAULT_DB_FILE));
        assert_eq!(config.busy_timeout, DEFAULT_BUSY_TIMEOUT);
        assert_eq!(
            config.parent_dir(),
            Some(PathBuf::from("/var/lib/shoplist"))
        );
    }

    #[test]
    fn in_memory_and_empty_targets_are_rejected() {
        for target in ["", "  ", ":memory:", "file:lists?mode=memory&cache=shared"] {
            let err = SqliteConnectionFactory::new(StoreConfig::new(target))
                .expect_err("target must be rejected");
            assert!(matches!(err, StoreError::InvalidInput(_)), "{target:?}");
        }
    }

    #[test]
    fn uri_targets_skip_directory_creation() {
        let config = StoreConfig::new("file:/tmp/shoplist-uri.db?mode=rwc");
        assert_eq!(config.parent_dir(), None);
    }
}
