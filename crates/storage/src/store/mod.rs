#![forbid(unsafe_code)]

mod catalog;
mod connection;
mod error;
mod provision;
mod records;
mod requests;
mod table_sql;

pub use catalog::{CATALOG_TABLE, SEQUENCE_TABLE};
pub use connection::{
    ConnectionFactory, DEFAULT_BUSY_TIMEOUT, DEFAULT_DB_FILE, SqliteConnectionFactory,
    StoreConfig,
};
pub use error::StoreError;
pub use provision::MAX_PROVISION_ATTEMPTS;
pub use records::{DEFAULT_LIST_LIMIT, DEFAULT_LIST_OFFSET};
pub use requests::*;

use rusqlite::{ErrorCode, OptionalExtension, Transaction, TransactionBehavior, params};
use sl_core::ids::TableId;
use std::fmt;
use std::sync::Arc;

const SCHEMA_VERSION: &str = "1";

/// Entry point for every catalog, provisioning and record operation.
///
/// The store holds no connection of its own. Each call acquires one from the
/// factory, wraps its work in a single transaction and releases the
/// connection on return, so a `ListStore` can be cloned and shared across
/// threads freely.
#[derive(Clone)]
pub struct ListStore {
    factory: Arc<dyn ConnectionFactory>,
}

impl fmt::Debug for ListStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListStore").finish_non_exhaustive()
    }
}

impl ListStore {
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        Self::with_factory(SqliteConnectionFactory::new(config)?)
    }

    pub fn with_factory(factory: impl ConnectionFactory + 'static) -> Result<Self, StoreError> {
        let store = Self {
            factory: Arc::new(factory),
        };
        store.write(install_schema_tx)?;
        Ok(store)
    }

    /// Runs `body` in an immediate (write-locking) transaction. The
    /// transaction commits only when `body` succeeds; dropping it on the error
    /// path rolls back.
    fn write<T>(
        &self,
        body: impl FnOnce(&Transaction<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut conn = self.factory.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = body(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    fn read<T>(
        &self,
        body: impl FnOnce(&Transaction<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut conn = self.factory.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
        let value = body(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}

fn install_schema_tx(tx: &Transaction<'_>) -> Result<(), StoreError> {
    tx.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS store_meta (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS table_metadata (
          identifier TEXT PRIMARY KEY,
          title TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS table_sequence (
          prefix TEXT PRIMARY KEY,
          value INTEGER NOT NULL CHECK(value >= 0)
        );
        "#,
    )?;

    let version = tx
        .query_row(
            "SELECT value FROM store_meta WHERE key='schema_version'",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()?;

    match version {
        Some(version) if version == SCHEMA_VERSION => Ok(()),
        Some(_) => Err(StoreError::InvalidInput(
            "RESET_REQUIRED: schema version mismatch",
        )),
        None => {
            tx.execute(
                "INSERT INTO store_meta(key, value) VALUES ('schema_version', ?1)",
                params![SCHEMA_VERSION],
            )?;
            Ok(())
        }
    }
}

/// Validates a caller-supplied identifier. Nothing reaches SQL construction
/// without passing through here or [`TableId::derive`].
fn parse_table_id(raw: &str) -> Result<TableId, StoreError> {
    TableId::parse(raw).map_err(|err| {
        tracing::warn!(table = ?raw, reason = err.message(), "rejected table identifier");
        StoreError::InvalidIdentifier(err)
    })
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            code.code == ErrorCode::ConstraintViolation
                || message.as_deref().is_some_and(|value| {
                    value.contains("UNIQUE constraint failed")
                        || value.contains("PRIMARY KEY constraint failed")
                })
        }
        _ => false,
    }
}

fn to_sqlite_i64(value: usize) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::InvalidInput("numeric overflow"))
}
