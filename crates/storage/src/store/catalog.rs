#![forbid(unsafe_code)]

use super::*;
use sl_core::ids::is_sequenced_name;
use sl_core::model::TableEntry;

pub const CATALOG_TABLE: &str = "table_metadata";
pub const SEQUENCE_TABLE: &str = "table_sequence";

impl ListStore {
    /// All registered tables, in registration order.
    pub fn list_tables(&self) -> Result<Vec<TableEntry>, StoreError> {
        self.read(list_tables_tx)
    }

    pub fn describe_table(&self, table: &str) -> Result<Option<TableEntry>, StoreError> {
        let table = parse_table_id(table)?;
        self.read(|tx| lookup_table_tx(tx, &table))
    }

    /// Number of physical tables named `<prefix>_<N>`.
    pub fn count_existing_tables(&self, prefix: &str) -> Result<i64, StoreError> {
        validate_prefix(prefix)?;
        self.read(|tx| count_existing_tables_tx(tx, prefix))
    }
}

fn validate_prefix(prefix: &str) -> Result<(), StoreError> {
    if prefix.is_empty()
        || !prefix
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
    {
        return Err(StoreError::InvalidInput("table prefix must match [a-z0-9_]+"));
    }
    Ok(())
}

pub(crate) fn list_tables_tx(tx: &Transaction<'_>) -> Result<Vec<TableEntry>, StoreError> {
    let mut stmt = tx.prepare("SELECT identifier, title FROM table_metadata ORDER BY rowid ASC")?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();

    while let Some(row) = rows.next()? {
        let identifier = row.get::<_, String>(0)?;
        out.push(TableEntry {
            identifier: TableId::parse(&identifier)?,
            title: row.get(1)?,
        });
    }

    Ok(out)
}

pub(crate) fn lookup_table_tx(
    tx: &Transaction<'_>,
    table: &TableId,
) -> Result<Option<TableEntry>, StoreError> {
    let title = tx
        .query_row(
            "SELECT title FROM table_metadata WHERE identifier=?1",
            params![table.as_str()],
            |row| row.get::<_, String>(0),
        )
        .optional()?;

    Ok(title.map(|title| TableEntry {
        identifier: table.clone(),
        title,
    }))
}

/// Fails with `UnknownTable` unless `table` is a live catalog entry.
pub(crate) fn ensure_registered_tx(tx: &Transaction<'_>, table: &TableId) -> Result<(), StoreError> {
    let registered = tx
        .query_row(
            "SELECT 1 FROM table_metadata WHERE identifier=?1",
            params![table.as_str()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some();

    if registered {
        Ok(())
    } else {
        Err(StoreError::UnknownTable(table.to_string()))
    }
}

pub(crate) fn count_existing_tables_tx(
    tx: &Transaction<'_>,
    prefix: &str,
) -> Result<i64, StoreError> {
    let mut stmt = tx.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name LIKE ?1 ESCAPE '\\'",
    )?;
    let pattern = format!("{}\\_%", prefix.replace('_', "\\_"));
    let mut rows = stmt.query(params![pattern])?;
    let mut count = 0i64;

    while let Some(row) = rows.next()? {
        let name = row.get::<_, String>(0)?;
        if is_sequenced_name(&name, prefix) {
            count += 1;
        }
    }

    Ok(count)
}

pub(crate) fn physical_table_exists_tx(
    tx: &Transaction<'_>,
    table: &TableId,
) -> Result<bool, StoreError> {
    Ok(tx
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1",
            params![table.as_str()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some())
}

pub(crate) fn register_table_tx(
    tx: &Transaction<'_>,
    table: &TableId,
    title: &str,
) -> Result<(), StoreError> {
    let insert = tx.execute(
        "INSERT INTO table_metadata(identifier, title) VALUES (?1, ?2)",
        params![table.as_str(), title],
    );

    match insert {
        Ok(_) => Ok(()),
        Err(err) if is_constraint_violation(&err) => {
            Err(StoreError::DuplicateIdentifier(table.to_string()))
        }
        Err(err) => Err(StoreError::Sql(err)),
    }
}

/// Idempotent. Returns whether a row was removed.
pub(crate) fn deregister_table_tx(tx: &Transaction<'_>, table: &TableId) -> Result<bool, StoreError> {
    let deleted = tx.execute(
        "DELETE FROM table_metadata WHERE identifier=?1",
        params![table.as_str()],
    )?;
    Ok(deleted > 0)
}

/// Highest sequence number ever issued for `prefix`, or 0.
pub(crate) fn sequence_high_water_tx(tx: &Transaction<'_>, prefix: &str) -> Result<i64, StoreError> {
    Ok(tx
        .query_row(
            "SELECT value FROM table_sequence WHERE prefix=?1",
            params![prefix],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .unwrap_or(0))
}

pub(crate) fn advance_sequence_tx(
    tx: &Transaction<'_>,
    prefix: &str,
    value: i64,
) -> Result<(), StoreError> {
    tx.execute(
        "INSERT INTO table_sequence(prefix, value) VALUES (?1, ?2) \
         ON CONFLICT(prefix) DO UPDATE SET value=MAX(table_sequence.value, excluded.value)",
        params![prefix, value],
    )?;
    Ok(())
}
