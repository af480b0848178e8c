#![forbid(unsafe_code)]

use super::catalog::{
    advance_sequence_tx, count_existing_tables_tx, deregister_table_tx, physical_table_exists_tx,
    register_table_tx, sequence_high_water_tx,
};
use super::table_sql::TableSql;
use super::*;
use sl_core::ids::TABLE_PREFIX;
use sl_core::model::TableEntry;

/// Collisions tolerated by one `create_table` call before giving up.
pub const MAX_PROVISION_ATTEMPTS: usize = 8;

impl ListStore {
    /// Creates the physical table and its catalog entry as one transaction.
    ///
    /// The sequence number is the larger of the live table count plus one and
    /// the persisted high-water mark plus one, so numbers of dropped tables are
    /// never handed out again. If the chosen name is already taken, either by a
    /// stray physical table or by a stale catalog row, the attempt rolls back
    /// and the next number is tried.
    pub fn create_table(&self, request: CreateTableRequest) -> Result<TableEntry, StoreError> {
        let title = request.title;
        let mut candidate: Option<TableId> = None;
        let mut last_tried = String::new();

        for attempt in 1..=MAX_PROVISION_ATTEMPTS {
            let outcome = self.write(|tx| {
                let floor = next_sequence_tx(tx)?;
                let table = match candidate.take() {
                    Some(table) if table.sequence() >= floor => table,
                    _ => TableId::derive(floor)?,
                };
                provision_tx(tx, &table, &title)
            });

            match outcome {
                Ok(entry) => {
                    tracing::info!(table = %entry.identifier, attempt, "provisioned table");
                    return Ok(entry);
                }
                Err(StoreError::DuplicateIdentifier(taken)) => {
                    tracing::warn!(table = %taken, attempt, "table name taken; retrying with next number");
                    candidate = Some(TableId::parse(&taken)?.successor()?);
                    last_tried = taken;
                }
                Err(err) => return Err(err),
            }
        }

        Err(StoreError::ProvisionExhausted {
            attempts: MAX_PROVISION_ATTEMPTS,
            last: last_tried,
        })
    }

    /// Drops the physical table and its catalog entry together.
    ///
    /// Returns `false` when there was nothing to drop or the database refused;
    /// the latter is logged rather than raised. An identifier that fails
    /// validation is still an error.
    pub fn drop_table(&self, table: &str) -> Result<bool, StoreError> {
        let table = parse_table_id(table)?;

        let outcome = self.write(|tx| {
            let existed = physical_table_exists_tx(tx, &table)?;
            tx.execute(&TableSql::new(&table).drop_if_exists(), [])?;
            let deregistered = deregister_table_tx(tx, &table)?;
            Ok(existed || deregistered)
        });

        match outcome {
            Ok(true) => {
                tracing::info!(%table, "dropped table");
                Ok(true)
            }
            Ok(false) => {
                tracing::debug!(%table, "nothing to drop");
                Ok(false)
            }
            Err(err) => {
                tracing::warn!(%table, error = %err, code = err.code(), "drop failed");
                Ok(false)
            }
        }
    }
}

fn next_sequence_tx(tx: &Transaction<'_>) -> Result<i64, StoreError> {
    let live = count_existing_tables_tx(tx, TABLE_PREFIX)?;
    let issued = sequence_high_water_tx(tx, TABLE_PREFIX)?;
    live.max(issued)
        .checked_add(1)
        .ok_or(StoreError::InvalidInput("table sequence exhausted"))
}

fn provision_tx(
    tx: &Transaction<'_>,
    table: &TableId,
    title: &str,
) -> Result<TableEntry, StoreError> {
    if physical_table_exists_tx(tx, table)? {
        return Err(StoreError::DuplicateIdentifier(table.to_string()));
    }

    tx.execute_batch(&TableSql::new(table).create())?;
    register_table_tx(tx, table, title)?;
    advance_sequence_tx(tx, TABLE_PREFIX, table.sequence())?;

    Ok(TableEntry {
        identifier: table.clone(),
        title: title.to_string(),
    })
}
