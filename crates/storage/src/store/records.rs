#![forbid(unsafe_code)]

use super::catalog::ensure_registered_tx;
use super::table_sql::TableSql;
use super::*;
use sl_core::model::Record;

pub const DEFAULT_LIST_OFFSET: usize = 0;
pub const DEFAULT_LIST_LIMIT: usize = 10;

fn parse_record_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        id: row.get(0)?,
        name: row.get(1)?,
        flag: row.get(2)?,
        note: row.get(3)?,
    })
}

fn resolve_page(offset: Option<usize>, limit: Option<usize>) -> Result<(i64, i64), StoreError> {
    let offset = offset.unwrap_or(DEFAULT_LIST_OFFSET);
    let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT);
    if limit == 0 {
        return Err(StoreError::InvalidInput("limit must be positive"));
    }
    Ok((to_sqlite_i64(offset)?, to_sqlite_i64(limit)?))
}

// Row-level misses come back as Ok(None). A table that is not in the catalog
// is UnknownTable, even if a physical table of that name happens to exist.
impl ListStore {
    pub fn create_record(&self, request: CreateRecordRequest) -> Result<Record, StoreError> {
        let table = parse_table_id(&request.table)?;
        tracing::debug!(%table, "create record");

        self.write(|tx| {
            ensure_registered_tx(tx, &table)?;
            let record = tx.query_row(
                &TableSql::new(&table).insert(),
                params![request.record.name, request.record.flag, request.record.note],
                parse_record_row,
            )?;
            Ok(record)
        })
    }

    /// Replaces every mutable field of row `id`.
    pub fn update_record(&self, request: UpdateRecordRequest) -> Result<Option<Record>, StoreError> {
        let table = parse_table_id(&request.table)?;
        tracing::debug!(%table, id = request.id, "update record");

        self.write(|tx| {
            ensure_registered_tx(tx, &table)?;
            let record = tx
                .query_row(
                    &TableSql::new(&table).update(),
                    params![
                        request.record.name,
                        request.record.flag,
                        request.record.note,
                        request.id
                    ],
                    parse_record_row,
                )
                .optional()?;
            Ok(record)
        })
    }

    /// Removes row `id` and returns its last values.
    pub fn delete_record(&self, request: RecordKeyRequest) -> Result<Option<Record>, StoreError> {
        let table = parse_table_id(&request.table)?;
        tracing::debug!(%table, id = request.id, "delete record");

        self.write(|tx| {
            ensure_registered_tx(tx, &table)?;
            let record = tx
                .query_row(
                    &TableSql::new(&table).delete(),
                    params![request.id],
                    parse_record_row,
                )
                .optional()?;
            Ok(record)
        })
    }

    pub fn get_record(&self, request: RecordKeyRequest) -> Result<Option<Record>, StoreError> {
        let table = parse_table_id(&request.table)?;

        self.read(|tx| {
            ensure_registered_tx(tx, &table)?;
            let record = tx
                .query_row(
                    &TableSql::new(&table).select_one(),
                    params![request.id],
                    parse_record_row,
                )
                .optional()?;
            Ok(record)
        })
    }

    /// One page of rows in ascending id order. Omitted bounds default to
    /// offset 0 and limit 10.
    pub fn list_records(&self, request: ListRecordsRequest) -> Result<Vec<Record>, StoreError> {
        let table = parse_table_id(&request.table)?;
        let (offset, limit) = resolve_page(request.offset, request.limit)?;
        tracing::debug!(%table, offset, limit, "list records");

        self.read(|tx| {
            ensure_registered_tx(tx, &table)?;
            let mut stmt = tx.prepare(&TableSql::new(&table).select_page())?;
            let rows = stmt.query_map(params![limit, offset], parse_record_row)?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
    }

    /// Every row, no ordering guarantee.
    pub fn list_all_records(&self, table: &str) -> Result<Vec<Record>, StoreError> {
        let table = parse_table_id(table)?;

        self.read(|tx| {
            ensure_registered_tx(tx, &table)?;
            let mut stmt = tx.prepare(&TableSql::new(&table).select_all())?;
            let rows = stmt.query_map([], parse_record_row)?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_bounds() {
        assert_eq!(resolve_page(None, None).unwrap(), (0, 10));
        assert_eq!(resolve_page(Some(20), Some(5)).unwrap(), (20, 5));
        assert_eq!(resolve_page(None, Some(5000)).unwrap(), (0, 5000));
        assert!(matches!(
            resolve_page(None, Some(0)),
            Err(StoreError::InvalidInput("limit must be positive"))
        ));
    }
}
