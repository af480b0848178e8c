#![forbid(unsafe_code)]

//! The only place that writes a dynamic table name into SQL text.
//!
//! Every statement is built from a [`TableId`], which can only exist after
//! passing the identifier allow-list. Values are always bound as `?N`
//! parameters; nothing else is interpolated.

use sl_core::ids::TableId;

const RECORD_COLUMNS: &str = "id, name, flag, note";

pub(crate) struct TableSql<'a> {
    table: &'a TableId,
}

impl<'a> TableSql<'a> {
    pub(crate) fn new(table: &'a TableId) -> Self {
        Self { table }
    }

    fn quoted(&self) -> String {
        // The allow-list excludes '"', so quoting cannot be escaped.
        format!("\"{}\"", self.table.as_str())
    }

    pub(crate) fn create(&self) -> String {
        format!(
            "CREATE TABLE {} ( \
               id INTEGER PRIMARY KEY AUTOINCREMENT, \
               name TEXT NOT NULL, \
               flag BOOLEAN NOT NULL CHECK(flag IN (0, 1)), \
               note TEXT \
             )",
            self.quoted()
        )
    }

    pub(crate) fn drop_if_exists(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.quoted())
    }

    pub(crate) fn insert(&self) -> String {
        format!(
            "INSERT INTO {}(name, flag, note) VALUES (?1, ?2, ?3) RETURNING {RECORD_COLUMNS}",
            self.quoted()
        )
    }

    pub(crate) fn update(&self) -> String {
        format!(
            "UPDATE {} SET name=?1, flag=?2, note=?3 WHERE id=?4 RETURNING {RECORD_COLUMNS}",
            self.quoted()
        )
    }

    pub(crate) fn delete(&self) -> String {
        format!(
            "DELETE FROM {} WHERE id=?1 RETURNING {RECORD_COLUMNS}",
            self.quoted()
        )
    }

    pub(crate) fn select_one(&self) -> String {
        format!(
            "SELECT {RECORD_COLUMNS} FROM {} WHERE id=?1",
            self.quoted()
        )
    }

    pub(crate) fn select_page(&self) -> String {
        format!(
            "SELECT {RECORD_COLUMNS} FROM {} ORDER BY id ASC LIMIT ?1 OFFSET ?2",
            self.quoted()
        )
    }

    pub(crate) fn select_all(&self) -> String {
        format!("SELECT {RECORD_COLUMNS} FROM {}", self.quoted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statements_only_splice_the_quoted_identifier() {
        let table = TableId::derive(3).unwrap();
        let sql = TableSql::new(&table);

        for statement in [
            sql.create(),
            sql.drop_if_exists(),
            sql.insert(),
            sql.update(),
            sql.delete(),
            sql.select_one(),
            sql.select_page(),
            sql.select_all(),
        ] {
            assert!(statement.contains("\"products_3\""), "{statement}");
            assert_eq!(statement.matches("products_3").count(), 1, "{statement}");
        }
    }

    #[test]
    fn page_query_orders_by_id_and_binds_bounds() {
        let table = TableId::derive(1).unwrap();
        let page = TableSql::new(&table).select_page();
        assert!(page.ends_with("ORDER BY id ASC LIMIT ?1 OFFSET ?2"));
    }
}
