//! SQLite-backed row store implementing the RowStore trait

use quest_core::storage::{Row, RowStore};
use quest_core::{ClauseSink, Dialect, Direction, Expr, QueryResult, SelectQuery};
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use crate::convert::{from_sql, to_sql};
use crate::error::{Result, SqliteError};
use crate::functions;

/// SQLite-backed row store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SQLite store from a connection
    ///
    /// Registers Unicode-aware `lower`, `upper`, `like` and `NOCASE` on the
    /// connection so case-insensitive matching agrees with the memory store.
    pub fn new(conn: Connection) -> Result<Self> {
        functions::register(&conn)?;
        Ok(Self { conn })
    }

    /// Create a new in-memory SQLite store (for testing)
    pub fn in_memory() -> Result<Self> {
        Self::new(Connection::open_in_memory()?)
    }

    /// Create a new file-backed SQLite store
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Self::new(Connection::open(path)?)
    }

    /// Get a reference to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run raw SQL statements (schema setup, fixtures)
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Create a table with untyped columns unless it already exists
    pub fn create_table(&self, table: &str, columns: &[&str]) -> Result<()> {
        if columns.is_empty() {
            return Err(SqliteError::Schema(format!(
                "table {} needs at least one column",
                table
            )));
        }
        let columns: Vec<String> = columns
            .iter()
            .map(|c| Dialect::Sqlite.quote_identifier(c))
            .collect();
        self.conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} ({})",
                Dialect::Sqlite.quote_identifier(table),
                columns.join(", ")
            ),
            [],
        )?;
        Ok(())
    }

    fn insert_row(&self, table: &str, row: &Row) -> Result<()> {
        let columns: Vec<&str> = row.columns().map(|(name, _)| name).collect();
        self.create_table(table, &columns)?;

        let quoted: Vec<String> = columns
            .iter()
            .map(|c| Dialect::Sqlite.quote_identifier(c))
            .collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            Dialect::Sqlite.quote_identifier(table),
            quoted.join(", "),
            placeholders
        );
        self.conn.execute(
            &sql,
            params_from_iter(row.columns().map(|(_, value)| to_sql(value))),
        )?;
        Ok(())
    }

    fn fetch_rows(&self, query: &SelectQuery) -> Result<Vec<Row>> {
        // rowid breaks ties so equal scores keep insertion order
        let mut query = query.clone();
        query.push_order(Expr::column("rowid"), Direction::Asc);

        let rendered = query.to_sql(Dialect::Sqlite);
        debug!(sql = %rendered.sql, params = rendered.params.len(), "sqlite fetch");

        let mut stmt = self.conn.prepare(&rendered.sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query(params_from_iter(rendered.params.iter().map(to_sql)))?;
        let mut out = Vec::new();
        while let Some(sql_row) = rows.next()? {
            let mut row = Row::new();
            for (i, name) in names.iter().enumerate() {
                row.set(name.as_str(), from_sql(name, sql_row.get_ref(i)?)?);
            }
            out.push(row);
        }
        Ok(out)
    }
}

impl RowStore for SqliteStore {
    fn insert(&mut self, table: &str, row: Row) -> QueryResult<()> {
        if row.is_empty() {
            return Err(SqliteError::Schema(format!("empty row for table {}", table)).into());
        }
        Ok(self.insert_row(table, &row)?)
    }

    fn fetch(&self, query: &SelectQuery) -> QueryResult<Vec<Row>> {
        Ok(self.fetch_rows(query)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quest_core::{QueryError, Value};

    #[test]
    fn test_insert_creates_table() {
        let mut store = SqliteStore::in_memory().unwrap();
        store
            .insert("users", Row::new().with("name", "Fred").with("age", 40i64))
            .unwrap();

        let rows = store.fetch(&SelectQuery::new("users")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("age"), Some(&Value::Integer(40)));
    }

    #[test]
    fn test_empty_row_is_rejected() {
        let mut store = SqliteStore::in_memory().unwrap();
        assert!(matches!(
            store.insert("users", Row::new()),
            Err(QueryError::Backend(_))
        ));
    }

    #[test]
    fn test_unknown_table() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(matches!(
            store.fetch(&SelectQuery::new("missing")),
            Err(QueryError::UnknownTable(_))
        ));
    }

    #[test]
    fn test_new_registers_unicode_folding() {
        let store = SqliteStore::new(rusqlite::Connection::open_in_memory().unwrap()).unwrap();
        let folded: String = store
            .connection()
            .query_row("SELECT lower('ÖDÖN')", [], |row| row.get(0))
            .unwrap();
        assert_eq!(folded, "ödön");
    }

    #[test]
    fn test_execute_batch_fixture() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .execute_batch(
                "CREATE TABLE t (name TEXT);
                 INSERT INTO t VALUES ('a'), ('b');",
            )
            .unwrap();
        assert_eq!(store.count(&SelectQuery::new("t")).unwrap(), 2);
    }
}
