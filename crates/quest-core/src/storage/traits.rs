//! Storage trait definitions

use crate::error::QueryResult;
use crate::query::SelectQuery;
use crate::storage::row::Row;

/// A table store that can run select queries.
///
/// Rows come back with every stored column plus the query's projections,
/// in the query's order. Rows that compare equal on every order key keep
/// their insertion order.
pub trait RowStore {
    /// Append a row to `table`, creating the table if needed.
    fn insert(&mut self, table: &str, row: Row) -> QueryResult<()>;

    /// Execute a select query.
    fn fetch(&self, query: &SelectQuery) -> QueryResult<Vec<Row>>;

    /// Number of rows the query returns.
    fn count(&self, query: &SelectQuery) -> QueryResult<usize> {
        Ok(self.fetch(query)?.len())
    }
}
