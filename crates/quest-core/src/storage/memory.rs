//! In-memory storage backend
//!
//! Evaluates select queries directly over stored rows. Useful for tests and
//! for checking relevance scores without a database.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::error::{QueryError, QueryResult};
use crate::query::{Direction, SelectQuery};
use crate::storage::eval::{sort_cmp, Evaluator};
use crate::storage::row::Row;
use crate::storage::traits::RowStore;
use crate::value::Value;

/// In-memory row store.
///
/// Tables are vectors of rows in insertion order.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: HashMap<String, Vec<Row>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    /// Create a memory store holding one table.
    pub fn with_rows(table: impl Into<String>, rows: Vec<Row>) -> Self {
        let mut store = Self::new();
        store.tables.insert(table.into(), rows);
        store
    }

    /// Create an empty table; existing tables are left untouched.
    pub fn create_table(&mut self, table: impl Into<String>) {
        self.tables.entry(table.into()).or_default();
    }

    /// Stored rows of a table (for testing).
    pub fn rows(&self, table: &str) -> Option<&[Row]> {
        self.tables.get(table).map(Vec::as_slice)
    }
}

impl RowStore for MemoryStore {
    fn insert(&mut self, table: &str, row: Row) -> QueryResult<()> {
        self.tables.entry(table.to_string()).or_default().push(row);
        Ok(())
    }

    fn fetch(&self, query: &SelectQuery) -> QueryResult<Vec<Row>> {
        let rows = self
            .tables
            .get(query.table())
            .ok_or_else(|| QueryError::UnknownTable(query.table().to_string()))?;
        let condition = query.condition();

        let mut matched: Vec<(Row, Vec<Value>)> = Vec::new();
        for row in rows {
            let evaluator = Evaluator::new(query.table(), row);
            if !evaluator.evaluate(&condition)?.is_truthy() {
                continue;
            }

            let mut output = row.clone();
            for (expr, alias) in query.projections() {
                output.set(alias.as_str(), evaluator.evaluate(expr)?);
            }
            let keys = query
                .orders()
                .iter()
                .map(|(expr, _)| evaluator.evaluate(expr))
                .collect::<QueryResult<Vec<_>>>()?;
            matched.push((output, keys));
        }

        // Stable sort keeps insertion order between ties
        matched.sort_by(|(_, a), (_, b)| {
            query
                .orders()
                .iter()
                .zip(a.iter().zip(b.iter()))
                .map(|((_, direction), (x, y))| match direction {
                    Direction::Asc => sort_cmp(x, y),
                    Direction::Desc => sort_cmp(y, x),
                })
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        let result: Vec<Row> = matched
            .into_iter()
            .map(|(row, _)| row)
            .skip(query.offset().unwrap_or(0))
            .take(query.limit().unwrap_or(usize::MAX))
            .collect();

        debug!(
            table = %query.table(),
            scanned = rows.len(),
            returned = result.len(),
            "memory fetch"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::Boolean;
    use crate::expr::Expr;
    use crate::query::ClauseSink;
    use pretty_assertions::assert_eq;

    fn store() -> MemoryStore {
        MemoryStore::with_rows(
            "people",
            vec![
                Row::new().with("name", "b").with("age", 30i64),
                Row::new().with("name", "a").with("age", 30i64),
                Row::new().with("name", "c").with("age", 20i64),
            ],
        )
    }

    fn names(rows: &[Row]) -> Vec<&str> {
        rows.iter().filter_map(|r| r.text("name")).collect()
    }

    #[test]
    fn test_unknown_table() {
        let err = store().fetch(&SelectQuery::new("missing")).unwrap_err();
        assert!(matches!(err, QueryError::UnknownTable(t) if t == "missing"));
    }

    #[test]
    fn test_insert_creates_table() {
        let mut store = MemoryStore::new();
        store.insert("t", Row::new().with("x", 1i64)).unwrap();
        assert_eq!(store.rows("t").map(|r| r.len()), Some(1));
        store.create_table("t");
        assert_eq!(store.rows("t").map(|r| r.len()), Some(1));
    }

    #[test]
    fn test_sort_is_stable_within_ties() {
        let mut query = SelectQuery::new("people");
        query.push_order(Expr::column("age"), Direction::Desc);
        let rows = store().fetch(&query).unwrap();
        assert_eq!(names(&rows), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_secondary_order() {
        let mut query = SelectQuery::new("people");
        query.push_order(Expr::column("age"), Direction::Desc);
        query.push_order(Expr::column("name"), Direction::Asc);
        let rows = store().fetch(&query).unwrap();
        assert_eq!(names(&rows), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_where_projection_and_paging() {
        let mut query = SelectQuery::new("people");
        query.push_where(Boolean::And, Expr::column("age").ge(Expr::number(25.0)));
        query.push_projection(
            Expr::column("age").mul(Expr::number(2.0)),
            "double_age".to_string(),
        );
        query.set_offset(Some(1));
        query.set_limit(Some(5));

        let rows = store().fetch(&query).unwrap();
        assert_eq!(names(&rows), vec!["a"]);
        assert_eq!(rows[0].get("double_age"), Some(&Value::Integer(60)));
    }

    #[test]
    fn test_unknown_column_fails_the_query() {
        let mut query = SelectQuery::new("people");
        query.push_where(Boolean::And, Expr::column("email").equals(Expr::text("x")));
        assert!(matches!(
            store().fetch(&query),
            Err(QueryError::UnknownColumn(_))
        ));
    }
}
