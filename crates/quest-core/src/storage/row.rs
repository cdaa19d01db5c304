//! Result and input rows

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::config::DEFAULT_RELEVANCE_ALIAS;
use crate::value::Value;

/// Ordered column/value pairs
///
/// # Example
///
/// ```rust
/// use quest_core::storage::Row;
/// use quest_core::Value;
///
/// let row = Row::new().with("name", "Jane Doe").with("age", 41i64);
/// assert_eq!(row.get("name"), Some(&Value::from("Jane Doe")));
/// assert_eq!(row.get("users.age"), Some(&Value::Integer(41)));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Row::set`]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Set a column, replacing an existing value in place
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.columns.push((column, value)),
        }
    }

    /// Value of a column; a qualified name (`users.name`) falls back to its last segment
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.lookup(column).or_else(|| {
            column
                .rsplit_once('.')
                .and_then(|(_, bare)| self.lookup(bare))
        })
    }

    fn lookup(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_f64)
    }

    /// Aggregate relevance under the default alias
    ///
    /// Queries configured with a custom `relevance_alias` project the score
    /// under that name instead; read it with [`Row::relevance_as`].
    pub fn relevance(&self) -> Option<f64> {
        self.relevance_as(DEFAULT_RELEVANCE_ALIAS)
    }

    pub fn relevance_as(&self, alias: &str) -> Option<f64> {
        self.number(alias)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.set(column, value);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_replaces_in_place() {
        let mut row = Row::new().with("a", 1i64).with("b", 2i64);
        row.set("a", 3i64);
        let names: Vec<&str> = row.columns().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(row.get("a"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_relevance() {
        let row = Row::new().with(DEFAULT_RELEVANCE_ALIAS, 53.0);
        assert_eq!(row.relevance(), Some(53.0));
        assert_eq!(Row::new().relevance(), None);
    }

    #[test]
    fn test_relevance_under_custom_alias() {
        let row = Row::new().with("score", 17.0);
        assert_eq!(row.relevance(), None);
        assert_eq!(row.relevance_as("score"), Some(17.0));
    }

    #[test]
    fn test_serializes_as_object() {
        let row: Row = vec![("name", Value::from("Fred")), ("age", Value::Null)]
            .into_iter()
            .collect();
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"name":"Fred","age":null}"#
        );
    }
}
