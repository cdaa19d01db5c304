//! Column values shared by rows, bound parameters and the evaluator

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single SQL value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value; text is parsed, unparsable text is 0 as in SQL
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Integer(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            Value::Text(s) => Some(s.trim().parse::<f64>().unwrap_or(0.0)),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Textual view used by string functions (`LIKE`, `REPLACE`, ...)
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// SQL truthiness: non-zero numbers are true, NULL is not
    pub fn is_truthy(&self) -> bool {
        self.as_f64().map(|n| n != 0.0).unwrap_or(false)
    }

    /// Booleans are integers in SQL
    pub fn from_bool(b: bool) -> Self {
        Value::Integer(b as i64)
    }

    /// Integral floats collapse to integers so sums stay exact
    pub fn from_f64(n: f64) -> Self {
        if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
            Value::Integer(n as i64)
        } else {
            Value::Real(n)
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}
