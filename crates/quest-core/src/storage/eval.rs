//! In-process evaluation of expression trees with SQL semantics
//!
//! NULL propagates through arithmetic, comparisons and string functions.
//! `AND`/`OR` use three-valued logic. Division by zero yields NULL, and
//! `ROUND` rounds half away from zero, as MySQL does.

use std::cmp::Ordering;

use crate::error::{QueryError, QueryResult};
use crate::expr::{CmpOp, Expr, Func};
use crate::storage::row::Row;
use crate::value::Value;

/// Evaluates expressions against one row of a table
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    table: &'a str,
    row: &'a Row,
}

impl<'a> Evaluator<'a> {
    pub fn new(table: &'a str, row: &'a Row) -> Self {
        Self { table, row }
    }

    pub fn evaluate(&self, expr: &Expr) -> QueryResult<Value> {
        match expr {
            Expr::Column(name) => self.column(name),
            Expr::Bound(value) => Ok(value.clone()),
            Expr::Number(n) => Ok(Value::from_f64(*n)),
            Expr::Bool(b) => Ok(Value::from_bool(*b)),
            Expr::Like {
                subject,
                pattern,
                case_sensitive,
            } => Ok(match self.evaluate(subject)?.to_text() {
                Some(text) => Value::from_bool(pattern.matches(&text, *case_sensitive)),
                None => Value::Null,
            }),
            Expr::Compare { op, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                Ok(compare(*op, &left, &right))
            }
            Expr::And(items) => {
                let mut unknown = false;
                for item in items {
                    let value = self.evaluate(item)?;
                    if value.is_null() {
                        unknown = true;
                    } else if !value.is_truthy() {
                        return Ok(Value::from_bool(false));
                    }
                }
                Ok(if unknown {
                    Value::Null
                } else {
                    Value::from_bool(true)
                })
            }
            Expr::Or(items) => {
                let mut unknown = false;
                for item in items {
                    let value = self.evaluate(item)?;
                    if value.is_null() {
                        unknown = true;
                    } else if value.is_truthy() {
                        return Ok(Value::from_bool(true));
                    }
                }
                Ok(if unknown {
                    Value::Null
                } else {
                    Value::from_bool(false)
                })
            }
            Expr::If {
                cond,
                then,
                otherwise,
            } => {
                if self.evaluate(cond)?.is_truthy() {
                    self.evaluate(then)
                } else {
                    self.evaluate(otherwise)
                }
            }
            Expr::Add(items) => {
                let mut total = Value::Integer(0);
                for item in items {
                    let value = self.evaluate(item)?;
                    total = arithmetic(&total, &value, i64::checked_add, |a, b| a + b);
                }
                Ok(total)
            }
            Expr::Sub(left, right) => Ok(arithmetic(
                &self.evaluate(left)?,
                &self.evaluate(right)?,
                i64::checked_sub,
                |a, b| a - b,
            )),
            Expr::Mul(left, right) => Ok(arithmetic(
                &self.evaluate(left)?,
                &self.evaluate(right)?,
                i64::checked_mul,
                |a, b| a * b,
            )),
            Expr::Div(left, right) => {
                let left = self.evaluate(left)?.as_f64();
                let right = self.evaluate(right)?.as_f64();
                Ok(match (left, right) {
                    (Some(a), Some(b)) if b != 0.0 => Value::Real(a / b),
                    _ => Value::Null,
                })
            }
            Expr::Call(func, args) => self.call(*func, args),
        }
    }

    fn column(&self, name: &str) -> QueryResult<Value> {
        let name = name.replace(['`', '"'], "");
        if let Some((table, _)) = name.rsplit_once('.') {
            if table != self.table {
                return Err(QueryError::UnknownColumn(name.clone()));
            }
        }
        self.row
            .get(&name)
            .cloned()
            .ok_or(QueryError::UnknownColumn(name))
    }

    fn call(&self, func: Func, args: &[Expr]) -> QueryResult<Value> {
        if func == Func::Coalesce {
            for arg in args {
                let value = self.evaluate(arg)?;
                if !value.is_null() {
                    return Ok(value);
                }
            }
            return Ok(Value::Null);
        }

        let values = args
            .iter()
            .map(|arg| self.evaluate(arg))
            .collect::<QueryResult<Vec<_>>>()?;
        let expected = match func {
            Func::Replace => 3,
            _ => 1,
        };
        if values.len() != expected {
            return Err(QueryError::Backend(format!(
                "{:?} expects {} argument(s), got {}",
                func,
                expected,
                values.len()
            )));
        }
        if values.iter().any(Value::is_null) {
            return Ok(Value::Null);
        }

        let text = |i: usize| values[i].to_text().unwrap_or_default();
        Ok(match func {
            Func::Round => match values[0].as_f64() {
                Some(n) => Value::Real(n.round()),
                None => Value::Null,
            },
            Func::CharLength => Value::Integer(text(0).chars().count() as i64),
            Func::Replace => {
                let from = text(1);
                if from.is_empty() {
                    Value::Text(text(0))
                } else {
                    Value::Text(text(0).replace(&from, &text(2)))
                }
            }
            Func::Lower => Value::Text(text(0).to_lowercase()),
            Func::Upper => Value::Text(text(0).to_uppercase()),
            Func::Trim => Value::Text(text(0).trim_matches(' ').to_string()),
            Func::Coalesce => Value::Null,
        })
    }
}

fn arithmetic(
    left: &Value,
    right: &Value,
    integer: fn(i64, i64) -> Option<i64>,
    real: fn(f64, f64) -> f64,
) -> Value {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => match integer(*a, *b) {
            Some(n) => Value::Integer(n),
            None => Value::Real(real(*a as f64, *b as f64)),
        },
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => Value::Real(real(a, b)),
            _ => Value::Null,
        },
    }
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> Value {
    if left.is_null() || right.is_null() {
        return Value::Null;
    }
    let ordering = match op {
        CmpOp::EqIgnoreCase => {
            let fold = |v: &Value| v.to_text().unwrap_or_default().to_lowercase();
            fold(left).cmp(&fold(right))
        }
        _ => match sql_cmp(left, right) {
            Some(ordering) => ordering,
            None => return Value::Null,
        },
    };
    Value::from_bool(match op {
        CmpOp::Eq | CmpOp::EqIgnoreCase => ordering == Ordering::Equal,
        CmpOp::Gt => ordering == Ordering::Greater,
        CmpOp::Ge => ordering != Ordering::Less,
        CmpOp::Lt => ordering == Ordering::Less,
        CmpOp::Le => ordering != Ordering::Greater,
    })
}

/// Text compares with text; anything else compares numerically
fn sql_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        _ => left.as_f64()?.partial_cmp(&right.as_f64()?),
    }
}

/// Sort order of values: NULL first, then numbers, then text
pub(crate) fn sort_cmp(left: &Value, right: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Integer(_) | Value::Real(_) => 1,
            Value::Text(_) => 2,
        }
    }
    match rank(left).cmp(&rank(right)) {
        Ordering::Equal => sql_cmp(left, right).unwrap_or(Ordering::Equal),
        other => other,
    }
}
