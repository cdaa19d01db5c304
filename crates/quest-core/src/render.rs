//! Rendering of expression trees into dialect-specific SQL
//!
//! # Dialects
//!
//! - **MySQL**: `IF(...)`, `LIKE BINARY`, `CHAR_LENGTH`, backtick identifiers
//! - **SQLite**: `CASE WHEN`, `LIKE ... ESCAPE`, `GLOB`, `LENGTH`, `"` identifiers
//!
//! Search terms are bound as parameters (`?`). The inline renderer writes
//! escaped literals instead and is meant for debugging and assertions.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::expr::{CmpOp, Expr, Func};
use crate::query::SelectQuery;
use crate::value::Value;

/// Target SQL dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    MySql,
    Sqlite,
}

impl Dialect {
    /// Quote a possibly qualified identifier (`users.name`, `users.*`)
    pub fn quote_identifier(self, ident: &str) -> String {
        ident
            .split('.')
            .map(|part| {
                let part = part.trim_matches(|c| c == '`' || c == '"' || c == ' ');
                if part == "*" {
                    return part.to_string();
                }
                match self {
                    Dialect::MySql => format!("`{}`", part.replace('`', "``")),
                    Dialect::Sqlite => format!("\"{}\"", part.replace('"', "\"\"")),
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quote a string literal
    pub fn quote_text(self, text: &str) -> String {
        match self {
            Dialect::MySql => format!("'{}'", text.replace('\\', "\\\\").replace('\'', "''")),
            Dialect::Sqlite => format!("'{}'", text.replace('\'', "''")),
        }
    }

    fn function_name(self, func: Func) -> &'static str {
        match (self, func) {
            (_, Func::Round) => "ROUND",
            (Dialect::MySql, Func::CharLength) => "CHAR_LENGTH",
            (Dialect::Sqlite, Func::CharLength) => "LENGTH",
            (_, Func::Replace) => "REPLACE",
            (_, Func::Lower) => "LOWER",
            (_, Func::Upper) => "UPPER",
            (_, Func::Trim) => "TRIM",
            (_, Func::Coalesce) => "COALESCE",
        }
    }
}

/// Rendered SQL with its positional parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Renders [`Expr`] trees and [`SelectQuery`] values to SQL text
#[derive(Debug)]
pub struct SqlRenderer {
    dialect: Dialect,
    inline: bool,
    params: Vec<Value>,
}

impl SqlRenderer {
    /// Renderer that binds text values as `?` parameters
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            inline: false,
            params: Vec::new(),
        }
    }

    /// Renderer that writes escaped literals in place of parameters
    pub fn inline(dialect: Dialect) -> Self {
        Self {
            inline: true,
            ..Self::new(dialect)
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Render a standalone expression
    pub fn render_expr(&mut self, expr: &Expr) -> String {
        self.write(expr, 0)
    }

    /// Render an expression and take the collected parameters
    pub fn expr_to_sql(mut self, expr: &Expr) -> SqlQuery {
        let sql = self.render_expr(expr);
        SqlQuery {
            sql,
            params: self.params,
        }
    }

    /// Render a full `SELECT`
    pub fn render_select(mut self, query: &SelectQuery) -> SqlQuery {
        let table = self.dialect.quote_identifier(query.table());
        let mut sql = format!("SELECT {}.*", table);

        for (expr, alias) in query.projections() {
            let rendered = self.write(expr, 0);
            sql.push_str(&format!(
                ", {} AS {}",
                rendered,
                self.dialect.quote_identifier(alias)
            ));
        }

        sql.push_str(&format!(" FROM {}", table));

        let condition = query.condition();
        if condition != Expr::Bool(true) {
            let rendered = self.write(&condition, 0);
            sql.push_str(&format!(" WHERE {}", rendered));
        }

        if !query.orders().is_empty() {
            let terms: Vec<String> = query
                .orders()
                .iter()
                .map(|(expr, direction)| format!("{} {}", self.write(expr, 0), direction.as_sql()))
                .collect();
            sql.push_str(&format!(" ORDER BY {}", terms.join(", ")));
        }

        match (query.limit(), query.offset()) {
            (Some(limit), Some(offset)) => {
                sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset))
            }
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {}", limit)),
            (None, Some(offset)) => {
                let unbounded = match self.dialect {
                    Dialect::MySql => "18446744073709551615",
                    Dialect::Sqlite => "-1",
                };
                sql.push_str(&format!(" LIMIT {} OFFSET {}", unbounded, offset))
            }
            (None, None) => {}
        }

        trace!(dialect = ?self.dialect, params = self.params.len(), %sql, "rendered select");

        SqlQuery {
            sql,
            params: self.params,
        }
    }

    fn bind(&mut self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Integer(i) if self.inline => i.to_string(),
            Value::Real(r) if self.inline => format_number(*r),
            Value::Text(s) if self.inline => self.dialect.quote_text(s),
            other => {
                self.params.push(other.clone());
                "?".to_string()
            }
        }
    }

    fn write(&mut self, expr: &Expr, min_precedence: u8) -> String {
        let sql = match expr {
            Expr::Column(name) => self.dialect.quote_identifier(name),
            Expr::Bound(value) => self.bind(value),
            Expr::Number(n) => format_number(*n),
            Expr::Bool(true) => "TRUE".to_string(),
            Expr::Bool(false) => "FALSE".to_string(),
            Expr::Like {
                subject,
                pattern,
                case_sensitive,
            } => {
                let subject = self.write(subject, 4);
                match (self.dialect, *case_sensitive) {
                    (Dialect::MySql, false) => {
                        format!("{} LIKE {}", subject, self.bind(&pattern.to_like().into()))
                    }
                    (Dialect::MySql, true) => format!(
                        "{} LIKE BINARY {}",
                        subject,
                        self.bind(&pattern.to_like().into())
                    ),
                    (Dialect::Sqlite, false) => format!(
                        "{} LIKE {} ESCAPE '\\'",
                        subject,
                        self.bind(&pattern.to_like().into())
                    ),
                    (Dialect::Sqlite, true) => {
                        format!("{} GLOB {}", subject, self.bind(&pattern.to_glob().into()))
                    }
                }
            }
            Expr::Compare { op, left, right } => {
                let left = self.write(left, 5);
                let right = self.write(right, 5);
                match (self.dialect, *op) {
                    (Dialect::Sqlite, CmpOp::EqIgnoreCase) => {
                        format!("{} = {} COLLATE NOCASE", left, right)
                    }
                    _ => format!("{} {} {}", left, op.symbol(), right),
                }
            }
            Expr::And(items) => self.join(items, " AND ", 3),
            Expr::Or(items) => self.join(items, " OR ", 3),
            Expr::If {
                cond,
                then,
                otherwise,
            } => {
                let cond = self.write(cond, 0);
                let then = self.write(then, 0);
                let otherwise = self.write(otherwise, 0);
                match self.dialect {
                    Dialect::MySql => format!("IF({}, {}, {})", cond, then, otherwise),
                    Dialect::Sqlite => {
                        format!("CASE WHEN {} THEN {} ELSE {} END", cond, then, otherwise)
                    }
                }
            }
            Expr::Add(items) => self.join(items, " + ", 4),
            Expr::Sub(left, right) => {
                let left = self.write(left, 4);
                let right = self.write(right, 5);
                format!("{} - {}", left, right)
            }
            Expr::Mul(left, right) => {
                let left = self.write(left, 5);
                let right = self.write(right, 6);
                format!("{} * {}", left, right)
            }
            Expr::Div(left, right) => match self.dialect {
                Dialect::MySql => {
                    let left = self.write(left, 5);
                    let right = self.write(right, 6);
                    format!("{} / {}", left, right)
                }
                // Integer division would truncate ratios to zero
                Dialect::Sqlite => {
                    let left = self.write(left, 0);
                    let right = self.write(right, 6);
                    format!("CAST({} AS REAL) / {}", left, right)
                }
            },
            Expr::Call(func, args) => {
                let args = self.join(args, ", ", 0);
                format!("{}({})", self.dialect.function_name(*func), args)
            }
        };

        if precedence(expr) < min_precedence {
            format!("({})", sql)
        } else {
            sql
        }
    }

    fn join(&mut self, items: &[Expr], separator: &str, min_precedence: u8) -> String {
        items
            .iter()
            .map(|item| self.write(item, min_precedence))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Or(_) => 1,
        Expr::And(_) => 2,
        Expr::Compare { .. } | Expr::Like { .. } => 3,
        Expr::Add(_) | Expr::Sub(_, _) => 4,
        Expr::Mul(_, _) | Expr::Div(_, _) => 5,
        _ => 6,
    }
}

/// Integral values print without a fractional part (`32`, not `32.0`)
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
