//! Unicode case folding for SQLite connections
//!
//! SQLite's built-in `lower`, `upper`, `LIKE` and `NOCASE` collation only fold
//! ASCII letters. The in-memory evaluator folds full Unicode, the way MySQL's
//! default collations do, so every connection a store owns gets these
//! replacements registered before the first query runs.

use std::cmp::Ordering;

use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::error::Result;

/// Override `lower`, `upper`, `like` and the `NOCASE` collation
pub fn register(conn: &Connection) -> Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

    conn.create_scalar_function("lower", 1, flags, |ctx| {
        Ok(text_arg(ctx, 0).map(|s| s.to_lowercase()))
    })?;
    conn.create_scalar_function("upper", 1, flags, |ctx| {
        Ok(text_arg(ctx, 0).map(|s| s.to_uppercase()))
    })?;
    // `X LIKE P` calls like(P, X); `X LIKE P ESCAPE E` calls like(P, X, E)
    conn.create_scalar_function("like", 2, flags, like)?;
    conn.create_scalar_function("like", 3, flags, like)?;
    conn.create_collation("NOCASE", fold_cmp)?;
    Ok(())
}

fn like(ctx: &Context<'_>) -> rusqlite::Result<Option<bool>> {
    let escape = if ctx.len() > 2 {
        let Some(escape) = text_arg(ctx, 2) else {
            return Ok(None);
        };
        let mut chars = escape.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => {
                return Err(rusqlite::Error::UserFunctionError(
                    "ESCAPE expression must be a single character".into(),
                ))
            }
        }
    } else {
        None
    };

    match (text_arg(ctx, 0), text_arg(ctx, 1)) {
        (Some(pattern), Some(text)) => Ok(Some(like_matches(&pattern, &text, escape))),
        _ => Ok(None),
    }
}

fn fold_cmp(left: &str, right: &str) -> Ordering {
    left.to_lowercase().cmp(&right.to_lowercase())
}

/// SQLite's text affinity for function arguments; NULL stays `None`
fn text_arg(ctx: &Context<'_>, idx: usize) -> Option<String> {
    match ctx.get_raw(idx) {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// `%`
    Any,
    /// `_`
    One,
    Char(char),
}

fn tokenize(pattern: &str, escape: Option<char>) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if Some(c) == escape {
            // A trailing escape matches itself
            let literal = chars.next().unwrap_or(c);
            tokens.extend(literal.to_lowercase().map(Token::Char));
            continue;
        }
        match c {
            '%' => tokens.push(Token::Any),
            '_' => tokens.push(Token::One),
            _ => tokens.extend(c.to_lowercase().map(Token::Char)),
        }
    }
    tokens
}

/// Case-insensitive LIKE with Unicode folding
pub fn like_matches(pattern: &str, text: &str, escape: Option<char>) -> bool {
    let tokens = tokenize(pattern, escape);
    let text: Vec<char> = text.to_lowercase().chars().collect();

    let (mut t, mut s) = (0, 0);
    // Last `%` seen and the text position it currently absorbs up to
    let mut backtrack: Option<(usize, usize)> = None;
    while s < text.len() {
        match tokens.get(t) {
            Some(Token::Any) => {
                backtrack = Some((t, s));
                t += 1;
            }
            Some(Token::One) => {
                t += 1;
                s += 1;
            }
            Some(Token::Char(c)) if *c == text[s] => {
                t += 1;
                s += 1;
            }
            _ => match backtrack {
                Some((any, absorbed)) => {
                    backtrack = Some((any, absorbed + 1));
                    t = any + 1;
                    s = absorbed + 1;
                }
                None => return false,
            },
        }
    }
    tokens[t..].iter().all(|token| *token == Token::Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        register(&conn).unwrap();
        conn
    }

    fn query<T: rusqlite::types::FromSql>(conn: &Connection, sql: &str) -> T {
        conn.query_row(sql, [], |row| row.get(0)).unwrap()
    }

    #[test]
    fn test_like_matches() {
        assert!(like_matches("%émile%", "Émile Zola", None));
        assert!(like_matches("Ö% H%", "Ödön Horváth", None));
        assert!(like_matches("j_ne", "JANE", None));
        assert!(!like_matches("j_ne", "jne", None));
        assert!(like_matches("%a%b%", "xxaxxbxx", None));
        assert!(!like_matches("%a%b", "xxaxxbxx", None));
        assert!(like_matches("", "", None));
        assert!(!like_matches("", "a", None));
    }

    #[test]
    fn test_like_escape() {
        assert!(like_matches("50\\%", "50%", Some('\\')));
        assert!(!like_matches("50\\%", "500", Some('\\')));
        assert!(like_matches("a\\_b", "a_b", Some('\\')));
        assert!(!like_matches("a\\_b", "axb", Some('\\')));
    }

    #[test]
    fn test_lower_and_upper_fold_unicode() {
        let conn = connection();
        assert_eq!(query::<String>(&conn, "SELECT lower('ÉMILE')"), "émile");
        assert_eq!(query::<String>(&conn, "SELECT upper('ödön')"), "ÖDÖN");
        assert_eq!(query::<Option<String>>(&conn, "SELECT lower(NULL)"), None);
    }

    #[test]
    fn test_like_operator_is_overridden() {
        let conn = connection();
        assert_eq!(query::<i64>(&conn, "SELECT 'Émile Zola' LIKE '%émile%'"), 1);
        assert_eq!(
            query::<i64>(&conn, "SELECT 'Émile' LIKE 'é\\%' ESCAPE '\\'"),
            0
        );
        assert_eq!(query::<Option<i64>>(&conn, "SELECT NULL LIKE '%'"), None);
    }

    #[test]
    fn test_nocase_collation_folds_unicode() {
        let conn = connection();
        assert_eq!(
            query::<i64>(&conn, "SELECT 'Ödön Horváth' = 'ÖDÖN HORVÁTH' COLLATE NOCASE"),
            1
        );
    }

    #[test]
    fn test_glob_stays_case_sensitive() {
        let conn = connection();
        assert_eq!(query::<i64>(&conn, "SELECT 'ÉmileZola' GLOB 'É*Z*'"), 1);
        assert_eq!(query::<i64>(&conn, "SELECT 'émilezola' GLOB 'É*Z*'"), 0);
    }
}
