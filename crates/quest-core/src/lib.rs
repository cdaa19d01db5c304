//! Quest Core Engine
//!
//! Fuzzy relevance search for SQL queries. A search term is scored against a
//! column by a fixed set of pattern matchers; the score doubles as a row
//! filter and as a sort key. Everything is expressed as a dialect-independent
//! expression tree, rendered to MySQL or SQLite, or evaluated in memory.
//!
//! # Example
//!
//! ```rust
//! use quest_core::storage::{MemoryStore, Row, RowStore};
//! use quest_core::{Dialect, FuzzyQuery};
//!
//! let mut store = MemoryStore::new();
//! for (name, country) in [("John Doe", "United Kingdom"), ("Jane Doe", "United States")] {
//!     store
//!         .insert("users", Row::new().with("name", name).with("country", country))
//!         .unwrap();
//! }
//!
//! // Fuzzy search
//! let query = FuzzyQuery::table("users").where_fuzzy("name", "jd");
//! let rows = query.get(&store).unwrap();
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[0].relevance(), Some(53.0));
//!
//! // The same query as SQL
//! let sql = query.to_sql(Dialect::MySql);
//! assert!(sql.sql.contains("ORDER BY"));
//! ```

pub mod compose;
pub mod config;
pub mod error;
pub mod expr;
pub mod matcher;
pub mod query;
pub mod render;
pub mod score;
pub mod storage;
pub mod value;

// Re-export main types at crate root
pub use compose::{Boolean, ConditionComposer, ConditionNode};
pub use config::FuzzyConfig;
pub use error::{FuzzyError, QueryError, QueryResult, Result};
pub use expr::{Expr, LikePattern};
pub use matcher::{MatcherDefinition, MatcherKind, MatcherRegistry};
pub use query::{ClauseSink, Direction, FuzzyFields, FuzzyQuery, SelectQuery};
pub use render::{Dialect, SqlQuery, SqlRenderer};
pub use score::{ScoreExpression, SearchTerm};
pub use storage::{MemoryStore, Row, RowStore};
pub use value::Value;
