//! Execution of select queries against row stores
//!
//! The [`RowStore`] trait abstracts over backends that can run a
//! [`crate::query::SelectQuery`]. Implementations exist for:
//!
//! - **Memory**: evaluates expression trees in process (`MemoryStore`)
//! - **SQLite**: renders and runs the SQL via rusqlite (`quest-sqlite` crate)
//!
//! # Example
//!
//! ```rust
//! use quest_core::storage::{MemoryStore, Row, RowStore};
//! use quest_core::FuzzyQuery;
//!
//! let mut store = MemoryStore::new();
//! store.insert("users", Row::new().with("name", "John Doe")).unwrap();
//! store.insert("users", Row::new().with("name", "Jane Doe")).unwrap();
//!
//! let rows = FuzzyQuery::table("users").where_fuzzy("name", "jad").get(&store).unwrap();
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].text("name"), Some("Jane Doe"));
//! ```

mod eval;
mod memory;
mod row;
mod traits;

pub use eval::Evaluator;
pub use memory::MemoryStore;
pub use row::Row;
pub use traits::RowStore;
