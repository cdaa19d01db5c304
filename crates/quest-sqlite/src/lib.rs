//! SQLite execution backend for Quest fuzzy queries
//!
//! This crate runs the SQL rendered by quest-core against SQLite, so fuzzy
//! queries can be checked end to end against a real engine.
//!
//! # Features
//!
//! - Implements the `RowStore` trait
//! - Tables are created on first insert with the row's columns
//! - Supports in-memory databases for testing
//! - Rows that tie on every order key come back in insertion order
//! - Case-insensitive matching folds Unicode, not just ASCII
//!
//! # Example
//!
//! ```rust,no_run
//! use quest_core::storage::{Row, RowStore};
//! use quest_core::FuzzyQuery;
//! use quest_sqlite::SqliteStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = SqliteStore::in_memory()?;
//! store.insert("users", Row::new().with("name", "John Doe"))?;
//! store.insert("users", Row::new().with("name", "Jane Doe"))?;
//!
//! let rows = FuzzyQuery::table("users").where_fuzzy("name", "jad").get(&store)?;
//! assert_eq!(rows.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod convert;
pub mod error;
pub mod functions;
pub mod store;

// Re-export main types
pub use error::{Result, SqliteError};
pub use store::SqliteStore;
