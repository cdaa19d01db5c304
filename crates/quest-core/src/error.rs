//! Error types for fuzzy query building and execution

use thiserror::Error;

/// Result type for fuzzy query operations
pub type Result<T> = std::result::Result<T, FuzzyError>;

/// Errors raised while building a fuzzy query
#[derive(Debug, Clone, Error)]
pub enum FuzzyError {
    /// Term weight must be finite and strictly positive
    #[error("invalid weight for field '{field}': {weight} (must be finite and > 0)")]
    InvalidWeight { field: String, weight: f64 },

    /// Minimum relevance threshold must be finite
    #[error("invalid relevance threshold: {0}")]
    InvalidThreshold(f64),

    /// Pages are 1-based and must hold at least one row
    #[error("invalid pagination: page {page}, per_page {per_page}")]
    InvalidPagination { page: usize, per_page: usize },

    /// Configuration could not be parsed
    #[error("config error: {0}")]
    Config(String),

    /// The executing store rejected the query
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl From<serde_json::Error> for FuzzyError {
    fn from(err: serde_json::Error) -> Self {
        FuzzyError::Config(err.to_string())
    }
}

/// Errors reported by a [`crate::storage::RowStore`] while executing a query
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// Column referenced by the query does not exist
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// Table referenced by the query does not exist
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// Storage backend error (database, filesystem, etc.)
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Value could not be converted to or from the backend representation
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for store operations
pub type QueryResult<T> = std::result::Result<T, QueryError>;
