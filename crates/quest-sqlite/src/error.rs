//! Error types for SQLite storage backend

use quest_core::QueryError;
use thiserror::Error;

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, SqliteError>;

/// Errors that can occur during SQLite storage operations
#[derive(Debug, Error)]
pub enum SqliteError {
    /// Database connection or query error
    #[error("SQLite error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Table could not be created or written as requested
    #[error("Schema error: {0}")]
    Schema(String),

    /// Column holds a value with no Quest representation
    #[error("Unsupported value in column {0}")]
    UnsupportedValue(String),
}

/// Convert SqliteError to QueryError for the storage trait
impl From<SqliteError> for QueryError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Database(rusqlite::Error::SqliteFailure(_, Some(message))) => {
                if let Some(column) = message.strip_prefix("no such column: ") {
                    QueryError::UnknownColumn(column.to_string())
                } else if let Some(table) = message.strip_prefix("no such table: ") {
                    QueryError::UnknownTable(table.to_string())
                } else {
                    QueryError::Backend(format!("SQLite: {}", message))
                }
            }
            SqliteError::Database(e) => QueryError::Backend(format!("SQLite: {}", e)),
            SqliteError::Schema(msg) => QueryError::Backend(format!("Schema: {}", msg)),
            SqliteError::UnsupportedValue(column) => {
                QueryError::Serialization(format!("unsupported value in column {}", column))
            }
        }
    }
}
