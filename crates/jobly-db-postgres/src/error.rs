//! Error types for the PostgreSQL storage backend.

use jobly_storage::StorageError;
use sqlx_core::error::Error as SqlxError;

/// PostgreSQL error code for undefined table (42P01).
pub const PG_UNDEFINED_TABLE: &str = "42P01";

/// PostgreSQL error code for foreign key violation (23503).
pub const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// PostgreSQL error code for check constraint violation (23514).
pub const PG_CHECK_VIOLATION: &str = "23514";

/// PostgreSQL error code for invalid text representation (22P02).
pub const PG_INVALID_TEXT_REPRESENTATION: &str = "22P02";

/// PostgreSQL error code for numeric value out of range (22003).
pub const PG_NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Checks if a sqlx error has a specific PostgreSQL error code.
pub fn has_pg_error_code(err: &SqlxError, code: &str) -> bool {
    if let SqlxError::Database(db_err) = err {
        db_err.code().as_deref() == Some(code)
    } else {
        false
    }
}

/// Checks if a sqlx error is "undefined table" (42P01).
pub fn is_undefined_table(err: &SqlxError) -> bool {
    has_pg_error_code(err, PG_UNDEFINED_TABLE)
}

/// Checks if a sqlx error is a foreign key violation (23503).
pub fn is_foreign_key_violation(err: &SqlxError) -> bool {
    has_pg_error_code(err, PG_FOREIGN_KEY_VIOLATION)
}

/// Checks if a sqlx error was caused by the submitted data rather than the
/// database: a failed CHECK, a malformed numeric or an out-of-range value.
pub fn is_data_error(err: &SqlxError) -> bool {
    [
        PG_CHECK_VIOLATION,
        PG_INVALID_TEXT_REPRESENTATION,
        PG_NUMERIC_VALUE_OUT_OF_RANGE,
    ]
    .iter()
    .any(|code| has_pg_error_code(err, code))
}

/// Maps a query failure to a `StorageError`.
///
/// Data errors become `InvalidResource`, everything else is internal.
/// Foreign key violations are left to the caller, which knows which
/// reference was missing.
pub fn query_error(err: SqlxError, context: &str) -> StorageError {
    if is_data_error(&err)
        && let SqlxError::Database(db_err) = &err
    {
        return StorageError::invalid_resource(db_err.message().to_string());
    }
    if is_undefined_table(&err) {
        return StorageError::internal(format!("{context}: schema is not migrated: {err}"));
    }
    StorageError::internal(format!("{context}: {err}"))
}

/// Errors specific to the PostgreSQL storage backend.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx_core::error::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl PostgresError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<PostgresError> for StorageError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Connection(e) => StorageError::connection_error(e.to_string()),
            PostgresError::Migration(e) => StorageError::internal(format!("Migration error: {e}")),
            PostgresError::Config { message } => {
                StorageError::internal(format!("Configuration error: {message}"))
            }
        }
    }
}

/// Result type alias for PostgreSQL operations.
pub type Result<T> = std::result::Result<T, PostgresError>;
