//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools. Window queries run against the indexed
//! `start_at` columns; the engine never filters unrelated rows client-side.

pub mod appointment;
pub mod business;
pub mod clinic;
pub mod pool;
pub mod slot;

use civiccal_types::error::RepositoryError;

/// Map a sqlx error onto the repository error surface.
pub(crate) fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::RowNotFound => RepositoryError::NotFound,
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

/// Parse an RFC 3339 TEXT column into a UTC datetime.
pub(crate) fn parse_datetime(
    s: &str,
) -> Result<chrono::DateTime<chrono::Utc>, RepositoryError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Format a UTC datetime as its stored TEXT form.
pub(crate) fn format_datetime(dt: &chrono::DateTime<chrono::Utc>) -> String {
    dt.to_rfc3339()
}
