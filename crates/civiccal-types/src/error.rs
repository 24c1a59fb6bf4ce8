use thiserror::Error;

/// Errors from repository operations (used by trait definitions in
/// civiccal-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from the reservation and cancellation paths.
///
/// These propagate unchanged to the caller for user-facing reporting;
/// the engine performs no local recovery or retry on the booking path.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("authentication required")]
    AuthenticationRequired,

    #[error("slot is no longer available")]
    SlotUnavailable,

    #[error("permission denied")]
    PermissionDenied,

    #[error("clinic or appointment not found")]
    NotFound,

    #[error("invalid booking window: {0}")]
    InvalidWindow(String),

    #[error("illegal status transition from '{from}' to '{to}'")]
    IllegalTransition { from: String, to: String },

    #[error("storage error: {0}")]
    Store(#[from] RepositoryError),
}

/// Errors from calendar aggregation.
///
/// Per-source failures are recovered locally (logged and skipped); this
/// error is only surfaced when every source failed.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("all calendar sources failed")]
    AllSourcesFailed,
}

/// Errors from the authentication port.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no authenticated user")]
    NotAuthenticated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_error_display() {
        let err = BookingError::InvalidWindow("window exceeds slot duration".to_string());
        assert_eq!(
            err.to_string(),
            "invalid booking window: window exceeds slot duration"
        );
    }

    #[test]
    fn repository_error_wraps_into_booking_error() {
        let err: BookingError = RepositoryError::Query("syntax error".to_string()).into();
        assert!(matches!(err, BookingError::Store(RepositoryError::Query(_))));
        assert_eq!(err.to_string(), "storage error: query error: syntax error");
    }

    #[test]
    fn aggregation_error_display() {
        assert_eq!(
            AggregationError::AllSourcesFailed.to_string(),
            "all calendar sources failed"
        );
    }
}
