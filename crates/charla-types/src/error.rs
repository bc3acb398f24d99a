use thiserror::Error;

use crate::llm::GenerationError;

/// Errors from storage operations (used by the trait definitions in charla-core).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("incompatible schema: {0}")]
    Schema(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("query error: {0}")]
    Query(String),
}

/// Errors surfaced by a conversation turn.
///
/// `MissingUser` and `ChatNotFound` are caller mistakes, reported
/// synchronously and never retried automatically. `Generation` leaves the
/// user's prompt durably recorded so the turn can be retried.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a user id is required to start a new chat")]
    MissingUser,

    #[error("chat not found")]
    ChatNotFound,

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_session_error_from_store() {
        let err = SessionError::from(StoreError::NotFound);
        assert!(matches!(err, SessionError::Store(StoreError::NotFound)));
    }

    #[test]
    fn test_session_error_from_generation() {
        let err = SessionError::from(GenerationError::RateLimited);
        assert_eq!(err.to_string(), "rate limited");
    }
}
