use crate::types::DbId;

/// Domain error taxonomy shared by every layer.
///
/// Each variant maps to exactly one HTTP status in the API layer. Every
/// mutating operation either fully succeeds or fails with one of these and
/// no persisted side effect.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: i64 },

    #[error("Internal error: {0}")]
    Internal(String),
}
