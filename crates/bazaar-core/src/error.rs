use thiserror::Error;

/// Application-wide error types for Bazaar.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request data failed a domain rule.
    #[error("{0}")]
    Validation(String),

    /// Missing, malformed, or expired credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but the caller's role is not allowed.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// The request conflicts with current state (duplicate keys, illegal status change).
    #[error("{0}")]
    Conflict(String),

    /// A product cannot cover the requested quantity.
    #[error("Insufficient stock for {product}: {available} available, {requested} requested")]
    InsufficientStock {
        product: String,
        available: i32,
        requested: i32,
    },

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a `NotFound` naming the entity and its key.
    pub fn not_found(entity: &str, key: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("{entity} not found: {key}"))
    }

    /// Returns true for failures caused by the server rather than the caller.
    ///
    /// Their messages are logged but never returned to clients.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AppError::DatabaseError(_) | AppError::ConfigError(_) | AppError::Internal(_)
        )
    }
}
