use thiserror::Error;

/// Application-wide error taxonomy.
///
/// Repositories translate store-level sentinel conditions (zero rows
/// affected, unique-constraint violations) into these variants at the
/// boundary; anything unrecognized surfaces as [`AppError::Database`]
/// with the raw message.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or missing request input (bad JSON, bad path parameter,
    /// empty query string).
    #[error("{0}")]
    BadRequest(String),

    /// Request decoded fine but failed field-level validation.
    /// The message lists the offending fields.
    #[error("{0}")]
    Validation(String),

    /// Duplicate email or course code/name.
    #[error("{0}")]
    Conflict(String),

    /// Missing, malformed, or expired credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// No matching row.
    #[error("{0}")]
    NotFound(String),

    /// Unexpected store failure.
    #[error("database error: {0}")]
    Database(String),

    /// Invalid or missing configuration.
    #[error("config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Anything unexpected that is not the store's fault.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Returns true if the error is the caller's fault (4xx family).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::BadRequest(_)
                | AppError::Validation(_)
                | AppError::Conflict(_)
                | AppError::Unauthorized(_)
                | AppError::NotFound(_)
        )
    }
}
