use thiserror::Error;

/// Errors from the analytics feed.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The event payload could not be encoded for storage.
    #[error("payload encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
