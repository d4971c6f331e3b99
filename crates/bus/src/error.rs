use thiserror::Error;

/// Errors that can occur when talking to the broker.
#[derive(Debug, Error)]
pub enum BusError {
    /// The broker could not be reached within the bounded timeout.
    #[error("broker unavailable: {0}")]
    Unavailable(String),

    /// A wire payload could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The named queue was never declared.
    #[error("unknown queue: {0}")]
    UnknownQueue(String),
}

/// Result type for bus operations.
pub type Result<T> = std::result::Result<T, BusError>;

/// Error returned by an event handler.
///
/// A handler failure leaves the message unacknowledged so the broker
/// redelivers it; the error only carries a message for the log.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    /// Wraps any displayable error.
    pub fn new(err: impl std::fmt::Display) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}
