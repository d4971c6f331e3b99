use common::OrderId;
use thiserror::Error;

/// Errors from the fulfillment queue.
#[derive(Debug, Error)]
pub enum KitchenError {
    /// No ticket exists for this order.
    #[error("no kitchen ticket for order: {0}")]
    NotFound(OrderId),

    /// The ticket is DONE; its lifecycle is over.
    #[error("ticket for order {0} is already completed")]
    AlreadyCompleted(OrderId),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for kitchen operations.
pub type Result<T> = std::result::Result<T, KitchenError>;
