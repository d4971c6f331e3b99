use catalog::CatalogError;
use common::{MenuItemId, OrderId};
use thiserror::Error;

/// Errors from order intake.
///
/// Validation and NotFound reject synchronously with no side effects;
/// Unavailable aborts before persistence and is retryable by the caller.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The cart had no lines.
    #[error("order must contain at least one item")]
    EmptyOrder,

    /// A line quantity was outside the accepted bounds.
    #[error("invalid quantity {quantity} for item {menu_item_id}")]
    InvalidQuantity {
        menu_item_id: MenuItemId,
        quantity: u32,
    },

    /// A referenced catalog item is unknown or inactive.
    #[error("menu item not found: {0}")]
    ItemNotFound(MenuItemId),

    /// The catalog could not be reached; the whole order is aborted and
    /// the caller may retry.
    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// The order does not exist.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CatalogError> for OrderError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => OrderError::ItemNotFound(id),
            CatalogError::Unavailable(msg) => OrderError::CatalogUnavailable(msg),
        }
    }
}

/// Result type for order operations.
pub type Result<T> = std::result::Result<T, OrderError>;
