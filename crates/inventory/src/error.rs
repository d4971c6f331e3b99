use common::IngredientId;
use thiserror::Error;

/// Errors from the stock ledger.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The ingredient is not tracked.
    #[error("ingredient not found: {0}")]
    NotFound(IngredientId),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for stock ledger operations.
pub type Result<T> = std::result::Result<T, InventoryError>;
