use common::MenuItemId;
use thiserror::Error;

/// Errors from catalog lookups.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The item id is unknown or the item is inactive. Only active items
    /// are orderable; an inactive item is indistinguishable from a missing
    /// one at this boundary.
    #[error("menu item not found: {0}")]
    NotFound(MenuItemId),

    /// The catalog could not be reached within the bounded timeout.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
