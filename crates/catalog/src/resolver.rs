//! Resolver contract and lookup result types.

use async_trait::async_trait;
use common::{IngredientId, MenuItemId, Money};
use serde::{Deserialize, Serialize};

use crate::Result;

/// An orderable catalog item with its current price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedItem {
    pub menu_item_id: MenuItemId,
    pub name: String,
    /// Current unit price; snapshotted onto the order line at order time.
    pub unit_price: Money,
}

/// One ingredient requirement per unit of a menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeLine {
    pub ingredient_id: IngredientId,
    pub quantity_per_unit: i64,
}

/// Synchronous lookups against the external menu catalog.
#[async_trait]
pub trait CatalogResolver: Send + Sync {
    /// Resolves the price of an active item.
    ///
    /// Fails with [`CatalogError::NotFound`](crate::CatalogError::NotFound)
    /// for unknown or inactive ids, and with `Unavailable` when the catalog
    /// cannot be reached within the bounded timeout.
    async fn resolve_item(&self, menu_item_id: MenuItemId) -> Result<ResolvedItem>;

    /// Resolves the recipe of an item.
    ///
    /// An empty list is a valid state meaning "no ingredient deduction for
    /// this item", not an error.
    async fn resolve_recipe(&self, menu_item_id: MenuItemId) -> Result<Vec<RecipeLine>>;
}
