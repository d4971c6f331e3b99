use async_trait::async_trait;
use bus::event::IngredientDemand;
use common::{IngredientId, OrderId};
use serde::Serialize;

use crate::model::{InventoryMovement, StockItem};
use crate::Result;

/// Why a demanded deduction was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum SkipReason {
    /// The ingredient is not tracked in the ledger.
    UnknownIngredient,
    /// On-hand quantity would have gone negative.
    InsufficientStock { available: i64 },
}

/// One demand line the ledger declined to settle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDeduction {
    pub ingredient_id: IngredientId,
    pub required: i64,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Outcome of settling one order's ingredient demand.
#[derive(Debug, Clone, Default)]
pub struct DeductionReport {
    /// Number of ingredients actually deducted.
    pub deducted: usize,
    pub skipped: Vec<SkippedDeduction>,
}

/// Storage for stock levels and the movement ledger.
#[async_trait]
pub trait StockStore: Send + Sync {
    /// Settles an order's demand against on-hand stock.
    ///
    /// Each demand line is evaluated independently: unknown ingredients and
    /// shortfalls are skipped (reported, never applied partially below
    /// zero), every successful deduction writes one OUT movement, and all
    /// effects of the call commit atomically.
    async fn apply_order(
        &self,
        order_id: OrderId,
        demand: &[IngredientDemand],
    ) -> Result<DeductionReport>;

    /// Loads one stock item.
    async fn get(&self, ingredient_id: IngredientId) -> Result<Option<StockItem>>;

    /// Lists all tracked stock items, ordered by name.
    async fn list(&self) -> Result<Vec<StockItem>>;

    /// Registers a new ingredient with an initial level.
    async fn create(
        &self,
        ingredient_id: IngredientId,
        name: &str,
        quantity: i64,
        reorder_threshold: i64,
    ) -> Result<StockItem>;

    /// Adds (restocks) quantity and writes an IN movement.
    async fn add_quantity(&self, ingredient_id: IngredientId, quantity: i64) -> Result<StockItem>;

    /// Overwrites the level outright, with no movement row. Admin correction.
    async fn set_quantity(&self, ingredient_id: IngredientId, quantity: i64) -> Result<StockItem>;

    /// Movements attributed to one order, oldest first.
    async fn movements_for_order(&self, order_id: OrderId) -> Result<Vec<InventoryMovement>>;
}
