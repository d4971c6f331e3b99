//! In-memory stock store for tests and local development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bus::event::IngredientDemand;
use chrono::Utc;
use common::{IngredientId, OrderId};
use uuid::Uuid;

use crate::model::{InventoryMovement, MovementKind, StockItem};
use crate::store::{DeductionReport, SkipReason, SkippedDeduction, StockStore};
use crate::{InventoryError, Result};

#[derive(Debug, Default)]
struct LedgerState {
    items: HashMap<IngredientId, StockItem>,
    movements: Vec<InventoryMovement>,
}

/// HashMap-backed [`StockStore`].
///
/// The single RwLock gives the same all-or-nothing visibility per call that
/// the Postgres store gets from a transaction.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStockStore {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All movements ever written, in write order.
    pub fn all_movements(&self) -> Vec<InventoryMovement> {
        self.state.read().unwrap().movements.clone()
    }
}

#[async_trait]
impl StockStore for InMemoryStockStore {
    async fn apply_order(
        &self,
        order_id: OrderId,
        demand: &[IngredientDemand],
    ) -> Result<DeductionReport> {
        let mut state = self.state.write().unwrap();
        let mut report = DeductionReport::default();
        let now = Utc::now();

        for line in demand {
            let Some(item) = state.items.get_mut(&line.ingredient_id) else {
                report.skipped.push(SkippedDeduction {
                    ingredient_id: line.ingredient_id,
                    required: line.quantity,
                    reason: SkipReason::UnknownIngredient,
                });
                continue;
            };
            if item.quantity < line.quantity {
                report.skipped.push(SkippedDeduction {
                    ingredient_id: line.ingredient_id,
                    required: line.quantity,
                    reason: SkipReason::InsufficientStock {
                        available: item.quantity,
                    },
                });
                continue;
            }

            item.quantity -= line.quantity;
            item.updated_at = now;
            state.movements.push(InventoryMovement {
                movement_id: Uuid::new_v4(),
                ingredient_id: line.ingredient_id,
                quantity: line.quantity,
                kind: MovementKind::Out,
                order_id: Some(order_id),
                created_at: now,
            });
            report.deducted += 1;
        }

        Ok(report)
    }

    async fn get(&self, ingredient_id: IngredientId) -> Result<Option<StockItem>> {
        Ok(self.state.read().unwrap().items.get(&ingredient_id).cloned())
    }

    async fn list(&self) -> Result<Vec<StockItem>> {
        let state = self.state.read().unwrap();
        let mut items: Vec<StockItem> = state.items.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn create(
        &self,
        ingredient_id: IngredientId,
        name: &str,
        quantity: i64,
        reorder_threshold: i64,
    ) -> Result<StockItem> {
        let item = StockItem {
            ingredient_id,
            name: name.to_string(),
            quantity,
            reorder_threshold,
            updated_at: Utc::now(),
        };
        self.state
            .write()
            .unwrap()
            .items
            .insert(ingredient_id, item.clone());
        Ok(item)
    }

    async fn add_quantity(&self, ingredient_id: IngredientId, quantity: i64) -> Result<StockItem> {
        let mut state = self.state.write().unwrap();
        let now = Utc::now();
        let item = state
            .items
            .get_mut(&ingredient_id)
            .ok_or(InventoryError::NotFound(ingredient_id))?;
        item.quantity += quantity;
        item.updated_at = now;
        let item = item.clone();
        state.movements.push(InventoryMovement {
            movement_id: Uuid::new_v4(),
            ingredient_id,
            quantity,
            kind: MovementKind::In,
            order_id: None,
            created_at: now,
        });
        Ok(item)
    }

    async fn set_quantity(&self, ingredient_id: IngredientId, quantity: i64) -> Result<StockItem> {
        let mut state = self.state.write().unwrap();
        let item = state
            .items
            .get_mut(&ingredient_id)
            .ok_or(InventoryError::NotFound(ingredient_id))?;
        item.quantity = quantity;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn movements_for_order(&self, order_id: OrderId) -> Result<Vec<InventoryMovement>> {
        let state = self.state.read().unwrap();
        Ok(state
            .movements
            .iter()
            .filter(|m| m.order_id == Some(order_id))
            .cloned()
            .collect())
    }
}
