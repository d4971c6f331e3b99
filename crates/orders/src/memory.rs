//! In-memory order store for tests and local development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderId;

use crate::model::Order;
use crate::store::OrderStore;
use crate::Result;

/// HashMap-backed [`OrderStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders.
    pub fn len(&self) -> usize {
        self.orders.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().unwrap().is_empty()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.write().unwrap();
        orders.insert(order.order_id, order.clone());
        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().unwrap();
        Ok(orders.get(&order_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{Channel, Money, OrderStatus};
    use crate::model::OrderLine;

    fn sample_order() -> Order {
        let now = Utc::now();
        Order {
            order_id: OrderId::new(),
            customer_id: None,
            channel: Channel::InStore,
            status: OrderStatus::Paid,
            total_price: Money::from_cents(700),
            created_at: now,
            updated_at: now,
            lines: vec![OrderLine {
                menu_item_id: common::MenuItemId::new(),
                quantity: 2,
                unit_price: Money::from_cents(350),
            }],
        }
    }

    #[tokio::test]
    async fn insert_and_get_roundtrip() {
        let store = InMemoryOrderStore::new();
        let order = sample_order();
        store.insert(&order).await.unwrap();

        let loaded = store.get(order.order_id).await.unwrap().unwrap();
        assert_eq!(loaded.order_id, order.order_id);
        assert_eq!(loaded.total_price, order.total_price);
        assert_eq!(loaded.lines, order.lines);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = InMemoryOrderStore::new();
        assert!(store.get(OrderId::new()).await.unwrap().is_none());
    }
}
