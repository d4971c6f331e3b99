use async_trait::async_trait;
use common::OrderId;

use crate::model::Order;
use crate::Result;

/// Storage for orders and their lines.
///
/// `insert` is the only place the core relies on local transactional
/// storage: an order and its lines become visible together or not at all.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists an order with all of its lines atomically.
    async fn insert(&self, order: &Order) -> Result<()>;

    /// Loads an order (with lines) by id.
    async fn get(&self, order_id: OrderId) -> Result<Option<Order>>;
}
