use async_trait::async_trait;
use common::OrderId;

use crate::model::{KitchenTicket, TicketStatus};
use crate::Result;

/// Storage for kitchen tickets.
///
/// An order may have more than one ticket when the creating event was
/// redelivered; order-addressed reads pick the oldest ticket.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Persists a new ticket.
    async fn insert(&self, ticket: &KitchenTicket) -> Result<()>;

    /// Oldest ticket for an order, if any.
    async fn get_by_order(&self, order_id: OrderId) -> Result<Option<KitchenTicket>>;

    /// Overwrites a ticket's mutable lifecycle fields.
    async fn update(&self, ticket: &KitchenTicket) -> Result<()>;

    /// Tickets in any of the given statuses, oldest first.
    async fn list_by_status(&self, statuses: &[TicketStatus]) -> Result<Vec<KitchenTicket>>;

    /// Every ticket for an order, oldest first. Surfaces duplicates.
    async fn tickets_for_order(&self, order_id: OrderId) -> Result<Vec<KitchenTicket>>;
}
