//! Operator-facing ticket operations.

use std::sync::Arc;

use common::OrderId;

use crate::model::{KitchenTicket, TicketStatus};
use crate::store::TicketStore;
use crate::{KitchenError, Result};

/// Lifecycle operations the kitchen staff drive.
///
/// Tickets are addressed by order id; when a redelivery has produced
/// duplicates, the oldest ticket is the one worked.
pub struct KitchenService {
    store: Arc<dyn TicketStore>,
}

impl KitchenService {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    /// Oldest ticket for an order.
    pub async fn get_ticket(&self, order_id: OrderId) -> Result<KitchenTicket> {
        self.store
            .get_by_order(order_id)
            .await?
            .ok_or(KitchenError::NotFound(order_id))
    }

    /// Marks the ticket IN_PROGRESS.
    #[tracing::instrument(skip(self))]
    pub async fn start_ticket(&self, order_id: OrderId) -> Result<KitchenTicket> {
        let mut ticket = self.get_ticket(order_id).await?;
        ticket.start()?;
        self.store.update(&ticket).await?;
        Ok(ticket)
    }

    /// Marks the ticket DONE, implying the start if it never happened.
    #[tracing::instrument(skip(self))]
    pub async fn complete_ticket(&self, order_id: OrderId) -> Result<KitchenTicket> {
        let mut ticket = self.get_ticket(order_id).await?;
        ticket.complete()?;
        self.store.update(&ticket).await?;
        metrics::counter!("kitchen_tickets_completed_total").increment(1);
        Ok(ticket)
    }

    /// Lists tickets in the given statuses, oldest first. An empty filter
    /// means the operator's default board: NEW and IN_PROGRESS.
    pub async fn list_tickets(&self, statuses: &[TicketStatus]) -> Result<Vec<KitchenTicket>> {
        if statuses.is_empty() {
            return self
                .store
                .list_by_status(&[TicketStatus::New, TicketStatus::InProgress])
                .await;
        }
        self.store.list_by_status(statuses).await
    }
}
