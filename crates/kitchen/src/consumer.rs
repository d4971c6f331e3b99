//! OrderCreated consumer that opens kitchen tickets.

use std::sync::Arc;

use async_trait::async_trait;
use bus::error::HandlerError;
use bus::event::Event;
use bus::EventHandler;

use crate::model::KitchenTicket;
use crate::store::TicketStore;

/// Opens one NEW ticket per delivered OrderCreated event.
///
/// Not idempotent: a redelivery opens a second ticket for the same order.
pub struct TicketConsumer {
    store: Arc<dyn TicketStore>,
}

impl TicketConsumer {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EventHandler for TicketConsumer {
    fn name(&self) -> &'static str {
        "kitchen-tickets"
    }

    #[tracing::instrument(skip(self, event), fields(event_type = event.event_type()))]
    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        let Event::OrderCreated(order) = event;

        let ticket = KitchenTicket::new(order.order_id, order.items.clone());
        self.store.insert(&ticket).await.map_err(HandlerError::new)?;

        metrics::counter!("kitchen_tickets_created_total").increment(1);
        tracing::info!(
            ticket_id = %ticket.ticket_id,
            order_id = %order.order_id,
            lines = ticket.items.len(),
            "kitchen ticket opened"
        );
        Ok(())
    }
}
