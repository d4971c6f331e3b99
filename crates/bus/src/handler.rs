//! Publisher and consumer contracts.

use async_trait::async_trait;

use crate::error::{HandlerError, Result};
use crate::event::Event;

/// Publishes events to the topic exchange.
///
/// Publish is fire-and-forget from the caller's perspective; the broker
/// takes over at-least-once delivery to every bound queue. The call blocks
/// only for the broker's acknowledgment, never for downstream processing.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes one event under the given routing key.
    async fn publish(&self, routing_key: &str, event: &Event) -> Result<()>;
}

/// Processes deliveries from one queue.
///
/// Returning `Ok` acknowledges the message. Returning `Err` leaves it
/// unacknowledged, so the broker redelivers it to this or another worker of
/// the same queue. Handlers must therefore tolerate duplicate and
/// out-of-order deliveries.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Applies one delivered event.
    async fn handle(&self, event: &Event) -> std::result::Result<(), HandlerError>;
}
