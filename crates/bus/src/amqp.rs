//! AMQP (RabbitMQ) broker backend.
//!
//! Publishes to a durable topic exchange with persistent messages and
//! publisher confirms; consumers ack only after the handler commits, and
//! nack-with-requeue on handler failure so the broker redelivers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicPublishOptions,
    BasicRejectOptions, ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};

use crate::error::{BusError, Result};
use crate::event::Event;
use crate::handler::{EventHandler, EventPublisher};
use crate::EVENTS_EXCHANGE;

/// Bounded timeout for every broker round trip.
const BROKER_TIMEOUT: Duration = Duration::from_secs(5);

/// RabbitMQ-backed event bus.
pub struct AmqpBus {
    // Kept alive for the channel's lifetime.
    _connection: Connection,
    channel: Channel,
    exchange: String,
}

impl AmqpBus {
    /// Connects and declares the durable topic exchange.
    pub async fn connect(url: &str) -> Result<Self> {
        let connection = Connection::connect(url, ConnectionProperties::default())
            .await
            .map_err(|e| BusError::Unavailable(format!("connect failed: {e}")))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| BusError::Unavailable(format!("channel failed: {e}")))?;

        channel
            .exchange_declare(
                EVENTS_EXCHANGE,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| BusError::Unavailable(format!("exchange declare failed: {e}")))?;

        tracing::info!(exchange = EVENTS_EXCHANGE, url, "connected to AMQP broker");

        Ok(Self {
            _connection: connection,
            channel,
            exchange: EVENTS_EXCHANGE.to_string(),
        })
    }

    /// Declares a durable queue and binds it to a routing key.
    ///
    /// Queue names are stable across restarts; the declaration is
    /// idempotent, so every process can declare its own topology on boot.
    pub async fn declare_queue(&self, queue: &str, routing_key: &str) -> Result<()> {
        self.channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| BusError::Unavailable(format!("queue declare failed: {e}")))?;

        self.channel
            .queue_bind(
                queue,
                &self.exchange,
                routing_key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| BusError::Unavailable(format!("queue bind failed: {e}")))?;

        tracing::info!(queue, routing_key, "bound queue to exchange");
        Ok(())
    }

    /// Consumes one queue until the connection drops.
    ///
    /// Acknowledges after the handler returns Ok; nacks with requeue on
    /// handler failure. Payloads that do not parse as a known event are
    /// rejected without requeue, since redelivering a malformed message
    /// can never succeed.
    pub async fn consume(&self, queue: &str, handler: Arc<dyn EventHandler>) -> Result<()> {
        let mut consumer = self
            .channel
            .basic_consume(
                queue,
                handler.name(),
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| BusError::Unavailable(format!("consume failed: {e}")))?;

        tracing::info!(queue, handler = handler.name(), "consumer started");

        while let Some(delivery) = consumer.next().await {
            let delivery = match delivery {
                Ok(d) => d,
                Err(e) => {
                    tracing::error!(queue, error = %e, "delivery error, consumer stopping");
                    return Err(BusError::Unavailable(e.to_string()));
                }
            };

            match serde_json::from_slice::<Event>(&delivery.data) {
                Ok(event) => match handler.handle(&event).await {
                    Ok(()) => {
                        if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
                            tracing::error!(queue, error = %e, "ack failed");
                        }
                        metrics::counter!("bus_messages_acked").increment(1);
                    }
                    Err(e) => {
                        tracing::warn!(
                            queue,
                            handler = handler.name(),
                            error = %e,
                            "handler failed, nack with requeue"
                        );
                        let nack = BasicNackOptions {
                            requeue: true,
                            ..Default::default()
                        };
                        if let Err(e) = delivery.nack(nack).await {
                            tracing::error!(queue, error = %e, "nack failed");
                        }
                        metrics::counter!("bus_messages_requeued").increment(1);
                    }
                },
                Err(e) => {
                    tracing::error!(queue, error = %e, "malformed payload, rejecting");
                    let reject = BasicRejectOptions { requeue: false };
                    if let Err(e) = delivery.reject(reject).await {
                        tracing::error!(queue, error = %e, "reject failed");
                    }
                }
            }
        }

        tracing::info!(queue, "consumer stream ended");
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for AmqpBus {
    async fn publish(&self, routing_key: &str, event: &Event) -> Result<()> {
        let payload = serde_json::to_vec(event)?;

        let properties = BasicProperties::default()
            .with_content_type("application/json".to_string().into())
            .with_delivery_mode(2); // persistent

        let publish = self.channel.basic_publish(
            &self.exchange,
            routing_key,
            BasicPublishOptions::default(),
            &payload,
            properties,
        );

        let confirm = tokio::time::timeout(BROKER_TIMEOUT, publish)
            .await
            .map_err(|_| BusError::Unavailable("publish timed out".to_string()))?
            .map_err(|e| BusError::Unavailable(format!("publish failed: {e}")))?;

        tokio::time::timeout(BROKER_TIMEOUT, confirm)
            .await
            .map_err(|_| BusError::Unavailable("publish confirm timed out".to_string()))?
            .map_err(|e| BusError::Unavailable(format!("publish not confirmed: {e}")))?;

        tracing::debug!(routing_key, "published event");
        metrics::counter!("bus_messages_published").increment(1);
        Ok(())
    }
}
