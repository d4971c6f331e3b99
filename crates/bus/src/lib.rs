//! Event bus for the order-fulfillment pipeline.
//!
//! One durable topic exchange carries every business fact; each fact is
//! published once under a stable routing key. Each consumer owns a private
//! durable queue bound to the key(s) it cares about. Delivery is
//! at-least-once: a message is acknowledged only after the consumer has
//! durably applied it, and an unacknowledged message is redelivered. No
//! ordering guarantee is made across queues or under redelivery.
//!
//! Two backends implement the same contract: [`InMemoryBroker`] for tests
//! and single-process deployments, and [`AmqpBus`] for RabbitMQ.

pub mod amqp;
pub mod error;
pub mod event;
pub mod handler;
pub mod memory;

pub use amqp::AmqpBus;
pub use error::{BusError, HandlerError, Result};
pub use event::{Event, IngredientDemand, LineSnapshot, OrderCreatedEvent};
pub use handler::{EventHandler, EventPublisher};
pub use memory::{DeliveryStats, InMemoryBroker};

/// Name of the single durable topic exchange.
pub const EVENTS_EXCHANGE: &str = "coffee.events";

/// Routing key for order-created facts.
pub const ORDER_CREATED_KEY: &str = "order.created";

/// Stock ledger consumer queue. Names are stable across restarts;
/// durability depends on stable naming.
pub const INVENTORY_QUEUE: &str = "inventory.order.created";

/// Fulfillment (kitchen) consumer queue.
pub const KITCHEN_QUEUE: &str = "kitchen.order.created";

/// Analytics consumer queue.
pub const ANALYTICS_QUEUE: &str = "analytics.order.created";
