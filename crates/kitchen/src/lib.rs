//! Fulfillment queue.
//!
//! Every OrderCreated fact becomes a kitchen ticket in NEW. Operators move
//! tickets forward through a monotonic lifecycle (NEW, IN_PROGRESS, DONE);
//! DONE is terminal. Completing a ticket straight from NEW implies the
//! start, stamping both timestamps. A redelivered event creates a second
//! ticket for the same order; duplicates are left for the operator to spot.

pub mod consumer;
pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod service;
pub mod store;

pub use consumer::TicketConsumer;
pub use error::{KitchenError, Result};
pub use memory::InMemoryTicketStore;
pub use model::{KitchenTicket, TicketId, TicketStatus};
pub use postgres::PostgresTicketStore;
pub use service::KitchenService;
pub use store::TicketStore;
