//! Stock ledger.
//!
//! Consumes OrderCreated facts and deducts the pre-summed ingredient demand
//! from on-hand stock. Each ingredient is settled independently: a shortfall
//! or an unknown ingredient skips that one deduction with a warning and
//! never drives a level negative, while the rest of the demand still lands.
//! Every actual deduction leaves an OUT movement referencing the order, and
//! all effects of one event commit in one transaction.
//!
//! Handlers are not idempotent: a redelivered event deducts again. See the
//! project design notes for the accepted gap and the planned dedup key.

pub mod consumer;
pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod store;

pub use consumer::StockLedgerConsumer;
pub use error::{InventoryError, Result};
pub use memory::InMemoryStockStore;
pub use model::{InventoryMovement, MovementKind, StockItem};
pub use postgres::PostgresStockStore;
pub use store::{DeductionReport, SkipReason, SkippedDeduction, StockStore};
