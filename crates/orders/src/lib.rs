//! Order intake service.
//!
//! The workflow from "a customer submits a cart" to "an OrderCreated fact
//! is on the bus": validate the cart, resolve price and recipe for every
//! line against the catalog, persist the order with its lines as one atomic
//! unit, then publish a single fan-out event carrying line snapshots and
//! the pre-summed ingredient demand aggregate. Publish happens strictly
//! after the local commit; there is no two-phase commit with the broker.

pub mod error;
pub mod intake;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod store;

pub use error::{OrderError, Result};
pub use intake::OrderIntake;
pub use memory::InMemoryOrderStore;
pub use model::{CartLine, NewOrder, Order, OrderLine, MAX_LINE_QUANTITY};
pub use postgres::PostgresOrderStore;
pub use store::OrderStore;
