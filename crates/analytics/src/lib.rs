//! Analytics feed.
//!
//! Appends every delivered business event verbatim to an analytics table
//! for offline reporting. No aggregation, no dedup: a redelivered event is
//! appended again, and downstream reporting is expected to cope.

pub mod consumer;
pub mod error;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod store;

pub use consumer::AnalyticsConsumer;
pub use error::{AnalyticsError, Result};
pub use memory::InMemoryAnalyticsStore;
pub use model::{AnalyticsRecord, SOURCE_TAG};
pub use postgres::PostgresAnalyticsStore;
pub use store::AnalyticsStore;
