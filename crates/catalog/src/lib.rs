//! Catalog resolver client.
//!
//! The menu/recipe catalog is an external collaborator; order intake talks
//! to it through the [`CatalogResolver`] contract: one price lookup and one
//! recipe lookup per distinct line item, each with a bounded timeout.
//! Failures split into NotFound (unknown or inactive item, not retryable)
//! and Unavailable (catalog unreachable, retryable by the caller).

pub mod error;
pub mod http;
pub mod memory;
pub mod resolver;

pub use error::{CatalogError, Result};
pub use http::HttpCatalogResolver;
pub use memory::InMemoryCatalog;
pub use resolver::{CatalogResolver, RecipeLine, ResolvedItem};
