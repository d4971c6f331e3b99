//! Shared types for the order-fulfillment platform.
//!
//! Every cross-service reference (order, customer, menu item, ingredient) is
//! an opaque UUID newtype with no foreign-key enforcement across service
//! boundaries. Prices are fixed-point [`Money`] amounts in cents.

pub mod ids;
pub mod money;
pub mod types;

pub use ids::{CustomerId, IngredientId, MenuItemId, OrderId};
pub use money::Money;
pub use types::{Channel, OrderStatus};
