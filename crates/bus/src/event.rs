//! Wire events published on the bus.

use common::{Channel, CustomerId, IngredientId, MenuItemId, Money, OrderId, OrderStatus};
use serde::{Deserialize, Serialize};

/// A business fact on the wire.
///
/// Tagged variant with a fixed schema per event type; consumers validate
/// the payload at the boundary by deserializing into this enum rather than
/// poking at an open map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum Event {
    /// A new order was persisted by order intake.
    OrderCreated(OrderCreatedEvent),
}

impl Event {
    /// Returns the wire tag of this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::OrderCreated(_) => "OrderCreated",
        }
    }

    /// Returns the id of the entity this event refers to.
    pub fn entity_id(&self) -> OrderId {
        match self {
            Event::OrderCreated(e) => e.order_id,
        }
    }
}

/// Fact describing a successfully created order.
///
/// Published exactly once per order, after the local commit. Carries full
/// line snapshots plus the pre-summed ingredient demand aggregate so that
/// no consumer has to re-resolve recipes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub order_id: OrderId,
    pub customer_id: Option<CustomerId>,
    pub channel: Channel,
    pub status: OrderStatus,
    /// Total price in cents, exact fixed-point.
    pub total_price: Money,
    /// Snapshot of every order line at creation time.
    pub items: Vec<LineSnapshot>,
    /// Total required quantity per ingredient, summed across all lines.
    pub ingredients: Vec<IngredientDemand>,
}

/// One ordered line as captured at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSnapshot {
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
    /// Unit price in cents at order time; later catalog edits do not apply.
    pub unit_price: Money,
}

/// Aggregated demand for one ingredient across a whole order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientDemand {
    pub ingredient_id: IngredientId,
    pub quantity: i64,
}
