//! Order and order line records.

use chrono::{DateTime, Utc};
use common::{Channel, CustomerId, MenuItemId, Money, OrderId, OrderStatus};
use serde::{Deserialize, Serialize};

/// Upper bound on a single line's quantity.
pub const MAX_LINE_QUANTITY: u32 = 50;

/// A persisted order.
///
/// Created together with its lines as one atomic unit and immutable
/// thereafter. Invariant: `total_price` equals the sum of each line's
/// `quantity * unit_price` in exact fixed-point arithmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub customer_id: Option<CustomerId>,
    pub channel: Channel,
    pub status: OrderStatus,
    pub total_price: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Recomputes the total from the lines, for invariant checks.
    pub fn computed_total(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, line| acc + line.total())
    }
}

/// One line of an order.
///
/// The unit price is captured at order creation, decoupling the order from
/// future catalog price changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderLine {
    /// Returns `quantity * unit_price` for this line.
    pub fn total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// An incoming cart, not yet priced or persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub channel: Channel,
    pub items: Vec<CartLine>,
}

/// One requested line of a cart; the price is resolved at intake.
#[derive(Debug, Clone, Deserialize)]
pub struct CartLine {
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_total_is_exact() {
        let line = OrderLine {
            menu_item_id: MenuItemId::new(),
            quantity: 3,
            unit_price: Money::from_cents(350),
        };
        assert_eq!(line.total(), Money::from_cents(1050));
    }

    #[test]
    fn computed_total_sums_lines() {
        let order = Order {
            order_id: OrderId::new(),
            customer_id: None,
            channel: Channel::Web,
            status: OrderStatus::Paid,
            total_price: Money::from_cents(1200),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            lines: vec![
                OrderLine {
                    menu_item_id: MenuItemId::new(),
                    quantity: 2,
                    unit_price: Money::from_cents(350),
                },
                OrderLine {
                    menu_item_id: MenuItemId::new(),
                    quantity: 1,
                    unit_price: Money::from_cents(500),
                },
            ],
        };
        assert_eq!(order.computed_total(), order.total_price);
    }
}
