//! Stock levels and the movement audit trail.

use chrono::{DateTime, Utc};
use common::{IngredientId, OrderId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// On-hand quantity for one ingredient, in that ingredient's base unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    pub ingredient_id: IngredientId,
    pub name: String,
    /// Never negative; deductions that would cross zero are skipped.
    pub quantity: i64,
    pub reorder_threshold: i64,
    pub updated_at: DateTime<Utc>,
}

impl StockItem {
    /// True when on-hand quantity has fallen to the reorder threshold.
    pub fn needs_reorder(&self) -> bool {
        self.quantity <= self.reorder_threshold
    }
}

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    In,
    Out,
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovementKind::In => write!(f, "IN"),
            MovementKind::Out => write!(f, "OUT"),
        }
    }
}

impl std::str::FromStr for MovementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(MovementKind::In),
            "OUT" => Ok(MovementKind::Out),
            other => Err(format!("unknown movement kind: {other}")),
        }
    }
}

/// One row of the append-only movement ledger.
///
/// A movement is written only for a deduction that actually happened;
/// skipped demand leaves no row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryMovement {
    pub movement_id: Uuid,
    pub ingredient_id: IngredientId,
    /// Magnitude of the movement, always positive; `kind` carries direction.
    pub quantity: i64,
    pub kind: MovementKind,
    /// The order that caused this movement, when there is one.
    pub order_id: Option<OrderId>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn movement_kind_wire_values() {
        assert_eq!(serde_json::to_string(&MovementKind::Out).unwrap(), "\"OUT\"");
        assert_eq!(MovementKind::from_str("IN").unwrap(), MovementKind::In);
        assert!(MovementKind::from_str("SIDEWAYS").is_err());
    }

    #[test]
    fn reorder_threshold_is_inclusive() {
        let item = StockItem {
            ingredient_id: IngredientId::new(),
            name: "milk".into(),
            quantity: 10,
            reorder_threshold: 10,
            updated_at: Utc::now(),
        };
        assert!(item.needs_reorder());
    }
}
