//! Order intake workflow.

use std::collections::BTreeMap;
use std::sync::Arc;

use bus::event::{Event, IngredientDemand, LineSnapshot, OrderCreatedEvent};
use bus::{EventPublisher, ORDER_CREATED_KEY};
use catalog::CatalogResolver;
use chrono::Utc;
use common::{IngredientId, Money, OrderId, OrderStatus};

use crate::model::{NewOrder, Order, OrderLine, MAX_LINE_QUANTITY};
use crate::store::OrderStore;
use crate::{OrderError, Result};

/// Validates, prices, persists and announces new orders.
///
/// The catalog is consulted before anything is written; any resolution
/// failure aborts the whole order with no side effects. The event is
/// published only after the local commit, so a broker outage can leave a
/// persisted order that downstream consumers never see. That gap is logged
/// and counted rather than rolled back.
pub struct OrderIntake {
    catalog: Arc<dyn CatalogResolver>,
    store: Arc<dyn OrderStore>,
    publisher: Arc<dyn EventPublisher>,
}

impl OrderIntake {
    pub fn new(
        catalog: Arc<dyn CatalogResolver>,
        store: Arc<dyn OrderStore>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            catalog,
            store,
            publisher,
        }
    }

    /// Creates an order from an incoming cart.
    #[tracing::instrument(skip(self, new_order), fields(items = new_order.items.len()))]
    pub async fn create_order(&self, new_order: NewOrder) -> Result<Order> {
        if new_order.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        for item in &new_order.items {
            if item.quantity == 0 || item.quantity > MAX_LINE_QUANTITY {
                return Err(OrderError::InvalidQuantity {
                    menu_item_id: item.menu_item_id,
                    quantity: item.quantity,
                });
            }
        }

        // Resolve every line before touching storage.
        let mut lines = Vec::with_capacity(new_order.items.len());
        let mut total = Money::zero();
        let mut demand: BTreeMap<IngredientId, i64> = BTreeMap::new();

        for item in &new_order.items {
            let resolved = self.catalog.resolve_item(item.menu_item_id).await?;
            let recipe = self.catalog.resolve_recipe(item.menu_item_id).await?;

            total += resolved.unit_price.multiply(item.quantity);
            for recipe_line in &recipe {
                *demand.entry(recipe_line.ingredient_id).or_insert(0) +=
                    recipe_line.quantity_per_unit * i64::from(item.quantity);
            }

            lines.push(OrderLine {
                menu_item_id: item.menu_item_id,
                quantity: item.quantity,
                unit_price: resolved.unit_price,
            });
        }

        let now = Utc::now();
        let order = Order {
            order_id: OrderId::new(),
            customer_id: new_order.customer_id,
            channel: new_order.channel,
            status: OrderStatus::Paid,
            total_price: total,
            created_at: now,
            updated_at: now,
            lines,
        };

        self.store.insert(&order).await?;
        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(
            order_id = %order.order_id,
            total_cents = order.total_price.cents(),
            "order created"
        );

        let event = Event::OrderCreated(OrderCreatedEvent {
            order_id: order.order_id,
            customer_id: order.customer_id,
            channel: order.channel,
            status: order.status,
            total_price: order.total_price,
            items: order
                .lines
                .iter()
                .map(|line| LineSnapshot {
                    menu_item_id: line.menu_item_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                })
                .collect(),
            ingredients: demand
                .into_iter()
                .map(|(ingredient_id, quantity)| IngredientDemand {
                    ingredient_id,
                    quantity,
                })
                .collect(),
        });

        // The order is already committed; a failed publish is an accepted
        // inconsistency window, surfaced through logs and metrics.
        if let Err(err) = self.publisher.publish(ORDER_CREATED_KEY, &event).await {
            metrics::counter!("orders_publish_failures_total").increment(1);
            tracing::error!(order_id = %order.order_id, error = %err, "failed to publish OrderCreated");
        }

        Ok(order)
    }

    /// Fetches an order by id.
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        self.store
            .get(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))
    }
}
