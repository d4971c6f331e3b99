//! OrderCreated consumer that settles ingredient demand.

use std::sync::Arc;

use async_trait::async_trait;
use bus::error::HandlerError;
use bus::event::Event;
use bus::EventHandler;

use crate::store::{SkipReason, StockStore};

/// Applies each OrderCreated event's demand aggregate to the stock ledger.
///
/// Not idempotent: a redelivered event deducts again, because there is no
/// processed-event record to check against. Storage failures are surfaced
/// as handler errors so the message is redelivered.
pub struct StockLedgerConsumer {
    store: Arc<dyn StockStore>,
}

impl StockLedgerConsumer {
    pub fn new(store: Arc<dyn StockStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EventHandler for StockLedgerConsumer {
    fn name(&self) -> &'static str {
        "stock-ledger"
    }

    #[tracing::instrument(skip(self, event), fields(event_type = event.event_type()))]
    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        let Event::OrderCreated(order) = event;

        if order.ingredients.is_empty() {
            return Ok(());
        }

        let report = self
            .store
            .apply_order(order.order_id, &order.ingredients)
            .await
            .map_err(HandlerError::new)?;

        for skip in &report.skipped {
            match skip.reason {
                SkipReason::UnknownIngredient => {
                    tracing::warn!(
                        order_id = %order.order_id,
                        ingredient_id = %skip.ingredient_id,
                        required = skip.required,
                        "demand for untracked ingredient skipped"
                    );
                }
                SkipReason::InsufficientStock { available } => {
                    tracing::warn!(
                        order_id = %order.order_id,
                        ingredient_id = %skip.ingredient_id,
                        required = skip.required,
                        available,
                        "insufficient stock, deduction skipped"
                    );
                }
            }
            metrics::counter!("stock_deductions_skipped_total").increment(1);
        }
        metrics::counter!("stock_deductions_total").increment(report.deducted as u64);

        Ok(())
    }
}
