//! Consumer that appends every delivered event to the analytics feed.

use std::sync::Arc;

use async_trait::async_trait;
use bus::error::HandlerError;
use bus::event::Event;
use bus::EventHandler;
use chrono::Utc;
use uuid::Uuid;

use crate::model::{AnalyticsRecord, SOURCE_TAG};
use crate::store::AnalyticsStore;

/// Appends events verbatim. Duplicates from redelivery are appended too.
pub struct AnalyticsConsumer {
    store: Arc<dyn AnalyticsStore>,
}

impl AnalyticsConsumer {
    pub fn new(store: Arc<dyn AnalyticsStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EventHandler for AnalyticsConsumer {
    fn name(&self) -> &'static str {
        "analytics"
    }

    #[tracing::instrument(skip(self, event), fields(event_type = event.event_type()))]
    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        let payload = serde_json::to_value(event).map_err(HandlerError::new)?;

        let record = AnalyticsRecord {
            record_id: Uuid::new_v4(),
            event_type: event.event_type().to_string(),
            entity_id: event.entity_id().to_string(),
            source: SOURCE_TAG.to_string(),
            payload,
            created_at: Utc::now(),
        };
        self.store.append(&record).await.map_err(HandlerError::new)?;

        metrics::counter!("analytics_records_appended_total").increment(1);
        Ok(())
    }
}
