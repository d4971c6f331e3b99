//! Raw event records for offline reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Source tag for records that arrived over the event bus.
pub const SOURCE_TAG: &str = "bus";

/// One appended business event, stored as it arrived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsRecord {
    pub record_id: Uuid,
    /// Wire tag of the event, e.g. `OrderCreated`.
    pub event_type: String,
    /// The business entity the event is about, as an opaque string.
    pub entity_id: String,
    pub source: String,
    /// Full event payload, untouched.
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
