use async_trait::async_trait;

use crate::model::AnalyticsRecord;
use crate::Result;

/// Append-only storage for raw event records.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Appends one record.
    async fn append(&self, record: &AnalyticsRecord) -> Result<()>;

    /// All records, oldest first.
    async fn list(&self) -> Result<Vec<AnalyticsRecord>>;

    /// Number of stored records.
    async fn count(&self) -> Result<i64>;
}
