//! In-memory analytics store for tests and local development.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::model::AnalyticsRecord;
use crate::store::AnalyticsStore;
use crate::Result;

/// Vec-backed [`AnalyticsStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryAnalyticsStore {
    records: Arc<RwLock<Vec<AnalyticsRecord>>>,
}

impl InMemoryAnalyticsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnalyticsStore for InMemoryAnalyticsStore {
    async fn append(&self, record: &AnalyticsRecord) -> Result<()> {
        self.records.write().unwrap().push(record.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<AnalyticsRecord>> {
        Ok(self.records.read().unwrap().clone())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.records.read().unwrap().len() as i64)
    }
}
