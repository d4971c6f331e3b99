//! PostgreSQL-backed analytics store.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::model::AnalyticsRecord;
use crate::store::AnalyticsStore;
use crate::Result;

/// [`AnalyticsStore`] backed by the `analytics_records` table.
#[derive(Debug, Clone)]
pub struct PostgresAnalyticsStore {
    pool: PgPool,
}

impl PostgresAnalyticsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &PgRow) -> Result<AnalyticsRecord> {
        Ok(AnalyticsRecord {
            record_id: row.try_get("record_id")?,
            event_type: row.try_get("event_type")?,
            entity_id: row.try_get("entity_id")?,
            source: row.try_get("source")?,
            payload: row.try_get("payload")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl AnalyticsStore for PostgresAnalyticsStore {
    async fn append(&self, record: &AnalyticsRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO analytics_records
                (record_id, event_type, entity_id, source, payload, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.record_id)
        .bind(&record.event_type)
        .bind(&record.entity_id)
        .bind(&record.source)
        .bind(&record.payload)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<AnalyticsRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT record_id, event_type, entity_id, source, payload, created_at
            FROM analytics_records
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM analytics_records")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }
}
