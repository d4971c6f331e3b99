//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency and run
//! against the real schema from migrations/. Records are keyed by fresh
//! UUIDs, so the tests can share one database without clearing it.
//! A Docker daemon must be available. Run with:
//!
//! ```bash
//! cargo test -p analytics --test postgres_integration
//! ```

use std::sync::Arc;

use analytics::{AnalyticsRecord, AnalyticsStore, PostgresAnalyticsStore, SOURCE_TAG};
use chrono::Utc;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            // Run migrations using raw_sql to execute multiple statements
            sqlx::raw_sql(include_str!("../../../migrations/0001_init.sql"))
                .execute(&temp_pool)
                .await
                .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a store with its own pool
async fn get_test_store() -> PostgresAnalyticsStore {
    let info = get_container_info().await;

    // Create a fresh pool for each test to avoid connection issues
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    PostgresAnalyticsStore::new(pool)
}

fn record_for(entity_id: &str) -> AnalyticsRecord {
    AnalyticsRecord {
        record_id: Uuid::new_v4(),
        event_type: "OrderCreated".to_string(),
        entity_id: entity_id.to_string(),
        source: SOURCE_TAG.to_string(),
        payload: serde_json::json!({
            "event_type": "OrderCreated",
            "total_price": 1200,
            "items": [{ "quantity": 2, "unit_price": 350 }],
        }),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn append_and_list_roundtrips_jsonb_payload() {
    let store = get_test_store().await;
    let entity = Uuid::new_v4().to_string();
    let record = record_for(&entity);

    store.append(&record).await.unwrap();

    let listed = store.list().await.unwrap();
    let found = listed
        .iter()
        .find(|r| r.record_id == record.record_id)
        .unwrap();
    assert_eq!(found.event_type, "OrderCreated");
    assert_eq!(found.entity_id, entity);
    assert_eq!(found.source, SOURCE_TAG);
    assert_eq!(found.payload, record.payload);
}

#[tokio::test]
async fn duplicate_deliveries_append_separate_rows() {
    let store = get_test_store().await;
    let entity = Uuid::new_v4().to_string();

    store.append(&record_for(&entity)).await.unwrap();
    store.append(&record_for(&entity)).await.unwrap();

    let listed = store.list().await.unwrap();
    let mine: Vec<_> = listed.iter().filter(|r| r.entity_id == entity).collect();
    assert_eq!(mine.len(), 2);
    assert_ne!(mine[0].record_id, mine[1].record_id);

    assert!(store.count().await.unwrap() >= 2);
}
