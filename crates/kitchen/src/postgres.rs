//! PostgreSQL-backed ticket store. Line snapshots are stored as jsonb.

use async_trait::async_trait;
use bus::event::LineSnapshot;
use chrono::{DateTime, Utc};
use common::OrderId;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::model::{KitchenTicket, TicketId, TicketStatus};
use crate::store::TicketStore;
use crate::{KitchenError, Result};

/// [`TicketStore`] backed by the `kitchen_tickets` table.
#[derive(Debug, Clone)]
pub struct PostgresTicketStore {
    pool: PgPool,
}

impl PostgresTicketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_ticket(row: &PgRow) -> Result<KitchenTicket> {
        let ticket_id: Uuid = row.try_get("ticket_id")?;
        let order_id: Uuid = row.try_get("order_id")?;
        let status: String = row.try_get("status")?;
        let status: TicketStatus = status
            .parse()
            .map_err(|e: String| KitchenError::Database(sqlx::Error::Decode(e.into())))?;
        let items: serde_json::Value = row.try_get("items")?;
        let items: Vec<LineSnapshot> = serde_json::from_value(items)
            .map_err(|e| KitchenError::Database(sqlx::Error::Decode(Box::new(e))))?;
        let started_at: Option<DateTime<Utc>> = row.try_get("started_at")?;
        let completed_at: Option<DateTime<Utc>> = row.try_get("completed_at")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        Ok(KitchenTicket {
            ticket_id: TicketId::from_uuid(ticket_id),
            order_id: OrderId::from_uuid(order_id),
            status,
            items,
            started_at,
            completed_at,
            created_at,
        })
    }
}

#[async_trait]
impl TicketStore for PostgresTicketStore {
    async fn insert(&self, ticket: &KitchenTicket) -> Result<()> {
        let items = serde_json::to_value(&ticket.items)
            .map_err(|e| KitchenError::Database(sqlx::Error::Encode(Box::new(e))))?;

        sqlx::query(
            r#"
            INSERT INTO kitchen_tickets
                (ticket_id, order_id, status, items, started_at, completed_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(ticket.ticket_id.as_uuid())
        .bind(ticket.order_id.as_uuid())
        .bind(ticket.status.to_string())
        .bind(items)
        .bind(ticket.started_at)
        .bind(ticket.completed_at)
        .bind(ticket.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_order(&self, order_id: OrderId) -> Result<Option<KitchenTicket>> {
        let row = sqlx::query(
            r#"
            SELECT ticket_id, order_id, status, items, started_at, completed_at, created_at
            FROM kitchen_tickets
            WHERE order_id = $1
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_ticket).transpose()
    }

    async fn update(&self, ticket: &KitchenTicket) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE kitchen_tickets
            SET status = $2, started_at = $3, completed_at = $4
            WHERE ticket_id = $1
            "#,
        )
        .bind(ticket.ticket_id.as_uuid())
        .bind(ticket.status.to_string())
        .bind(ticket.started_at)
        .bind(ticket.completed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_by_status(&self, statuses: &[TicketStatus]) -> Result<Vec<KitchenTicket>> {
        let statuses: Vec<String> = statuses.iter().map(ToString::to_string).collect();
        let rows = sqlx::query(
            r#"
            SELECT ticket_id, order_id, status, items, started_at, completed_at, created_at
            FROM kitchen_tickets
            WHERE status = ANY($1)
            ORDER BY created_at
            "#,
        )
        .bind(&statuses)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_ticket).collect()
    }

    async fn tickets_for_order(&self, order_id: OrderId) -> Result<Vec<KitchenTicket>> {
        let rows = sqlx::query(
            r#"
            SELECT ticket_id, order_id, status, items, started_at, completed_at, created_at
            FROM kitchen_tickets
            WHERE order_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_ticket).collect()
    }
}
