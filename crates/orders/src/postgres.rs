//! PostgreSQL-backed order store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{Channel, CustomerId, MenuItemId, Money, OrderId, OrderStatus};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::model::{Order, OrderLine};
use crate::store::OrderStore;
use crate::{OrderError, Result};

/// [`OrderStore`] backed by the `orders` and `order_lines` tables.
#[derive(Debug, Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_order(row: &PgRow) -> Result<Order> {
        let order_id: Uuid = row.try_get("order_id")?;
        let customer_id: Option<Uuid> = row.try_get("customer_id")?;
        let channel: String = row.try_get("channel")?;
        let status: String = row.try_get("status")?;
        let total_price: i64 = row.try_get("total_price_cents")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

        let channel: Channel = channel
            .parse()
            .map_err(|e: String| OrderError::Database(sqlx::Error::Decode(e.into())))?;
        let status: OrderStatus = status
            .parse()
            .map_err(|e: String| OrderError::Database(sqlx::Error::Decode(e.into())))?;

        Ok(Order {
            order_id: OrderId::from_uuid(order_id),
            customer_id: customer_id.map(CustomerId::from_uuid),
            channel,
            status,
            total_price: Money::from_cents(total_price),
            created_at,
            updated_at,
            lines: Vec::new(),
        })
    }

    fn row_to_line(row: &PgRow) -> Result<OrderLine> {
        let menu_item_id: Uuid = row.try_get("menu_item_id")?;
        let quantity: i32 = row.try_get("quantity")?;
        let unit_price: i64 = row.try_get("unit_price_cents")?;

        Ok(OrderLine {
            menu_item_id: MenuItemId::from_uuid(menu_item_id),
            quantity: quantity as u32,
            unit_price: Money::from_cents(unit_price),
        })
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders
                (order_id, customer_id, channel, status, total_price_cents,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(order.order_id.as_uuid())
        .bind(order.customer_id.map(|id| id.as_uuid()))
        .bind(order.channel.to_string())
        .bind(order.status.to_string())
        .bind(order.total_price.cents())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for (position, line) in order.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_lines
                    (order_id, position, menu_item_id, quantity, unit_price_cents)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order.order_id.as_uuid())
            .bind(position as i32)
            .bind(line.menu_item_id.as_uuid())
            .bind(line.quantity as i32)
            .bind(line.unit_price.cents())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, order_id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT order_id, customer_id, channel, status, total_price_cents,
                   created_at, updated_at
            FROM orders
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut order = Self::row_to_order(&row)?;

        let line_rows = sqlx::query(
            r#"
            SELECT menu_item_id, quantity, unit_price_cents
            FROM order_lines
            WHERE order_id = $1
            ORDER BY position
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        order.lines = line_rows
            .iter()
            .map(Self::row_to_line)
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(order))
    }
}
