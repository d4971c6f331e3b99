//! PostgreSQL-backed stock store.

use async_trait::async_trait;
use bus::event::IngredientDemand;
use chrono::{DateTime, Utc};
use common::{IngredientId, OrderId};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::model::{InventoryMovement, MovementKind, StockItem};
use crate::store::{DeductionReport, SkipReason, SkippedDeduction, StockStore};
use crate::{InventoryError, Result};

/// [`StockStore`] backed by the `stock_items` and `inventory_movements`
/// tables. Deductions lock each touched row with `FOR UPDATE` so concurrent
/// orders settle against a consistent level.
#[derive(Debug, Clone)]
pub struct PostgresStockStore {
    pool: PgPool,
}

impl PostgresStockStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_item(row: &PgRow) -> Result<StockItem> {
        let ingredient_id: Uuid = row.try_get("ingredient_id")?;
        Ok(StockItem {
            ingredient_id: IngredientId::from_uuid(ingredient_id),
            name: row.try_get("name")?,
            quantity: row.try_get("quantity")?,
            reorder_threshold: row.try_get("reorder_threshold")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_movement(row: &PgRow) -> Result<InventoryMovement> {
        let movement_id: Uuid = row.try_get("movement_id")?;
        let ingredient_id: Uuid = row.try_get("ingredient_id")?;
        let order_id: Option<Uuid> = row.try_get("order_id")?;
        let kind: String = row.try_get("kind")?;
        let kind: MovementKind = kind
            .parse()
            .map_err(|e: String| InventoryError::Database(sqlx::Error::Decode(e.into())))?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;

        Ok(InventoryMovement {
            movement_id,
            ingredient_id: IngredientId::from_uuid(ingredient_id),
            quantity: row.try_get("quantity")?,
            kind,
            order_id: order_id.map(OrderId::from_uuid),
            created_at,
        })
    }
}

#[async_trait]
impl StockStore for PostgresStockStore {
    async fn apply_order(
        &self,
        order_id: OrderId,
        demand: &[IngredientDemand],
    ) -> Result<DeductionReport> {
        let mut tx = self.pool.begin().await?;
        let mut report = DeductionReport::default();

        for line in demand {
            let row = sqlx::query(
                "SELECT quantity FROM stock_items WHERE ingredient_id = $1 FOR UPDATE",
            )
            .bind(line.ingredient_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?;

            let Some(row) = row else {
                report.skipped.push(SkippedDeduction {
                    ingredient_id: line.ingredient_id,
                    required: line.quantity,
                    reason: SkipReason::UnknownIngredient,
                });
                continue;
            };
            let available: i64 = row.try_get("quantity")?;
            if available < line.quantity {
                report.skipped.push(SkippedDeduction {
                    ingredient_id: line.ingredient_id,
                    required: line.quantity,
                    reason: SkipReason::InsufficientStock { available },
                });
                continue;
            }

            sqlx::query(
                r#"
                UPDATE stock_items
                SET quantity = quantity - $2, updated_at = NOW()
                WHERE ingredient_id = $1
                "#,
            )
            .bind(line.ingredient_id.as_uuid())
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO inventory_movements
                    (movement_id, ingredient_id, quantity, kind, order_id, created_at)
                VALUES ($1, $2, $3, $4, $5, NOW())
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(line.ingredient_id.as_uuid())
            .bind(line.quantity)
            .bind(MovementKind::Out.to_string())
            .bind(order_id.as_uuid())
            .execute(&mut *tx)
            .await?;

            report.deducted += 1;
        }

        tx.commit().await?;
        Ok(report)
    }

    async fn get(&self, ingredient_id: IngredientId) -> Result<Option<StockItem>> {
        let row = sqlx::query(
            r#"
            SELECT ingredient_id, name, quantity, reorder_threshold, updated_at
            FROM stock_items
            WHERE ingredient_id = $1
            "#,
        )
        .bind(ingredient_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_item).transpose()
    }

    async fn list(&self) -> Result<Vec<StockItem>> {
        let rows = sqlx::query(
            r#"
            SELECT ingredient_id, name, quantity, reorder_threshold, updated_at
            FROM stock_items
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_item).collect()
    }

    async fn create(
        &self,
        ingredient_id: IngredientId,
        name: &str,
        quantity: i64,
        reorder_threshold: i64,
    ) -> Result<StockItem> {
        let row = sqlx::query(
            r#"
            INSERT INTO stock_items
                (ingredient_id, name, quantity, reorder_threshold, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING ingredient_id, name, quantity, reorder_threshold, updated_at
            "#,
        )
        .bind(ingredient_id.as_uuid())
        .bind(name)
        .bind(quantity)
        .bind(reorder_threshold)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_item(&row)
    }

    async fn add_quantity(&self, ingredient_id: IngredientId, quantity: i64) -> Result<StockItem> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            UPDATE stock_items
            SET quantity = quantity + $2, updated_at = NOW()
            WHERE ingredient_id = $1
            RETURNING ingredient_id, name, quantity, reorder_threshold, updated_at
            "#,
        )
        .bind(ingredient_id.as_uuid())
        .bind(quantity)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(InventoryError::NotFound(ingredient_id))?;

        sqlx::query(
            r#"
            INSERT INTO inventory_movements
                (movement_id, ingredient_id, quantity, kind, order_id, created_at)
            VALUES ($1, $2, $3, $4, NULL, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(ingredient_id.as_uuid())
        .bind(quantity)
        .bind(MovementKind::In.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Self::row_to_item(&row)
    }

    async fn set_quantity(&self, ingredient_id: IngredientId, quantity: i64) -> Result<StockItem> {
        let row = sqlx::query(
            r#"
            UPDATE stock_items
            SET quantity = $2, updated_at = NOW()
            WHERE ingredient_id = $1
            RETURNING ingredient_id, name, quantity, reorder_threshold, updated_at
            "#,
        )
        .bind(ingredient_id.as_uuid())
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(InventoryError::NotFound(ingredient_id))?;

        Self::row_to_item(&row)
    }

    async fn movements_for_order(&self, order_id: OrderId) -> Result<Vec<InventoryMovement>> {
        let rows = sqlx::query(
            r#"
            SELECT movement_id, ingredient_id, quantity, kind, order_id, created_at
            FROM inventory_movements
            WHERE order_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_movement).collect()
    }
}
