//! Order intake endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use common::OrderId;
use inventory::StockStore;
use kitchen::KitchenService;
use orders::{NewOrder, Order, OrderIntake};
use serde::Serialize;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub intake: OrderIntake,
    pub kitchen: KitchenService,
    pub stock: Arc<dyn StockStore>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub order_id: String,
    pub customer_id: Option<String>,
    pub channel: String,
    pub status: String,
    pub total_price_cents: i64,
    pub created_at: String,
    pub lines: Vec<OrderLineResponse>,
}

#[derive(Serialize)]
pub struct OrderLineResponse {
    pub menu_item_id: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            order_id: order.order_id.to_string(),
            customer_id: order.customer_id.map(|c| c.to_string()),
            channel: order.channel.to_string(),
            status: order.status.to_string(),
            total_price_cents: order.total_price.cents(),
            created_at: order.created_at.to_rfc3339(),
            lines: order
                .lines
                .into_iter()
                .map(|line| OrderLineResponse {
                    menu_item_id: line.menu_item_id.to_string(),
                    quantity: line.quantity,
                    unit_price_cents: line.unit_price.cents(),
                })
                .collect(),
        }
    }
}

// -- Handlers --

/// POST /orders — validate, price and persist a cart, then announce it.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewOrder>,
) -> Result<(axum::http::StatusCode, Json<OrderResponse>), ApiError> {
    let order = state.intake.create_order(req).await?;
    Ok((axum::http::StatusCode::CREATED, Json(order.into())))
}

/// GET /orders/:id — load an order with its lines.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.intake.get_order(order_id).await?;
    Ok(Json(order.into()))
}

pub(crate) fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order id: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}
