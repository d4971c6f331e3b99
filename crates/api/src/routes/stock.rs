//! Stock level read and admin adjustment endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use common::IngredientId;
use inventory::{StockItem, StockStore};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::orders::AppState;

// -- Request/response types --

#[derive(Serialize)]
pub struct StockItemResponse {
    pub ingredient_id: String,
    pub name: String,
    pub quantity: i64,
    pub reorder_threshold: i64,
    pub needs_reorder: bool,
    pub updated_at: String,
}

impl From<StockItem> for StockItemResponse {
    fn from(item: StockItem) -> Self {
        let needs_reorder = item.needs_reorder();
        StockItemResponse {
            ingredient_id: item.ingredient_id.to_string(),
            name: item.name,
            quantity: item.quantity,
            reorder_threshold: item.reorder_threshold,
            needs_reorder,
            updated_at: item.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Deserialize)]
pub struct AdjustQuantityRequest {
    pub quantity: i64,
}

// -- Handlers --

/// GET /stock — list all tracked ingredients.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StockItemResponse>>, ApiError> {
    let items = state.stock.list().await?;
    Ok(Json(items.into_iter().map(StockItemResponse::from).collect()))
}

/// GET /stock/:id — one ingredient's level.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StockItemResponse>, ApiError> {
    let ingredient_id = parse_ingredient_id(&id)?;
    let item = state
        .stock
        .get(ingredient_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Ingredient {id} not found")))?;
    Ok(Json(item.into()))
}

/// POST /stock/:id/add — restock an ingredient (writes an IN movement).
#[tracing::instrument(skip(state, req))]
pub async fn add(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AdjustQuantityRequest>,
) -> Result<Json<StockItemResponse>, ApiError> {
    if req.quantity <= 0 {
        return Err(ApiError::BadRequest(
            "quantity to add must be positive".to_string(),
        ));
    }
    let ingredient_id = parse_ingredient_id(&id)?;
    let item = state.stock.add_quantity(ingredient_id, req.quantity).await?;
    Ok(Json(item.into()))
}

/// POST /stock/:id/set — overwrite an ingredient's level (admin correction).
#[tracing::instrument(skip(state, req))]
pub async fn set(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AdjustQuantityRequest>,
) -> Result<Json<StockItemResponse>, ApiError> {
    if req.quantity < 0 {
        return Err(ApiError::BadRequest(
            "stock level cannot be negative".to_string(),
        ));
    }
    let ingredient_id = parse_ingredient_id(&id)?;
    let item = state.stock.set_quantity(ingredient_id, req.quantity).await?;
    Ok(Json(item.into()))
}

fn parse_ingredient_id(id: &str) -> Result<IngredientId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ingredient id: {e}")))?;
    Ok(IngredientId::from_uuid(uuid))
}
