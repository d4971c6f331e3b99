//! Kitchen operator endpoints.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use kitchen::{KitchenTicket, TicketStatus};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::orders::{parse_order_id, AppState};

// -- Response types --

#[derive(Serialize)]
pub struct TicketResponse {
    pub ticket_id: String,
    pub order_id: String,
    pub status: String,
    pub items: Vec<TicketLineResponse>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct TicketLineResponse {
    pub menu_item_id: String,
    pub quantity: u32,
}

impl From<KitchenTicket> for TicketResponse {
    fn from(ticket: KitchenTicket) -> Self {
        TicketResponse {
            ticket_id: ticket.ticket_id.to_string(),
            order_id: ticket.order_id.to_string(),
            status: ticket.status.to_string(),
            items: ticket
                .items
                .into_iter()
                .map(|line| TicketLineResponse {
                    menu_item_id: line.menu_item_id.to_string(),
                    quantity: line.quantity,
                })
                .collect(),
            started_at: ticket.started_at.map(|t| t.to_rfc3339()),
            completed_at: ticket.completed_at.map(|t| t.to_rfc3339()),
            created_at: ticket.created_at.to_rfc3339(),
        }
    }
}

#[derive(Deserialize)]
pub struct ListTicketsQuery {
    /// Comma-separated statuses; defaults to the open board (NEW,IN_PROGRESS).
    pub status: Option<String>,
}

// -- Handlers --

/// GET /kitchen/tickets — list tickets, oldest first.
#[tracing::instrument(skip(state, query))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListTicketsQuery>,
) -> Result<Json<Vec<TicketResponse>>, ApiError> {
    let statuses = parse_statuses(query.status.as_deref())?;
    let tickets = state.kitchen.list_tickets(&statuses).await?;
    Ok(Json(tickets.into_iter().map(TicketResponse::from).collect()))
}

/// GET /kitchen/tickets/:order_id — the oldest ticket for an order.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Json<TicketResponse>, ApiError> {
    let order_id = parse_order_id(&order_id)?;
    let ticket = state.kitchen.get_ticket(order_id).await?;
    Ok(Json(ticket.into()))
}

/// POST /kitchen/tickets/:order_id/start — mark the ticket IN_PROGRESS.
#[tracing::instrument(skip(state))]
pub async fn start(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Json<TicketResponse>, ApiError> {
    let order_id = parse_order_id(&order_id)?;
    let ticket = state.kitchen.start_ticket(order_id).await?;
    Ok(Json(ticket.into()))
}

/// POST /kitchen/tickets/:order_id/complete — mark the ticket DONE.
#[tracing::instrument(skip(state))]
pub async fn complete(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Json<TicketResponse>, ApiError> {
    let order_id = parse_order_id(&order_id)?;
    let ticket = state.kitchen.complete_ticket(order_id).await?;
    Ok(Json(ticket.into()))
}

fn parse_statuses(raw: Option<&str>) -> Result<Vec<TicketStatus>, ApiError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            TicketStatus::from_str(s)
                .map_err(|e| ApiError::BadRequest(format!("Invalid status filter: {e}")))
        })
        .collect()
}
