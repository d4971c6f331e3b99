//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use inventory::InventoryError;
use kitchen::KitchenError;
use orders::OrderError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Attempted transition on a finished resource.
    Conflict(String),
    /// An upstream dependency is unreachable.
    BadGateway(String),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::BadGateway(msg) => {
                tracing::error!(error = %msg, "upstream dependency unavailable");
                (StatusCode::BAD_GATEWAY, msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match &err {
            OrderError::EmptyOrder | OrderError::InvalidQuantity { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            OrderError::ItemNotFound(_) | OrderError::NotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            OrderError::CatalogUnavailable(_) => ApiError::BadGateway(err.to_string()),
            OrderError::Database(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<KitchenError> for ApiError {
    fn from(err: KitchenError) -> Self {
        match &err {
            KitchenError::NotFound(_) => ApiError::NotFound(err.to_string()),
            KitchenError::AlreadyCompleted(_) => ApiError::Conflict(err.to_string()),
            KitchenError::Database(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<InventoryError> for ApiError {
    fn from(err: InventoryError) -> Self {
        match &err {
            InventoryError::NotFound(_) => ApiError::NotFound(err.to_string()),
            InventoryError::Database(_) => ApiError::Internal(err.to_string()),
        }
    }
}
