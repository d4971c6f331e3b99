//! HTTP API server and consumer host for the fulfillment pipeline.
//!
//! Exposes order intake, kitchen operator and stock admin endpoints, with
//! structured logging (tracing) and Prometheus metrics. The same process
//! hosts the three event consumers: stock ledger, kitchen tickets and
//! analytics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use analytics::{AnalyticsConsumer, InMemoryAnalyticsStore};
use axum::routing::{get, post};
use axum::Router;
use bus::memory::InMemoryBroker;
use bus::{EventHandler, ANALYTICS_QUEUE, INVENTORY_QUEUE, KITCHEN_QUEUE, ORDER_CREATED_KEY};
use catalog::InMemoryCatalog;
use inventory::{InMemoryStockStore, StockLedgerConsumer};
use kitchen::{InMemoryTicketStore, KitchenService, TicketConsumer};
use metrics_exporter_prometheus::PrometheusHandle;
use orders::{InMemoryOrderStore, OrderIntake};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create))
        .route("/orders/{id}", get(routes::orders::get))
        .route("/kitchen/tickets", get(routes::kitchen::list))
        .route("/kitchen/tickets/{order_id}", get(routes::kitchen::get))
        .route(
            "/kitchen/tickets/{order_id}/start",
            post(routes::kitchen::start),
        )
        .route(
            "/kitchen/tickets/{order_id}/complete",
            post(routes::kitchen::complete),
        )
        .route("/stock", get(routes::stock::list))
        .route("/stock/{id}", get(routes::stock::get))
        .route("/stock/{id}/add", post(routes::stock::add))
        .route("/stock/{id}/set", post(routes::stock::set))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// In-memory backends for single-process deployments and tests.
///
/// The broker already has the three consumer queues declared; consumers are
/// not running until handed to [`InMemoryBroker::run`] or drained with
/// [`drain_events`](Self::drain_events).
#[derive(Clone)]
pub struct DefaultBackends {
    pub broker: InMemoryBroker,
    pub catalog: InMemoryCatalog,
    pub orders: InMemoryOrderStore,
    pub tickets: InMemoryTicketStore,
    pub stock: InMemoryStockStore,
    pub analytics: InMemoryAnalyticsStore,
}

impl DefaultBackends {
    /// The consumer for each queue, freshly constructed over the shared
    /// backends.
    pub fn consumers(&self) -> Vec<(&'static str, Arc<dyn EventHandler>)> {
        vec![
            (
                INVENTORY_QUEUE,
                Arc::new(StockLedgerConsumer::new(Arc::new(self.stock.clone()))),
            ),
            (
                KITCHEN_QUEUE,
                Arc::new(TicketConsumer::new(Arc::new(self.tickets.clone()))),
            ),
            (
                ANALYTICS_QUEUE,
                Arc::new(AnalyticsConsumer::new(Arc::new(self.analytics.clone()))),
            ),
        ]
    }

    /// Delivers every queued message once on each consumer queue.
    pub async fn drain_events(&self) -> bus::Result<()> {
        for (queue, handler) in self.consumers() {
            self.broker.deliver_pending(queue, handler.as_ref()).await?;
        }
        Ok(())
    }
}

/// Creates the default application state over in-memory backends.
pub fn create_default_state() -> (Arc<AppState>, DefaultBackends) {
    let broker = InMemoryBroker::new();
    broker.declare_queue(INVENTORY_QUEUE, ORDER_CREATED_KEY);
    broker.declare_queue(KITCHEN_QUEUE, ORDER_CREATED_KEY);
    broker.declare_queue(ANALYTICS_QUEUE, ORDER_CREATED_KEY);

    let backends = DefaultBackends {
        broker: broker.clone(),
        catalog: InMemoryCatalog::new(),
        orders: InMemoryOrderStore::new(),
        tickets: InMemoryTicketStore::new(),
        stock: InMemoryStockStore::new(),
        analytics: InMemoryAnalyticsStore::new(),
    };

    let intake = OrderIntake::new(
        Arc::new(backends.catalog.clone()),
        Arc::new(backends.orders.clone()),
        Arc::new(broker),
    );
    let kitchen = KitchenService::new(Arc::new(backends.tickets.clone()));

    let state = Arc::new(AppState {
        intake,
        kitchen,
        stock: Arc::new(backends.stock.clone()),
    });

    (state, backends)
}
