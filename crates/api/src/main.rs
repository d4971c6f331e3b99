//! API server entry point.

use std::sync::Arc;

use analytics::{AnalyticsConsumer, PostgresAnalyticsStore};
use api::config::Config;
use api::routes::orders::AppState;
use bus::{AmqpBus, ANALYTICS_QUEUE, INVENTORY_QUEUE, KITCHEN_QUEUE, ORDER_CREATED_KEY};
use catalog::HttpCatalogResolver;
use inventory::{PostgresStockStore, StockLedgerConsumer};
use kitchen::{KitchenService, PostgresTicketStore, TicketConsumer};
use orders::{OrderIntake, PostgresOrderStore};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Wires Postgres storage, the AMQP broker and the HTTP catalog.
async fn create_production_state(
    database_url: &str,
    amqp_url: &str,
    catalog_url: &str,
) -> Arc<AppState> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .expect("failed to connect to Postgres");

    let bus = Arc::new(
        AmqpBus::connect(amqp_url)
            .await
            .expect("failed to connect to AMQP broker"),
    );
    for queue in [INVENTORY_QUEUE, KITCHEN_QUEUE, ANALYTICS_QUEUE] {
        bus.declare_queue(queue, ORDER_CREATED_KEY)
            .await
            .expect("failed to declare consumer queue");
    }

    let stock = Arc::new(PostgresStockStore::new(pool.clone()));
    let tickets = Arc::new(PostgresTicketStore::new(pool.clone()));
    let analytics = Arc::new(PostgresAnalyticsStore::new(pool.clone()));

    let consumers: Vec<(&str, Arc<dyn bus::EventHandler>)> = vec![
        (
            INVENTORY_QUEUE,
            Arc::new(StockLedgerConsumer::new(stock.clone())),
        ),
        (KITCHEN_QUEUE, Arc::new(TicketConsumer::new(tickets.clone()))),
        (ANALYTICS_QUEUE, Arc::new(AnalyticsConsumer::new(analytics))),
    ];
    for (queue, handler) in consumers {
        let bus = bus.clone();
        tokio::spawn(async move {
            if let Err(e) = bus.consume(queue, handler).await {
                tracing::error!(queue, error = %e, "consumer terminated");
            }
        });
    }

    let intake = OrderIntake::new(
        Arc::new(HttpCatalogResolver::new(catalog_url).expect("failed to build catalog client")),
        Arc::new(PostgresOrderStore::new(pool)),
        bus,
    );

    Arc::new(AppState {
        intake,
        kitchen: KitchenService::new(tickets),
        stock,
    })
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Wire storage, broker and catalog
    let state = match (&config.database_url, &config.amqp_url, &config.catalog_url) {
        (Some(db), Some(amqp), Some(catalog)) => {
            tracing::info!("using Postgres storage and AMQP broker");
            create_production_state(db, amqp, catalog).await
        }
        _ => {
            tracing::warn!(
                "DATABASE_URL, AMQP_URL or CATALOG_URL unset, using in-memory backends"
            );
            let (state, backends) = api::create_default_state();
            for (queue, handler) in backends.consumers() {
                let broker = backends.broker.clone();
                tokio::spawn(async move { broker.run(queue, handler).await });
            }
            state
        }
    };

    // 4. Build the application
    let app = api::create_app(state, metrics_handle);

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
