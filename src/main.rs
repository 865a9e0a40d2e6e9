//! ATMT payment service binary.
//!
//! Loads configuration from `ATMT__*` environment variables, connects to
//! PostgreSQL and serves the payment and webhook routes.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use atmt_payments::adapters::http::{payment_router, PaymentAppState};
use atmt_payments::adapters::postgres::{
    PostgresEntitlementRepository, PostgresPaymentLedger, PostgresPaymentSessionRepository,
};
use atmt_payments::config::{AppConfig, ServerConfig};
use atmt_payments::domain::payment::RandomCodeGenerator;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_validated()?;
    init_tracing(&config.server);

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(config.database.url.expose_secret())
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let state = PaymentAppState {
        sessions: Arc::new(PostgresPaymentSessionRepository::new(pool.clone())),
        entitlements: Arc::new(PostgresEntitlementRepository::new(pool.clone())),
        ledger: Arc::new(PostgresPaymentLedger::new(pool)),
        code_generator: Arc::new(RandomCodeGenerator::new()),
        config: Arc::new(config.payment.clone()),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(payment_router())
        .with_state(state)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        price = config.payment.price,
        "ATMT payment service listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// JSON logs in production, human-readable otherwise. `RUST_LOG` wins over
/// the configured filter.
fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    if server.is_production() {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
