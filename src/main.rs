use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use mdx_core::{BatchService, PgMeasurementStore, ServiceConfig};

/// Main entry point for the Liaison MDX intake service
///
/// Resolves configuration, opens the connection pool, and serves the REST API until Ctrl-C or
/// SIGTERM. The pool is closed after the server has drained.
///
/// # Environment Variables
/// - `MDX_REST_ADDR`: REST server address (default: "0.0.0.0:$PORT")
/// - `PORT`: REST port when `MDX_REST_ADDR` is unset (default: 3005)
/// - `DATABASE_URL`: PostgreSQL connection URL (required)
/// - `MDX_TABLE`: target table (default: "liaison_mdx")
/// - `DB_MAX_CONNECTIONS`, `DB_MIN_CONNECTIONS`, `DB_ACQUIRE_TIMEOUT_SECS`, `DB_IDLE_TIMEOUT_SECS`:
///   pool bounds
/// - `MDX_ENV`: "development" exposes error detail in 500 responses (default: "production")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - configuration is missing or invalid,
/// - the store cannot be reached at startup, or
/// - the server address cannot be bound or the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mdx_run=info".parse()?)
                .add_directive("mdx_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = ServiceConfig::from_env()?;
    tracing::info!("++ Starting Liaison MDX REST on {}", cfg.rest_addr);
    tracing::info!("++ Store: {:?}", cfg.store);
    tracing::info!("++ Environment: {:?}", cfg.environment);

    let store = Arc::new(PgMeasurementStore::connect(&cfg.store).await?);
    tracing::info!("++ Connected to store, writing to table {}", store.table());

    let state = AppState::new(BatchService::new(store.clone()), cfg.environment);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- Shutting down, closing store connections");
    store.close().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
