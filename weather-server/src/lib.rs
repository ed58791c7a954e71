//! HTTP front end for the weather aggregator.
//!
//! Routes:
//! - `GET /v1/weather/{city}?backend=a,b`
//! - `OPTIONS /v1/weather`
//! - `GET /v1/backends`
//! - `GET /metrics`

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use weather_core::Aggregator;

pub use router::create_router;
pub use state::AppState;

/// Serve the API on `addr` until Ctrl-C, then drain in-flight requests.
///
/// Installs the process-wide Prometheus recorder, so it can only be called
/// once per process.
pub async fn run_server(addr: SocketAddr, aggregator: Aggregator) -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {e}"))?;
    middleware::describe_metrics();

    let app = create_router(AppState::new(aggregator, handle));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "weather server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("weather server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutting down the server"),
        Err(err) => {
            tracing::error!(error = %err, "unable to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
