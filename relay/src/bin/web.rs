//! Billing Relay web server.
//!
//! This binary provides the single public endpoint PayPal is configured with:
//! - Receives IPN callbacks on /paypal/ipn
//! - Verifies the webhook key
//! - Forwards each notification to its regional billing backend
//! - Relays the backend's response to PayPal

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use billing_relay::web::{health, paypal_ipn, AppState};
use billing_relay::{Config, RegionDirectory};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("relay_starting");

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        webhook_key_configured = config.webhook_key.is_some(),
        regions = config.region_endpoints.len(),
        default_region = %config.default_region,
        "config_loaded"
    );

    // Build the region directory once; it is read-only from here on
    let directory = RegionDirectory::new(config.region_endpoints.clone(), &config.default_region);
    if !directory.has_default_region() {
        warn!(
            default_region = %config.default_region,
            "default_region_not_configured"
        );
    }

    // Install the Prometheus recorder for the per-region request counter
    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install metrics recorder")?;

    // Shared outbound HTTP client
    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .build()
        .context("Failed to build HTTP client")?;

    let port = config.port;
    let state = AppState::new(config, directory, http);

    // Build the router
    let app = Router::new()
        .route("/health", get(health))
        .route("/paypal/ipn", post(paypal_ipn))
        .route(
            "/metrics",
            get(move || std::future::ready(prometheus.render())),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "relay_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("relay_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("relay_shutting_down");
}
