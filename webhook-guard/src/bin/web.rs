//! SwapGuard Web Server - Fordefi webhook receiver.
//!
//! This binary:
//! - Receives Fordefi transaction webhooks
//! - Verifies their ECDSA signatures
//! - Fetches the transaction and applies the redirection policy
//! - Aborts transactions that forward swap proceeds elsewhere

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use swapguard::{
    build_router, AppState, Config, FordefiClient, SignatureVerifier, WebhookOrchestrator,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    // Load configuration; a missing token or bad key stops startup here
    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        port = config.port,
        api_base_url = %config.api_base_url,
        request_timeout_ms = config.request_timeout_ms,
        "config_loaded"
    );

    let verifier = SignatureVerifier::from_public_key_pem(&config.public_key_pem)
        .context("Failed to parse Fordefi public key")?;
    info!("webhook_public_key_loaded");

    let client = FordefiClient::from_config(&config).context("Failed to build Fordefi client")?;

    let orchestrator = WebhookOrchestrator::new(verifier, Arc::new(client));
    let app = build_router(AppState::new(orchestrator));

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("web_server_shutdown_complete");

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

    info!("web_server_shutting_down");
}
