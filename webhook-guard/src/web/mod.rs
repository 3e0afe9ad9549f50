//! Web server module for handling inbound Fordefi webhooks.
//!
//! Routes:
//! - `GET /health`
//! - `POST /` and `POST /fordefi_webhook`

pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{
    fordefi_webhook, health, AppState, HealthResponse, WebhookResponse, SIGNATURE_HEADER,
};
pub use signature::{verify_signature, SignatureVerifier};

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", post(fordefi_webhook))
        .route("/fordefi_webhook", post(fordefi_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
