//! Webhook endpoint handlers.
//!
//! The handlers only adapt HTTP to the orchestrator: pull the raw body and
//! the `X-Signature` header, run the policy, render the outcome.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::error::WebhookError;
use crate::orchestrator::{WebhookEnvelope, WebhookOrchestrator};

/// Header carrying the base64 DER signature of the body.
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<WebhookOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: WebhookOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Fordefi Webhook
// =============================================================================

/// Webhook response.
#[derive(Serialize)]
pub struct WebhookResponse {
    pub message: &'static str,
}

/// Fordefi webhook endpoint.
///
/// The body is taken as raw bytes so the signature is checked against
/// exactly what was sent.
pub async fn fordefi_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, WebhookError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    info!(
        body_length = body.len(),
        has_signature = signature.is_some(),
        "fordefi_webhook_received"
    );

    let envelope = WebhookEnvelope { body, signature };
    let outcome = state.orchestrator.handle(&envelope).await?;

    info!(outcome = ?outcome, "fordefi_webhook_processed");

    Ok(Json(WebhookResponse {
        message: outcome.message(),
    }))
}
