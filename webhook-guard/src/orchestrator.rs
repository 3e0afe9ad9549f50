//! Webhook orchestration: verify, parse, fetch, evaluate, maybe abort.
//!
//! ## Processing Flow
//!
//! ```text
//! WebhookEnvelope → verify → parse → fetch → evaluate → abort? → WebhookOutcome
//! ```
//!
//! Signature and payload problems end the run with a [`WebhookError`], as
//! does a fetched record whose structure does not match the schema.
//! Platform outages never do: a failed fetch degrades to a no-op and a
//! failed abort is logged for reconciliation, and the delivery is still
//! acknowledged.

use std::sync::Arc;

use axum::body::Bytes;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::error::WebhookError;
use crate::platform::{PlatformError, TransactionPlatform};
use crate::risk::{evaluate, RiskAssessment, RiskDecision};
use crate::web::SignatureVerifier;

/// One inbound delivery exactly as received.
#[derive(Debug, Clone)]
pub struct WebhookEnvelope {
    pub body: Bytes,
    pub signature: Option<String>,
}

/// Parsed webhook body. Only the transaction id is of interest.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub event: Option<EventBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventBody {
    #[serde(default)]
    pub transaction_id: Option<TransactionId>,
}

/// Transaction ids are strings, but numeric ids are accepted and used in
/// their decimal form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TransactionId {
    Text(String),
    Number(serde_json::Number),
}

impl WebhookEvent {
    pub fn transaction_id(&self) -> Option<String> {
        let id = match self.event.as_ref()?.transaction_id.as_ref()? {
            TransactionId::Text(id) => id.clone(),
            TransactionId::Number(id) => id.to_string(),
        };
        (!id.is_empty()).then_some(id)
    }
}

/// How a successfully handled delivery ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The event carried no transaction id.
    NoTransactionId,
    /// The transaction could not be fetched; no policy was applied.
    NoTransactionData { transaction_id: String },
    Allowed {
        transaction_id: String,
        assessment: RiskAssessment,
    },
    /// An abort was decided. `acknowledged` is false when issuing it failed.
    Aborted {
        transaction_id: String,
        assessment: RiskAssessment,
        acknowledged: bool,
    },
}

impl WebhookOutcome {
    /// Message returned to the platform in the 200 response.
    pub fn message(&self) -> &'static str {
        match self {
            WebhookOutcome::NoTransactionId | WebhookOutcome::NoTransactionData { .. } => {
                "Webhook processed; no transaction data found."
            }
            WebhookOutcome::Allowed { .. } | WebhookOutcome::Aborted { .. } => {
                "Webhook received successfully"
            }
        }
    }
}

/// Runs the policy for each delivery.
///
/// Holds only read-only state, so one instance serves all requests.
pub struct WebhookOrchestrator {
    verifier: SignatureVerifier,
    platform: Arc<dyn TransactionPlatform>,
}

impl WebhookOrchestrator {
    pub fn new(verifier: SignatureVerifier, platform: Arc<dyn TransactionPlatform>) -> Self {
        Self { verifier, platform }
    }

    pub async fn handle(&self, envelope: &WebhookEnvelope) -> Result<WebhookOutcome, WebhookError> {
        let signature = envelope
            .signature
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                warn!("webhook_signature_missing");
                WebhookError::MissingSignature
            })?;

        if !self.verifier.verify(&envelope.body, signature) {
            warn!(body_length = envelope.body.len(), "webhook_signature_invalid");
            return Err(WebhookError::InvalidSignature);
        }

        debug!(body = %String::from_utf8_lossy(&envelope.body), "webhook_event_received");

        let event: WebhookEvent = serde_json::from_slice(&envelope.body).map_err(|e| {
            warn!(error = %e, "webhook_payload_malformed");
            WebhookError::MalformedPayload(e)
        })?;

        let Some(transaction_id) = event.transaction_id() else {
            info!("webhook_no_transaction_id");
            return Ok(WebhookOutcome::NoTransactionId);
        };

        info!(transaction_id = %transaction_id, "webhook_transaction_received");

        let record = match self.platform.fetch_transaction(&transaction_id).await {
            Ok(record) => record,
            Err(PlatformError::Shape(e)) => {
                warn!(transaction_id = %transaction_id, error = %e, "transaction_shape_unexpected");
                return Err(WebhookError::UnexpectedRecord(e));
            }
            Err(e) => {
                // The policy did not run for this transaction.
                error!(
                    transaction_id = %transaction_id,
                    error = %e,
                    "transaction_fetch_failed"
                );
                return Ok(WebhookOutcome::NoTransactionData { transaction_id });
            }
        };

        let assessment = evaluate(&record).map_err(|e| {
            warn!(transaction_id = %transaction_id, error = %e, "transaction_shape_unexpected");
            WebhookError::from(e)
        })?;

        info!(
            transaction_id = %transaction_id,
            origin_vault = %assessment.origin_vault,
            receiver_vault = ?assessment.receiver_vault,
            decision = ?assessment.decision,
            "transaction_evaluated"
        );

        match assessment.decision {
            RiskDecision::Allow => Ok(WebhookOutcome::Allowed {
                transaction_id,
                assessment,
            }),
            RiskDecision::Abort => {
                let acknowledged = self.issue_abort(&transaction_id).await;
                Ok(WebhookOutcome::Aborted {
                    transaction_id,
                    assessment,
                    acknowledged,
                })
            }
        }
    }

    /// Issue the abort on its own task.
    ///
    /// Once started the abort runs to completion even if the inbound
    /// request is dropped and this future is cancelled.
    async fn issue_abort(&self, transaction_id: &str) -> bool {
        let platform = Arc::clone(&self.platform);
        let id = transaction_id.to_string();
        let task = tokio::spawn(async move { platform.abort_transaction(&id).await });

        match task.await {
            Ok(Ok(ack)) => {
                info!(transaction_id = %transaction_id, result = %ack, "transaction_aborted");
                true
            }
            Ok(Err(e)) => {
                error!(
                    transaction_id = %transaction_id,
                    error = %e,
                    "transaction_abort_failed"
                );
                false
            }
            Err(e) => {
                error!(
                    transaction_id = %transaction_id,
                    error = %e,
                    "transaction_abort_failed"
                );
                false
            }
        }
    }
}
