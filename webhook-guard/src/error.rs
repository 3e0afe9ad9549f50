//! Errors that end a webhook request with a non-200 response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::risk::RiskError;

/// Terminal failure of one webhook delivery.
///
/// Platform outages are not represented here; the orchestrator recovers
/// from them locally and still acknowledges the delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Missing signature")]
    MissingSignature,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid JSON in request body")]
    MalformedPayload(#[source] serde_json::Error),

    #[error("Transaction data has an unexpected structure.")]
    UnexpectedRecord(#[source] serde_json::Error),

    #[error(transparent)]
    Risk(#[from] RiskError),
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                StatusCode::UNAUTHORIZED
            }
            WebhookError::MalformedPayload(_)
            | WebhookError::UnexpectedRecord(_)
            | WebhookError::Risk(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Error body, shaped like `{"detail": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            detail: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WebhookError::MissingSignature.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            WebhookError::InvalidSignature.status_code(),
            StatusCode::UNAUTHORIZED
        );

        let parse_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            WebhookError::MalformedPayload(parse_error).status_code(),
            StatusCode::BAD_REQUEST
        );
        let shape_error =
            serde_json::from_str::<crate::platform::TransactionRecord>(r#"{"id": 1}"#).unwrap_err();
        assert_eq!(
            WebhookError::UnexpectedRecord(shape_error).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::from(RiskError::MissingVaultAddress).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_risk_error_detail() {
        let err = WebhookError::from(RiskError::MissingVaultAddress);
        assert_eq!(
            err.to_string(),
            "Vault address not found in the transaction data."
        );
    }
}
