//! HTTP client for the Fordefi REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, info};
use url::Url;

use super::{PlatformError, TransactionPlatform, TransactionRecord};
use crate::config::Config;

/// Thin typed wrapper around the two Fordefi endpoints the webhook uses.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone)]
pub struct FordefiClient {
    http: Client,
    base_url: Url,
    api_user_token: String,
}

impl FordefiClient {
    pub fn new(
        base_url: Url,
        api_user_token: String,
        timeout: Duration,
    ) -> Result<Self, PlatformError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            api_user_token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, PlatformError> {
        Self::new(
            config.api_base_url.clone(),
            config.api_user_token.clone(),
            config.request_timeout(),
        )
    }

    /// Build `{base}/api/v1/transactions/{id}[/{action}]`.
    ///
    /// The id is pushed as a single path segment so it is percent-encoded
    /// and cannot escape into another route.
    fn transaction_url(
        &self,
        transaction_id: &str,
        action: Option<&str>,
    ) -> Result<Url, PlatformError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| PlatformError::InvalidUrl(self.base_url.to_string()))?;
            segments
                .pop_if_empty()
                .extend(["api", "v1", "transactions", transaction_id]);
            if let Some(action) = action {
                segments.push(action);
            }
        }
        Ok(url)
    }

    /// Turn a non-2xx response into [`PlatformError::Status`].
    async fn check_status(response: Response) -> Result<Response, PlatformError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(PlatformError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl TransactionPlatform for FordefiClient {
    async fn fetch_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<TransactionRecord, PlatformError> {
        let url = self.transaction_url(transaction_id, None)?;

        info!(transaction_id = %transaction_id, "fordefi_fetch_starting");

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.api_user_token)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let body = response.bytes().await?;

        debug!(
            transaction_id = %transaction_id,
            transaction_data = %String::from_utf8_lossy(&body),
            "fordefi_transaction_data"
        );

        let value: serde_json::Value =
            serde_json::from_slice(&body).map_err(PlatformError::Decode)?;
        let record = serde_json::from_value(value).map_err(PlatformError::Shape)?;

        info!(
            transaction_id = %transaction_id,
            body_length = body.len(),
            "fordefi_fetch_complete"
        );

        Ok(record)
    }

    async fn abort_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<serde_json::Value, PlatformError> {
        let url = self.transaction_url(transaction_id, Some("abort"))?;

        info!(transaction_id = %transaction_id, "fordefi_abort_starting");

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_user_token)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let body = response.bytes().await?;

        // Some acknowledgments come back with an empty body.
        let ack = if body.iter().all(u8::is_ascii_whitespace) {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).map_err(PlatformError::Decode)?
        };

        info!(transaction_id = %transaction_id, result = %ack, "fordefi_abort_complete");

        Ok(ack)
    }
}
