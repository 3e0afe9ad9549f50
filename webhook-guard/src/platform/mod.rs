//! Fordefi platform API.
//!
//! The orchestrator only talks to the platform through the
//! [`TransactionPlatform`] trait: one read to fetch the transaction and,
//! when the policy says so, one write to abort it. Neither call is retried.

pub mod client;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use client::FordefiClient;
pub use types::{
    BalanceChange, EffectParty, Effects, MinedResult, TransactionRecord, Transfer, VaultRef,
};

/// Failure talking to the platform API.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("platform returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The body is JSON but does not match the transaction schema.
    #[error("unexpected transaction structure: {0}")]
    Shape(#[source] serde_json::Error),

    #[error("cannot build request URL from base {0}")]
    InvalidUrl(String),
}

/// Operations the webhook needs from the custodial platform.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionPlatform: Send + Sync {
    /// Fetch the authoritative record for a transaction.
    async fn fetch_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<TransactionRecord, PlatformError>;

    /// Ask the platform to abort a transaction before it is broadcast.
    ///
    /// Returns the platform's JSON acknowledgment.
    async fn abort_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<serde_json::Value, PlatformError>;
}
