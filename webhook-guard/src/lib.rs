//! SwapGuard - Fordefi webhook guard against swap-and-transfer redirection.
//!
//! Fordefi notifies this service about transaction events. For each signed
//! event the service fetches the transaction, checks whether a 1inch swap
//! forwards its proceeds to an address other than the swapping vault, and
//! aborts the transaction if it does.
//!
//! ## Architecture
//!
//! ```text
//! Fordefi → Web Server → Orchestrator → Fordefi API (fetch)
//!                             ↓
//!                        Risk Evaluator → Fordefi API (abort)
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod platform;
pub mod risk;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use error::WebhookError;
pub use orchestrator::{WebhookEnvelope, WebhookOrchestrator, WebhookOutcome};
pub use platform::{FordefiClient, PlatformError, TransactionPlatform, TransactionRecord};
pub use risk::{evaluate, RiskAssessment, RiskDecision, RiskError};
pub use web::{build_router, AppState, SignatureVerifier};
