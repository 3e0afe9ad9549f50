//! Fordefi webhook signature verification.
//!
//! Fordefi signs the raw webhook body with ECDSA over P-256 using SHA-256.
//! The `X-Signature` header carries the DER-encoded signature, base64 wrapped.
//! Reference: https://docs.fordefi.com/developers/webhooks#validate-a-webhook

use base64::{engine::general_purpose::STANDARD, Engine};
use p256::ecdsa::{signature::Verifier, Signature, VerifyingKey};
use p256::pkcs8::DecodePublicKey;
use tracing::warn;

use crate::config::ConfigError;

/// Verifies webhook payloads against the platform's public key.
///
/// The key is loaded once at startup and only read afterwards, so the
/// verifier can be shared freely between request tasks.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    pub fn new(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// Parse a PEM-encoded SubjectPublicKeyInfo holding a P-256 key.
    pub fn from_public_key_pem(pem: &str) -> Result<Self, ConfigError> {
        let key = VerifyingKey::from_public_key_pem(pem)
            .map_err(|e| ConfigError::InvalidPublicKey(e.to_string()))?;
        Ok(Self::new(key))
    }

    /// Verify `signature_b64` over the exact bytes of `body`.
    pub fn verify(&self, body: &[u8], signature_b64: &str) -> bool {
        verify_signature(body, signature_b64, &self.key)
    }
}

/// Verify a Fordefi webhook signature.
///
/// # Arguments
///
/// * `body` - The raw request body, exactly as received
/// * `signature_b64` - The `X-Signature` header value
/// * `key` - The platform's webhook verifying key
///
/// # Returns
///
/// `true` only if the signature decodes and matches. Every failure is
/// reported as `false`; nothing is raised to the caller.
pub fn verify_signature(body: &[u8], signature_b64: &str, key: &VerifyingKey) -> bool {
    let der = match STANDARD.decode(signature_b64.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "fordefi_signature_invalid_base64");
            return false;
        }
    };

    let signature = match Signature::from_der(&der) {
        Ok(sig) => sig,
        Err(e) => {
            warn!(error = %e, der_length = der.len(), "fordefi_signature_invalid_der");
            return false;
        }
    };

    // SHA-256 of the body is computed by the verifier itself.
    match key.verify(body, &signature) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, body_length = body.len(), "fordefi_signature_mismatch");
            false
        }
    }
}
