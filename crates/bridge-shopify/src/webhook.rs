//! # Webhook Verification
//!
//! Shopify signs each webhook with HMAC-SHA256 over the raw request body,
//! base64-encoded into the `X-Shopify-Hmac-Sha256` header.
//!
//! The digest must be computed over the body bytes exactly as they arrived.
//! Parsing the JSON and serializing it again changes whitespace and key
//! order, and the signature will no longer match.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the base64 signature
pub const HEADER_HMAC: &str = "X-Shopify-Hmac-Sha256";
/// Header carrying the webhook topic (e.g. `orders/paid`)
pub const HEADER_TOPIC: &str = "X-Shopify-Topic";
/// Header carrying the sending shop's domain
pub const HEADER_SHOP_DOMAIN: &str = "X-Shopify-Shop-Domain";
/// Header carrying the delivery id
pub const HEADER_WEBHOOK_ID: &str = "X-Shopify-Webhook-Id";

/// Outcome of a signature check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Valid,
    Invalid,
}

impl Verification {
    pub fn is_valid(self) -> bool {
        self == Verification::Valid
    }
}

/// An inbound webhook delivery, body kept as raw bytes
#[derive(Debug, Clone, Default)]
pub struct WebhookEvent {
    pub payload: Vec<u8>,
    pub signature: Option<String>,
    pub topic: Option<String>,
    pub shop_domain: Option<String>,
    pub webhook_id: Option<String>,
}

impl WebhookEvent {
    /// Best-effort order reference (`name`, else `id`) for logging
    pub fn order_reference(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_slice(&self.payload).ok()?;
        value
            .get("name")
            .and_then(|v| v.as_str())
            .map(String::from)
            .or_else(|| value.get("id").map(|v| v.to_string()))
    }
}

/// Shared-secret webhook verifier
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier").finish_non_exhaustive()
    }
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self, payload: &[u8]) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes()).ok()?;
        mac.update(payload);
        Some(mac)
    }

    /// Base64 HMAC-SHA256 of `payload` under the shared secret
    pub fn sign(&self, payload: &[u8]) -> String {
        self.mac(payload)
            .map(|mac| BASE64_STANDARD.encode(mac.finalize().into_bytes()))
            .unwrap_or_default()
    }

    /// Check `signature` against the raw `payload`.
    ///
    /// The digest comparison is constant-time. A missing, empty, or
    /// non-base64 signature is `Invalid`.
    pub fn verify(&self, payload: &[u8], signature: Option<&str>) -> Verification {
        let Some(signature) = signature.map(str::trim).filter(|s| !s.is_empty()) else {
            debug!("Webhook has no signature header");
            return Verification::Invalid;
        };

        let Ok(expected) = BASE64_STANDARD.decode(signature) else {
            debug!("Webhook signature is not base64");
            return Verification::Invalid;
        };

        match self.mac(payload).map(|mac| mac.verify_slice(&expected).is_ok()) {
            Some(true) => Verification::Valid,
            _ => Verification::Invalid,
        }
    }

    /// Verify a full delivery
    pub fn verify_event(&self, event: &WebhookEvent) -> Verification {
        self.verify(&event.payload, event.signature.as_deref())
    }
}
