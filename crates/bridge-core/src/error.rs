//! # Bridge Error Types
//!
//! Typed error handling for the storefront bridge.
//! All downstream operations return `Result<T, BridgeError>`; handlers map
//! each variant to a fixed client-facing response and log the detail.

use thiserror::Error;

/// Core error type for every bridge operation
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data from the client
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Network failure or non-2xx status from a third-party API
    #[error("Upstream unavailable [{service}]: {message}")]
    UpstreamUnavailable { service: String, message: String },

    /// The catalog API answered with an unexpected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The payment processor refused to create an intent
    #[error("Payment intent creation failed: {0}")]
    PaymentIntentCreationFailed(String),

    /// The commerce admin API rejected the order
    #[error("Order creation failed (HTTP {status}): {message}")]
    OrderCreationFailed { status: u16, message: String },

    /// Webhook signature did not match the shared secret
    #[error("Invalid webhook signature")]
    InvalidWebhookSignature,

    /// Shipping requested for a country outside the served region
    #[error("Unsupported region: {country}")]
    UnsupportedRegion { country: String },
}

impl BridgeError {
    /// Shorthand for an upstream failure tagged with the service name
    pub fn upstream(service: impl Into<String>, message: impl ToString) -> Self {
        BridgeError::UpstreamUnavailable {
            service: service.into(),
            message: message.to_string(),
        }
    }

    /// Returns true for validation-class failures (answered with 400)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BridgeError::InvalidRequest(_)
                | BridgeError::InvalidWebhookSignature
                | BridgeError::UnsupportedRegion { .. }
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }
}

/// Result type alias for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
