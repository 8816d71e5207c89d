//! # Stripe Payment Intents
//!
//! Implementation of the Stripe PaymentIntents API behind the
//! [`PaymentProcessor`] trait. Requests are form-encoded, one attempt each.

use crate::config::StripeConfig;
use async_trait::async_trait;
use bridge_core::{
    BridgeError, BridgeResult, IntentShipping, PaymentIntent, PaymentIntentRequest,
    PaymentProcessor,
};
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "stripe";

/// Stripe PaymentIntents client
pub struct StripeIntents {
    config: StripeConfig,
    client: Client,
}

impl StripeIntents {
    /// Create a new intents client
    pub fn new(config: StripeConfig) -> BridgeResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| BridgeError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> BridgeResult<Self> {
        Self::new(StripeConfig::from_env()?)
    }

    /// Publishable key handed to the browser
    pub fn publishable_key(&self) -> &str {
        &self.config.publishable_key
    }

    /// Build form data for the create-intent call
    fn form_params(request: &PaymentIntentRequest) -> Vec<(String, String)> {
        let mut form_params: Vec<(String, String)> = vec![
            ("amount".to_string(), request.amount.to_string()),
            ("currency".to_string(), request.currency.as_str().to_string()),
        ];

        for (i, method) in request.payment_method_types.iter().enumerate() {
            form_params.push((format!("payment_method_types[{}]", i), method.clone()));
        }

        for (key, value) in &request.metadata {
            form_params.push((format!("metadata[{}]", key), value.clone()));
        }

        form_params
    }
}

#[async_trait]
impl PaymentProcessor for StripeIntents {
    #[instrument(skip(self, request), fields(amount = request.amount, currency = %request.currency))]
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> BridgeResult<PaymentIntent> {
        let url = format!("{}/v1/payment_intents", self.config.api_base_url);

        debug!("Creating Stripe payment intent");

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .form(&Self::form_params(request))
            .send()
            .await
            .map_err(|e| BridgeError::upstream(PROVIDER, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BridgeError::upstream(PROVIDER, e))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(BridgeError::PaymentIntentCreationFailed(
                    error_response.error.message,
                ));
            }

            return Err(BridgeError::PaymentIntentCreationFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let intent = parse_intent(&body)?;
        if intent.client_secret.is_empty() {
            return Err(BridgeError::PaymentIntentCreationFailed(format!(
                "intent {} returned without a client secret",
                intent.id
            )));
        }

        info!("Created Stripe payment intent: id={}", intent.id);

        Ok(intent)
    }

    #[instrument(skip(self))]
    async fn retrieve_payment_intent(&self, intent_id: &str) -> BridgeResult<PaymentIntent> {
        if intent_id.is_empty()
            || !intent_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(BridgeError::InvalidRequest(format!(
                "invalid payment intent id: {:?}",
                intent_id
            )));
        }

        let url = format!(
            "{}/v1/payment_intents/{}",
            self.config.api_base_url, intent_id
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .send()
            .await
            .map_err(|e| BridgeError::upstream(PROVIDER, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BridgeError::upstream(PROVIDER, e))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);
            return Err(BridgeError::upstream(
                PROVIDER,
                format!("HTTP {}: {}", status, body),
            ));
        }

        parse_intent(&body)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

fn parse_intent(body: &str) -> BridgeResult<PaymentIntent> {
    let response: StripePaymentIntentResponse = serde_json::from_str(body).map_err(|e| {
        BridgeError::MalformedResponse(format!("Failed to parse Stripe response: {}", e))
    })?;

    Ok(PaymentIntent {
        id: response.id,
        client_secret: response.client_secret.unwrap_or_default(),
        amount: response.amount,
        currency: response.currency,
        status: response.status,
        metadata: response.metadata,
        receipt_email: response.receipt_email,
        shipping: response.shipping,
        created: response
            .created
            .and_then(|ts| DateTime::from_timestamp(ts, 0)),
    })
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripePaymentIntentResponse {
    id: String,
    #[serde(default)]
    client_secret: Option<String>,
    amount: i64,
    currency: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
    #[serde(default)]
    receipt_email: Option<String>,
    #[serde(default)]
    shipping: Option<IntentShipping>,
    #[serde(default)]
    created: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}
