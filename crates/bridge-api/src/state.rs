//! # Application State
//!
//! Shared state for the Axum application. Downstream clients are built once
//! at startup and injected into handlers; nothing here is mutated per
//! request.

use bridge_core::{BoxedPaymentProcessor, BridgeError, ShippingRates};
use bridge_shopify::{AdminClient, ShopifyConfig, StorefrontClient, WebhookVerifier};
use bridge_stripe::{StripeConfig, StripeIntents};
use std::net::SocketAddr;
use std::sync::Arc;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public URL of this server
    pub server_url: String,
    /// Storefront client origin allowed by CORS (any origin when unset)
    pub client_url: Option<String>,
    /// Environment (development, staging, production)
    pub environment: String,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            server_url: lookup("SERVER_URL")
                .unwrap_or_else(|| format!("http://localhost:{}", port)),
            client_url: lookup("CLIENT_URL").filter(|u| !u.trim().is_empty()),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            log_format: match lookup("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// Payment processor
    pub payments: BoxedPaymentProcessor,
    /// Publishable processor key served by `GET /config`
    pub publishable_key: String,
    /// Storefront catalog client
    pub storefront: StorefrontClient,
    /// Admin order client
    pub admin: AdminClient,
    /// Webhook signature verifier
    pub webhooks: WebhookVerifier,
    /// Flat shipping table
    pub shipping: Arc<ShippingRates>,
}

impl AppState {
    /// Build state from environment variables and `config/shipping.toml`
    pub fn from_env() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let stripe = StripeConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load Stripe config: {}", e))?;
        let shopify = ShopifyConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load Shopify config: {}", e))?;
        let shipping = load_shipping_rates()?;

        Ok(Self::new(config, stripe, shopify, shipping)?)
    }

    /// Build state from explicit configuration
    pub fn new(
        config: AppConfig,
        stripe: StripeConfig,
        shopify: ShopifyConfig,
        shipping: ShippingRates,
    ) -> Result<Self, BridgeError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| BridgeError::Configuration(format!("HTTP client: {}", e)))?;

        let publishable_key = stripe.publishable_key.clone();
        let payments: BoxedPaymentProcessor = Arc::new(StripeIntents::new(stripe)?);

        Ok(Self {
            config,
            payments,
            publishable_key,
            storefront: StorefrontClient::new(shopify.clone(), http.clone()),
            admin: AdminClient::new(shopify.clone(), http),
            webhooks: WebhookVerifier::new(shopify.webhook_secret),
            shipping: Arc::new(shipping),
        })
    }

    /// Builder: swap the payment processor
    pub fn with_payments(mut self, payments: BoxedPaymentProcessor) -> Self {
        self.payments = payments;
        self
    }
}

/// Load the shipping table from config, falling back to the built-in table
fn load_shipping_rates() -> anyhow::Result<ShippingRates> {
    let config_paths = [
        "config/shipping.toml",
        "../config/shipping.toml",
        "../../config/shipping.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let rates = ShippingRates::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded {} shipping options from {}", rates.options.len(), path);
            return Ok(rates);
        }
    }

    tracing::info!("No shipping config found, using built-in rates");
    Ok(ShippingRates::default())
}
