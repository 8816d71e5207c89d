//! # Shopify Configuration
//!
//! Shop domain, access tokens, and the webhook shared secret.
//! Loaded from environment variables.

use bridge_core::BridgeError;
use std::env;

/// API version used when `SHOPIFY_API_VERSION` is unset
pub const DEFAULT_API_VERSION: &str = "2023-10";

/// Shopify API configuration
#[derive(Debug, Clone)]
pub struct ShopifyConfig {
    /// Shop domain (e.g. `my-shop.myshopify.com`)
    pub domain: String,

    /// Storefront API access token
    pub storefront_token: String,

    /// Admin API access token
    pub admin_token: String,

    /// Shared secret webhooks are signed with
    pub webhook_secret: String,

    /// API version segment (e.g. `2023-10`)
    pub api_version: String,

    /// Base URL, `https://<domain>` unless overridden for testing
    pub base_url: String,
}

impl ShopifyConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `SHOPIFY_DOMAIN`
    /// - `SHOPIFY_ACCESS_TOKEN` (storefront)
    /// - `SHOPIFY_ADMIN_ACCESS_TOKEN`
    /// - `SHOPIFY_WEBHOOK_SECRET`
    ///
    /// Optional: `SHOPIFY_API_VERSION` (defaults to [`DEFAULT_API_VERSION`]).
    pub fn from_env() -> Result<Self, BridgeError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BridgeError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| BridgeError::Configuration(format!("{} not set", key)))
        };

        let domain = required("SHOPIFY_DOMAIN")?;
        let domain = domain
            .trim()
            .trim_start_matches("https://")
            .trim_end_matches('/')
            .to_string();

        let mut config = Self::new(
            domain,
            required("SHOPIFY_ACCESS_TOKEN")?,
            required("SHOPIFY_ADMIN_ACCESS_TOKEN")?,
            required("SHOPIFY_WEBHOOK_SECRET")?,
        );

        if let Some(version) = lookup("SHOPIFY_API_VERSION").filter(|v| !v.trim().is_empty()) {
            config.api_version = version.trim().to_string();
        }

        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(
        domain: impl Into<String>,
        storefront_token: impl Into<String>,
        admin_token: impl Into<String>,
        webhook_secret: impl Into<String>,
    ) -> Self {
        let domain = domain.into();
        Self {
            base_url: format!("https://{}", domain),
            domain,
            storefront_token: storefront_token.into(),
            admin_token: admin_token.into(),
            webhook_secret: webhook_secret.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Storefront GraphQL endpoint
    pub fn storefront_url(&self) -> String {
        format!("{}/api/{}/graphql.json", self.base_url, self.api_version)
    }

    /// Admin REST order-creation endpoint
    pub fn orders_url(&self) -> String {
        format!("{}/admin/api/{}/orders.json", self.base_url, self.api_version)
    }

    /// Builder: set custom base URL (for testing)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}
