//! # bridge-shopify
//!
//! Shopify side of the storefront bridge.
//!
//! - [`StorefrontClient`] queries the Storefront GraphQL API and flattens
//!   products for the client
//! - [`AdminClient`] submits paid orders to the Admin REST API
//! - [`WebhookVerifier`] checks webhook signatures over the raw body
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bridge_shopify::{AdminClient, ShopifyConfig, StorefrontClient};
//!
//! let config = ShopifyConfig::from_env()?;
//! let http = reqwest::Client::new();
//!
//! let storefront = StorefrontClient::new(config.clone(), http.clone());
//! let listing = storefront.fetch_products().await?;
//!
//! let admin = AdminClient::new(config, http);
//! let created = admin.create_order(&order).await?;
//! ```

pub mod catalog;
pub mod config;
pub mod orders;
pub mod queries;
pub mod webhook;

// Re-exports
pub use catalog::{normalize_listing, normalize_product, StorefrontClient};
pub use config::ShopifyConfig;
pub use orders::{AdminClient, CreatedOrder};
pub use queries::{available_products_query, single_product_query};
pub use webhook::{Verification, WebhookEvent, WebhookVerifier, HEADER_HMAC};
