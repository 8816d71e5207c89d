//! # bridge-core
//!
//! Core types and traits for the storefront bridge.
//!
//! This crate provides:
//! - `PaymentProcessor` trait for the payment processor seam
//! - `Product`, `ProductSummary`, and `PageInfo` for the catalog
//! - `Order`, `OrderAddress`, and the address fallback rules
//! - `ShippingRates` for the flat shipping table
//! - `BridgeError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use bridge_core::{CurrencyCode, IntentMetadata, PaymentIntentRequest};
//!
//! // $10.00 becomes 1000 minor units here, and nowhere else
//! let request = PaymentIntentRequest::card(10.00, CurrencyCode::parse("usd")?, metadata)?;
//! let intent = processor.create_payment_intent(&request).await?;
//!
//! // Hand intent.client_secret to the browser
//! ```

pub mod error;
pub mod order;
pub mod processor;
pub mod product;
pub mod shipping;

// Re-exports for convenience
pub use error::{BridgeError, BridgeResult};
pub use order::{
    AddressInput, Customer, CustomerName, FinancialStatus, InventoryBehaviour, LineItem, Order,
    OrderAddress, OrderDetails, MISSING_FIELD,
};
pub use processor::{
    BoxedPaymentProcessor, IntentMetadata, IntentShipping, PaymentIntent, PaymentIntentRequest,
    PaymentProcessor,
};
pub use product::{
    to_minor_units, CurrencyCode, PageInfo, Product, ProductListing, ProductSummary,
    MAX_MINOR_UNITS,
};
pub use shipping::{ShippingOption, ShippingRates};
