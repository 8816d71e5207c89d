//! # bridge-stripe
//!
//! Stripe payment processor for the storefront bridge.
//!
//! Implements [`bridge_core::PaymentProcessor`] over the PaymentIntents API:
//! create a card-only intent for the checkout amount, or look one up by id.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bridge_core::{CurrencyCode, PaymentIntentRequest, PaymentProcessor};
//! use bridge_stripe::StripeIntents;
//!
//! let stripe = StripeIntents::from_env()?;
//!
//! let request = PaymentIntentRequest::card(10.00, CurrencyCode::parse("usd")?, metadata)?;
//! let intent = stripe.create_payment_intent(&request).await?;
//!
//! // Return intent.client_secret to the client
//! ```

pub mod config;
pub mod intent;

// Re-exports
pub use config::StripeConfig;
pub use intent::StripeIntents;
