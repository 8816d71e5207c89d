//! # Payment Processor Trait
//!
//! Seam between the HTTP layer and the payment processor. The Stripe
//! implementation lives in `bridge-stripe`; handlers only see
//! [`BoxedPaymentProcessor`].
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │          PaymentProcessor (trait)            │
//! │  ├── create_payment_intent()                 │
//! │  ├── retrieve_payment_intent()               │
//! │  └── provider_name()                         │
//! └──────────────────────────────────────────────┘
//!                      ▲
//!              ┌───────┴────────┐
//!              │ StripeIntents  │
//!              └────────────────┘
//! ```

use crate::error::{BridgeError, BridgeResult};
use crate::order::{AddressInput, OrderDetails};
use crate::product::{to_minor_units, CurrencyCode};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Metadata key carrying the purchased variant id
pub const META_VARIANT_ID: &str = "variantId";
/// Metadata key carrying the product titles
pub const META_PRODUCT_TITLES: &str = "productTitles";
/// Metadata key carrying the quantity
pub const META_QUANTITY: &str = "quantity";

/// Order metadata attached to an intent. All values travel as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentMetadata {
    pub variant_id: String,
    pub product_titles: String,
    pub quantity: String,
}

impl IntentMetadata {
    /// Flatten into the key/value map the processor stores
    pub fn into_map(self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (META_VARIANT_ID.to_string(), self.variant_id),
            (META_PRODUCT_TITLES.to_string(), self.product_titles),
            (META_QUANTITY.to_string(), self.quantity),
        ])
    }
}

/// A create-intent request, amount already in minor units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    pub amount: i64,
    pub currency: CurrencyCode,
    pub payment_method_types: Vec<String>,
    pub metadata: BTreeMap<String, String>,
}

impl PaymentIntentRequest {
    /// Card-only intent for a major-unit amount.
    ///
    /// This is the single place the major → minor conversion happens.
    pub fn card(amount: f64, currency: CurrencyCode, metadata: IntentMetadata) -> BridgeResult<Self> {
        Ok(Self {
            amount: to_minor_units(amount)?,
            currency,
            payment_method_types: vec!["card".to_string()],
            metadata: metadata.into_map(),
        })
    }
}

/// Shipping details recorded on an intent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentShipping {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<AddressInput>,
}

/// A processor-side payment intent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    /// Amount in minor units
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub receipt_email: Option<String>,
    #[serde(default)]
    pub shipping: Option<IntentShipping>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

impl PaymentIntent {
    /// Recover order details from the intent's metadata and shipping.
    ///
    /// Backs the deprecated order-by-intent calling convention. Billing is
    /// taken to be the shipping address since intents carry only one.
    pub fn order_details(&self) -> BridgeResult<OrderDetails> {
        let variant_id = self
            .metadata
            .get(META_VARIANT_ID)
            .cloned()
            .ok_or_else(|| {
                BridgeError::InvalidRequest(format!(
                    "payment intent {} has no {} metadata",
                    self.id, META_VARIANT_ID
                ))
            })?;

        let quantity = match self.metadata.get(META_QUANTITY) {
            Some(q) => q.trim().parse().map_err(|_| {
                BridgeError::InvalidRequest(format!("invalid quantity metadata: {:?}", q))
            })?,
            None => 1,
        };

        let shipping = self.shipping.clone().unwrap_or_default();
        let address = shipping.address.unwrap_or_default();

        Ok(OrderDetails {
            variant_id,
            quantity,
            customer_email: self.receipt_email.clone().unwrap_or_default(),
            customer_name: shipping.name.unwrap_or_default(),
            shipping_address: AddressInput {
                phone: shipping.phone,
                ..address.clone()
            },
            billing_address: address,
        })
    }
}

/// Core trait for payment processor implementations.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create an intent and return it with its client secret.
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> BridgeResult<PaymentIntent>;

    /// Look up an existing intent by id.
    async fn retrieve_payment_intent(&self, intent_id: &str) -> BridgeResult<PaymentIntent>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment processor (dynamic dispatch)
pub type BoxedPaymentProcessor = Arc<dyn PaymentProcessor>;
