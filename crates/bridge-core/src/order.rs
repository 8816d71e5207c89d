//! # Order Types
//!
//! Order payload types for the commerce admin API, plus the address
//! resolution rules applied to whatever shape the checkout client sends.

use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder written for required address fields the client left out
pub const MISSING_FIELD: &str = "N/A";

/// Address as received from the checkout client.
///
/// Two shapes are accepted: the structured `line1/line2/state/postal_code`
/// form, and the payment-request form with `addressLine[]/region/postalCode`.
/// Both may be partially present; resolution happens per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInput {
    #[serde(default)]
    pub line1: Option<String>,
    #[serde(default)]
    pub line2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub postal_code: Option<String>,

    #[serde(default, rename = "addressLine")]
    pub address_line: Option<Vec<String>>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default, rename = "postalCode", deserialize_with = "string_or_number")]
    pub postal_code_alt: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub phone: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Integer(u64),
}

/// Postal codes and phone numbers sometimes arrive as bare JSON numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
        StringOrNumber::Text(s) => s,
        StringOrNumber::Integer(n) => n.to_string(),
    }))
}

impl AddressInput {
    fn address_line(&self, index: usize) -> Option<&str> {
        self.address_line
            .as_ref()
            .and_then(|lines| lines.get(index))
            .map(String::as_str)
    }
}

/// Returns the first candidate that is present and not blank
fn first_present<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Customer name split on the first space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerName {
    pub first_name: String,
    pub last_name: String,
}

impl CustomerName {
    /// `"Ada Lovelace"` → (`Ada`, `Lovelace`); `"Cher"` → (`Cher`, ``).
    /// Everything after the first space stays in the last name.
    pub fn split(full_name: &str) -> Self {
        let full_name = full_name.trim();
        match full_name.split_once(' ') {
            Some((first, last)) => Self {
                first_name: first.to_string(),
                last_name: last.trim_start().to_string(),
            },
            None => Self {
                first_name: full_name.to_string(),
                last_name: String::new(),
            },
        }
    }
}

/// Address in the shape the admin order API expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAddress {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub province: String,
    pub country: String,
    pub zip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl OrderAddress {
    /// Resolve an inbound address through the fallback chain.
    ///
    /// Required fields missing from both shapes become [`MISSING_FIELD`];
    /// a missing second address line becomes the empty string.
    pub fn resolve(name: &CustomerName, input: &AddressInput) -> Self {
        let or_missing = |v: Option<&str>| v.unwrap_or(MISSING_FIELD).to_string();

        Self {
            first_name: name.first_name.clone(),
            last_name: name.last_name.clone(),
            address1: or_missing(first_present(&[
                input.line1.as_deref(),
                input.address_line(0),
            ])),
            address2: first_present(&[input.line2.as_deref(), input.address_line(1)])
                .unwrap_or_default()
                .to_string(),
            city: or_missing(first_present(&[input.city.as_deref()])),
            province: or_missing(first_present(&[
                input.state.as_deref(),
                input.region.as_deref(),
            ])),
            country: or_missing(first_present(&[input.country.as_deref()])),
            zip: or_missing(first_present(&[
                input.postal_code.as_deref(),
                input.postal_code_alt.as_deref(),
            ])),
            phone: first_present(&[input.phone.as_deref()]).map(String::from),
        }
    }
}

const GID_SCHEME: &str = "gid://";
const VARIANT_GID_PREFIX: &str = "gid://shopify/ProductVariant/";

/// Reduce a variant id to the numeric form the admin REST API takes.
///
/// Accepts plain numbers (`"4242"`) and storefront global ids
/// (`"gid://shopify/ProductVariant/4242"`).
pub fn parse_variant_id(raw: &str) -> BridgeResult<u64> {
    let raw = raw.trim();
    let invalid = || BridgeError::InvalidRequest(format!("invalid variant id: {:?}", raw));

    let numeric = if raw.starts_with(GID_SCHEME) {
        raw.strip_prefix(VARIANT_GID_PREFIX).ok_or_else(invalid)?
    } else {
        raw
    };
    // Storefront ids sometimes carry a query suffix
    let numeric = numeric.split('?').next().unwrap_or(numeric);

    numeric.parse().map_err(|_| invalid())
}

/// A line item in an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub variant_id: u64,
    pub quantity: u32,
}

/// Order customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Financial status flag on a submitted order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialStatus {
    /// Payment was already captured by the processor
    #[default]
    Paid,
}

/// Inventory handling requested from the commerce platform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryBehaviour {
    #[default]
    DecrementObeyingPolicy,
}

/// An order ready for submission.
///
/// Built transiently per request; ownership passes to the commerce platform
/// once submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub line_items: Vec<LineItem>,
    pub customer: Customer,
    pub email: String,
    pub shipping_address: OrderAddress,
    pub billing_address: OrderAddress,
    pub financial_status: FinancialStatus,
    pub inventory_behaviour: InventoryBehaviour,
}

/// The explicit-fields checkout details an order is built from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDetails {
    pub variant_id: String,
    pub quantity: u32,
    pub customer_email: String,
    pub customer_name: String,
    pub shipping_address: AddressInput,
    pub billing_address: AddressInput,
}

impl Order {
    /// Build a paid order from the checkout details
    pub fn from_details(details: &OrderDetails) -> BridgeResult<Self> {
        if details.quantity == 0 {
            return Err(BridgeError::InvalidRequest(
                "quantity must be at least 1".to_string(),
            ));
        }

        let variant_id = parse_variant_id(&details.variant_id)?;
        let name = CustomerName::split(&details.customer_name);

        Ok(Self {
            line_items: vec![LineItem {
                variant_id,
                quantity: details.quantity,
            }],
            customer: Customer {
                first_name: name.first_name.clone(),
                last_name: name.last_name.clone(),
                email: details.customer_email.clone(),
            },
            email: details.customer_email.clone(),
            shipping_address: OrderAddress::resolve(&name, &details.shipping_address),
            billing_address: OrderAddress::resolve(&name, &details.billing_address),
            financial_status: FinancialStatus::Paid,
            inventory_behaviour: InventoryBehaviour::DecrementObeyingPolicy,
        })
    }

    /// Total units across all line items
    pub fn item_count(&self) -> u32 {
        self.line_items.iter().map(|i| i.quantity).sum()
    }
}
