//! # Product Types
//!
//! Client-facing catalog types. Products are sourced read-only from the
//! storefront query API and reshaped into these flat records.

use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};

/// ISO 4217 currency code, normalized to lower case
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse a three-letter currency code in any case
    pub fn parse(code: &str) -> BridgeResult<Self> {
        let code = code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(BridgeError::InvalidRequest(format!(
                "invalid currency code: {:?}",
                code
            )));
        }
        Ok(Self(code.to_ascii_lowercase()))
    }

    /// Returns the lower-case code (the form the processor expects)
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = BridgeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_uppercase())
    }
}

/// Largest amount the processor accepts, in minor units
pub const MAX_MINOR_UNITS: i64 = 99_999_999;

/// Convert a major-unit amount (e.g. dollars) to integer minor units.
///
/// Multiplies by 100 and rounds to the nearest integer. Callers must apply
/// this exactly once per amount.
pub fn to_minor_units(amount: f64) -> BridgeResult<i64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(BridgeError::InvalidRequest(format!(
            "amount must be a non-negative number, got {}",
            amount
        )));
    }

    let minor = (amount * 100.0).round();
    if minor > MAX_MINOR_UNITS as f64 {
        return Err(BridgeError::InvalidRequest(format!(
            "amount {} exceeds the maximum of {} minor units",
            amount, MAX_MINOR_UNITS
        )));
    }
    Ok(minor as i64)
}

/// A single product as returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,

    /// First variant of the product; the one the client checks out
    pub variant_id: String,

    pub title: String,

    pub description: String,

    /// Image URLs in catalog order
    pub images: Vec<String>,

    /// Decimal amount as the catalog reports it (e.g. "29.99")
    pub price: String,

    /// Currency code as the catalog reports it (e.g. "USD")
    pub currency: String,
}

/// A listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: String,
    pub title: String,
    pub available: bool,
}

/// Pagination cursor info, passed through from the catalog unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// The catalog listing returned by `GET /api/products`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    pub products: Vec<ProductSummary>,
    pub page_info: PageInfo,
}
