//! # Shipping Rates
//!
//! Flat shipping table gated on a single country check. Rates do not depend
//! on weight, distance, or carrier. The table can be replaced from
//! `config/shipping.toml`.

use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};

/// The only country currently served
pub const SUPPORTED_COUNTRY: &str = "US";

/// Option ids every table must carry, in order
pub const REQUIRED_OPTION_IDS: [&str; 2] = ["standard", "express"];

/// A selectable shipping option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingOption {
    /// Stable option id (`standard`, `express`)
    pub id: String,
    pub label: String,
    /// Amount in minor units
    pub amount: i64,
    pub description: String,
}

impl ShippingOption {
    fn new(id: &str, label: &str, amount: i64, description: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            amount,
            description: description.to_string(),
        }
    }
}

/// Shipping rate table (loaded from config or built in)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRates {
    #[serde(rename = "option")]
    pub options: Vec<ShippingOption>,
}

impl Default for ShippingRates {
    fn default() -> Self {
        Self {
            options: vec![
                ShippingOption::new(
                    "standard",
                    "Standard Shipping (5-7 business days)",
                    0,
                    "Standard shipping rate",
                ),
                ShippingOption::new(
                    "express",
                    "Express Shipping (2-3 business days)",
                    1000,
                    "Express shipping rate",
                ),
            ],
        }
    }
}

impl ShippingRates {
    /// Load a table from TOML (`[[option]]` entries).
    ///
    /// Labels, descriptions and amounts may change; the option ids may not.
    pub fn from_toml(toml_str: &str) -> BridgeResult<Self> {
        let rates: Self = toml::from_str(toml_str)
            .map_err(|e| BridgeError::Configuration(format!("shipping table: {}", e)))?;
        rates.validate()?;
        Ok(rates)
    }

    fn validate(&self) -> BridgeResult<()> {
        let ids: Vec<_> = self.options.iter().map(|o| o.id.as_str()).collect();
        if ids != REQUIRED_OPTION_IDS {
            return Err(BridgeError::Configuration(format!(
                "shipping table must list options {:?}, got {:?}",
                REQUIRED_OPTION_IDS, ids
            )));
        }

        if let Some(option) = self.options.iter().find(|o| o.amount < 0) {
            return Err(BridgeError::Configuration(format!(
                "shipping option {} has a negative amount",
                option.id
            )));
        }

        Ok(())
    }

    /// Rates for a destination country.
    ///
    /// Fails with `UnsupportedRegion` for anything but the served country;
    /// an absent country is unsupported too.
    pub fn quote(&self, country: Option<&str>) -> BridgeResult<&[ShippingOption]> {
        let country = country.map(str::trim).unwrap_or_default();
        if !country.eq_ignore_ascii_case(SUPPORTED_COUNTRY) {
            return Err(BridgeError::UnsupportedRegion {
                country: country.to_string(),
            });
        }
        Ok(&self.options)
    }
}
