//! # Admin Orders
//!
//! Submits paid orders to the Admin REST API. One attempt per order; a
//! rejection is terminal for the request.

use crate::config::ShopifyConfig;
use bridge_core::{BridgeError, BridgeResult, Order};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

const SERVICE: &str = "shopify-admin";

/// An order accepted by the commerce platform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedOrder {
    pub id: u64,
    /// The order exactly as the platform echoed it
    pub order: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    order: &'a Order,
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    order: serde_json::Value,
}

/// Admin API client
#[derive(Debug, Clone)]
pub struct AdminClient {
    config: ShopifyConfig,
    client: Client,
}

impl AdminClient {
    pub fn new(config: ShopifyConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Submit an order, returning the platform's id and echoed order
    #[instrument(skip(self, order), fields(items = order.item_count()))]
    pub async fn create_order(&self, order: &Order) -> BridgeResult<CreatedOrder> {
        let response = self
            .client
            .post(self.config.orders_url())
            .header("X-Shopify-Access-Token", &self.config.admin_token)
            .json(&CreateOrderBody { order })
            .send()
            .await
            .map_err(|e| BridgeError::upstream(SERVICE, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BridgeError::upstream(SERVICE, e))?;

        if !status.is_success() {
            error!("Admin API rejected order: status={}, body={}", status, body);
            return Err(BridgeError::OrderCreationFailed {
                status: status.as_u16(),
                message: body,
            });
        }

        let created: CreateOrderResponse = serde_json::from_str(&body).map_err(|e| {
            BridgeError::MalformedResponse(format!("Failed to parse order response: {}", e))
        })?;

        let id = created
            .order
            .get("id")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| BridgeError::MalformedResponse("order response has no id".to_string()))?;

        info!("Created order: id={}", id);

        Ok(CreatedOrder {
            id,
            order: created.order,
        })
    }
}
