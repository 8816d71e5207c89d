//! # Storefront Catalog
//!
//! Fetches products from the Storefront GraphQL API and reshapes the nested
//! connection/edge/node responses into flat client-facing records.

use crate::config::ShopifyConfig;
use crate::queries::{available_products_query, single_product_query};
use bridge_core::{BridgeError, BridgeResult, PageInfo, Product, ProductListing, ProductSummary};
use graphql_client::Response;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, instrument, warn};

const SERVICE: &str = "shopify-storefront";

// =============================================================================
// Storefront response types
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SingleProductData {
    pub product: Option<ProductNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductNode {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub variants: Connection<VariantNode>,
    pub images: Connection<ImageNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantNode {
    pub id: String,
    pub price_v2: MoneyV2,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyV2 {
    pub amount: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageNode {
    pub src: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductsData {
    pub products: ProductsConnection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsConnection {
    pub edges: Vec<Edge<ListingNode>>,
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingNode {
    pub id: String,
    pub title: String,
    pub available_for_sale: bool,
}

/// Response to [`single_product_query`]
pub type ProductResponse = Response<SingleProductData>;
/// Response to [`available_products_query`]
pub type ProductsResponse = Response<ProductsData>;

/// Unwrap `data`, turning a data-less error response into `MalformedResponse`
fn into_data<T>(response: Response<T>) -> BridgeResult<T> {
    let errors = response.errors.unwrap_or_default();
    match response.data {
        Some(data) => {
            if !errors.is_empty() {
                warn!("Storefront returned partial data with {} errors", errors.len());
            }
            Ok(data)
        }
        None if !errors.is_empty() => {
            let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
            Err(BridgeError::MalformedResponse(format!(
                "GraphQL errors: {}",
                messages.join("; ")
            )))
        }
        None => Err(BridgeError::MalformedResponse(
            "response has no data".to_string(),
        )),
    }
}

// =============================================================================
// Normalizer
// =============================================================================

/// Flatten a single-product response.
///
/// The first variant supplies the variant id and price; images keep their
/// catalog order. A missing product or an empty variant/image list is a
/// `MalformedResponse`.
pub fn normalize_product(response: ProductResponse) -> BridgeResult<Product> {
    let product = into_data(response)?
        .product
        .ok_or_else(|| BridgeError::MalformedResponse("product is null".to_string()))?;

    let variant = product
        .variants
        .edges
        .into_iter()
        .next()
        .map(|edge| edge.node)
        .ok_or_else(|| {
            BridgeError::MalformedResponse(format!("product {} has no variants", product.id))
        })?;

    if product.images.edges.is_empty() {
        return Err(BridgeError::MalformedResponse(format!(
            "product {} has no images",
            product.id
        )));
    }

    Ok(Product {
        id: product.id,
        variant_id: variant.id,
        title: product.title,
        description: product.description,
        images: product
            .images
            .edges
            .into_iter()
            .map(|edge| edge.node.src)
            .collect(),
        price: variant.price_v2.amount,
        currency: variant.price_v2.currency_code,
    })
}

/// Flatten a listing response, keeping only products available for sale.
pub fn normalize_listing(response: ProductsResponse) -> BridgeResult<ProductListing> {
    let products = into_data(response)?.products;

    Ok(ProductListing {
        products: products
            .edges
            .into_iter()
            .map(|edge| ProductSummary {
                id: edge.node.id,
                title: edge.node.title,
                available: edge.node.available_for_sale,
            })
            .filter(|summary| summary.available)
            .collect(),
        page_info: products.page_info,
    })
}

// =============================================================================
// Client
// =============================================================================

/// Storefront API client
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    config: ShopifyConfig,
    client: Client,
}

impl StorefrontClient {
    pub fn new(config: ShopifyConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Fetch and normalize one product
    #[instrument(skip(self))]
    pub async fn fetch_product(&self, product_id: &str) -> BridgeResult<Product> {
        let response: ProductResponse = self.query(single_product_query(product_id)).await?;
        normalize_product(response)
    }

    /// Fetch and normalize the available-products listing
    #[instrument(skip(self))]
    pub async fn fetch_products(&self) -> BridgeResult<ProductListing> {
        let response: ProductsResponse = self.query(available_products_query()).await?;
        normalize_listing(response)
    }

    async fn query<T: DeserializeOwned>(&self, query: String) -> BridgeResult<T> {
        let url = self.config.storefront_url();
        debug!("Querying storefront: {}", url);

        let response = self
            .client
            .post(&url)
            .header(
                "X-Shopify-Storefront-Access-Token",
                &self.config.storefront_token,
            )
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await
            .map_err(|e| BridgeError::upstream(SERVICE, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BridgeError::upstream(SERVICE, e))?;

        if !status.is_success() {
            error!("Storefront API error: status={}, body={}", status, body);
            return Err(BridgeError::upstream(
                SERVICE,
                format!("HTTP {}: {}", status, body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            BridgeError::MalformedResponse(format!("Failed to parse storefront response: {}", e))
        })
    }
}
