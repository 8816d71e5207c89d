//! # Routes
//!
//! Axum router configuration. Paths match what the storefront client
//! already calls, so they are not versioned or nested.

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// CORS: the configured client origin, or any origin when none is set
fn cors_layer(client_url: Option<&str>) -> CorsLayer {
    let origin = match client_url.map(|u| HeaderValue::from_str(u.trim_end_matches('/'))) {
        Some(Ok(origin)) => AllowOrigin::exact(origin),
        Some(Err(e)) => {
            warn!("Ignoring invalid CLIENT_URL: {}", e);
            AllowOrigin::any()
        }
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create the main application router
///
/// Routes:
/// - GET  /health - Health check
/// - GET  /config - Publishable payment key
/// - POST /create-payment-intent - Create payment intent
/// - POST /create-shopify-order - Place a paid order
/// - POST /calculateShipping - Flat shipping options
/// - GET  /api/products - Available products
/// - GET  /api/products/{id} - Single product
/// - POST /webhooks/order-payment - Signed order-payment webhook
/// - POST /api/logs - Client-side log sink
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.client_url.as_deref());

    // Catalog and client logging
    let api_routes = Router::new()
        .route("/products", get(handlers::list_products))
        .route("/products/{id}", get(handlers::get_product))
        .route("/logs", post(handlers::client_log));

    // Raw body, signature checked in the handler
    let webhook_routes = Router::new().route("/order-payment", post(handlers::order_payment_webhook));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/create-payment-intent", post(handlers::create_payment_intent))
        .route("/create-shopify-order", post(handlers::create_shopify_order))
        .route("/calculateShipping", post(handlers::calculate_shipping))
        .nest("/api", api_routes)
        .nest("/webhooks", webhook_routes)
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

