//! # storefront-bridge
//!
//! Backend bridging the storefront client to Stripe and Shopify.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables (or use a .env file)
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_PUBLISHABLE_KEY=pk_test_...
//! export SHOPIFY_DOMAIN=my-shop.myshopify.com
//! export SHOPIFY_ACCESS_TOKEN=...
//! export SHOPIFY_ADMIN_ACCESS_TOKEN=shpat_...
//! export SHOPIFY_WEBHOOK_SECRET=...
//!
//! # Run the server
//! storefront-bridge
//! ```

use bridge_api::{routes, AppConfig, AppState, LogFormat};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_tracing(AppConfig::from_env().log_format);

    // Load config and build downstream clients
    let state = AppState::from_env()?;

    let addr = state.config.socket_addr()?;

    info!(
        "storefront-bridge v{} ({})",
        env!("CARGO_PKG_VERSION"),
        state.config.environment
    );
    info!("Payment processor: {}", state.payments.provider_name());
    info!("Shipping options: {}", state.shipping.options.len());

    // Create router
    let app = routes::create_router(state.clone());

    info!("Listening on http://{}", addr);
    if !state.config.is_production() {
        info!("Public URL: {}", state.config.server_url);
        info!("Webhook: POST {}/webhooks/order-payment", state.config.server_url);
    }

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
