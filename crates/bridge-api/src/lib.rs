//! # bridge-api
//!
//! HTTP API layer for storefront-bridge.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Catalog, payment-intent, order, and shipping endpoints
//! - The signed order-payment webhook
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/config` | Publishable payment key |
//! | POST | `/create-payment-intent` | Create payment intent |
//! | POST | `/create-shopify-order` | Place a paid order |
//! | POST | `/calculateShipping` | Shipping options |
//! | GET | `/api/products` | Available products |
//! | GET | `/api/products/{id}` | Single product |
//! | POST | `/webhooks/order-payment` | Order-payment webhook |
//! | POST | `/api/logs` | Client log sink |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState, LogFormat};
