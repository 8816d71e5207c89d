//! # Request Handlers
//!
//! Axum request handlers for the bridge API. Each handler performs one
//! downstream call, logs any failure in full, and returns only a fixed
//! client-facing message.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use bridge_core::{
    AddressInput, BridgeError, CurrencyCode, IntentMetadata, Order, OrderDetails,
    PaymentIntentRequest, ShippingOption,
};
use bridge_shopify::webhook::{HEADER_SHOP_DOMAIN, HEADER_TOPIC, HEADER_WEBHOOK_ID};
use bridge_shopify::{WebhookEvent, HEADER_HMAC};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, error, field, info, instrument, warn, Span};

// =============================================================================
// Request/Response Types
// =============================================================================

/// `GET /config` response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub publishable_key: String,
}

/// `POST /create-payment-intent` request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentRequest {
    /// Amount in major units (e.g. dollars), as a number or numeric string
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub amount: f64,
    pub currency: String,
    #[serde(default)]
    pub variant_id: Option<Value>,
    /// A single title or a list of titles
    #[serde(default)]
    pub product_titles: Option<Value>,
    #[serde(default)]
    pub quantity: Option<Value>,
}

/// `POST /create-payment-intent` response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentResponse {
    pub client_secret: String,
}

/// `POST /create-shopify-order` request.
///
/// Either the explicit fields or, deprecated, a `paymentIntentId` whose
/// metadata and shipping details are used instead.
#[derive(Debug, Default, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub variant_id: Option<Value>,
    #[serde(default)]
    pub quantity: Option<Value>,
    #[serde(default, rename = "customerEmail")]
    pub customer_email: Option<String>,
    #[serde(default, rename = "customerName")]
    pub customer_name: Option<String>,
    #[serde(default, rename = "shippingAddress")]
    pub shipping_address: Option<AddressInput>,
    #[serde(default, rename = "billingAddress")]
    pub billing_address: Option<AddressInput>,
    #[serde(default, rename = "paymentIntentId")]
    pub payment_intent_id: Option<String>,
}

/// `POST /create-shopify-order` response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub message: String,
    pub order_id: u64,
    pub order: Value,
}

/// `POST /calculateShipping` request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateShippingRequest {
    #[serde(default)]
    pub shipping_address: Option<AddressInput>,
}

/// `POST /calculateShipping` response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateShippingResponse {
    pub supported_shipping_options: Vec<ShippingOption>,
}

/// `POST /api/logs` request
#[derive(Debug, Deserialize)]
pub struct ClientLogRequest {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub meta: Option<Value>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// `{message}` response used by the webhook and log endpoints
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Accept `10`, `10.5` or `"10.50"`.
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Unwrap a JSON body. Rejections (bad content type, syntax, or shape)
/// become `InvalidRequest` so each endpoint answers with its own fixed body.
fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, BridgeError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        BridgeError::InvalidRequest(format!(
            "rejected body ({}): {}",
            rejection.status(),
            rejection.body_text()
        ))
    })
}

/// Log the full error, answer with a fixed message
fn bridge_error_to_response(err: BridgeError, client_message: &str) -> ApiError {
    error!("{}: {}", client_message, err);
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::new(client_message)))
}

/// Render a JSON scalar as a plain string (`"2"` and `2` both become `2`)
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Product titles arrive as a string or a list of strings
fn product_titles_to_string(value: &Value) -> String {
    match value {
        Value::Array(titles) => titles
            .iter()
            .filter_map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_to_string(other).unwrap_or_default(),
    }
}

fn parse_quantity(value: Option<&Value>) -> Result<u32, BridgeError> {
    let Some(value) = value else {
        return Ok(1);
    };
    scalar_to_string(value)
        .and_then(|q| q.trim().parse().ok())
        .ok_or_else(|| BridgeError::InvalidRequest(format!("invalid quantity: {}", value)))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "storefront-bridge",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Publishable processor key for the browser
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        publishable_key: state.publishable_key.clone(),
    })
}

/// Create a card payment intent and return its client secret
#[instrument(skip_all, fields(amount = field::Empty, currency = field::Empty))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    payload: Result<Json<CreatePaymentIntentRequest>, JsonRejection>,
) -> Result<Json<CreatePaymentIntentResponse>, ApiError> {
    const FAILURE: &str = "Failed to create PaymentIntent";

    let request = parse_body(payload).map_err(|e| bridge_error_to_response(e, FAILURE))?;
    Span::current()
        .record("amount", request.amount)
        .record("currency", request.currency.as_str());

    // Metadata values all travel as strings
    let metadata = IntentMetadata {
        variant_id: request
            .variant_id
            .as_ref()
            .and_then(scalar_to_string)
            .unwrap_or_default(),
        product_titles: request
            .product_titles
            .as_ref()
            .map(product_titles_to_string)
            .unwrap_or_default(),
        quantity: request
            .quantity
            .as_ref()
            .and_then(scalar_to_string)
            .unwrap_or_default(),
    };

    // Minor-unit conversion happens here and nowhere else
    let intent_request = CurrencyCode::parse(&request.currency)
        .and_then(|currency| PaymentIntentRequest::card(request.amount, currency, metadata))
        .map_err(|e| bridge_error_to_response(e, FAILURE))?;

    let intent = state
        .payments
        .create_payment_intent(&intent_request)
        .await
        .map_err(|e| bridge_error_to_response(e, FAILURE))?;

    info!(
        "Created payment intent via {}: id={}",
        state.payments.provider_name(),
        intent.id
    );

    Ok(Json(CreatePaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

/// Resolve the order details from either calling convention
async fn order_details(
    state: &AppState,
    request: CreateOrderRequest,
) -> Result<OrderDetails, BridgeError> {
    // Explicit fields
    if let Some(variant_id) = request.variant_id.as_ref().and_then(scalar_to_string) {
        let shipping_address = request.shipping_address.unwrap_or_default();
        let billing_address = request
            .billing_address
            .unwrap_or_else(|| shipping_address.clone());

        return Ok(OrderDetails {
            variant_id,
            quantity: parse_quantity(request.quantity.as_ref())?,
            customer_email: request.customer_email.unwrap_or_default(),
            customer_name: request.customer_name.unwrap_or_default(),
            shipping_address,
            billing_address,
        });
    }

    // Deprecated: recover everything from the payment intent
    match request.payment_intent_id {
        Some(intent_id) => {
            warn!(
                "Order requested by payment intent id ({}); this form is deprecated",
                intent_id
            );
            state
                .payments
                .retrieve_payment_intent(&intent_id)
                .await?
                .order_details()
        }
        None => Err(BridgeError::InvalidRequest(
            "variant_id or paymentIntentId is required".to_string(),
        )),
    }
}

/// Place a paid order on the commerce platform
#[instrument(skip_all)]
pub async fn create_shopify_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Json<CreateOrderResponse>, ApiError> {
    const FAILURE: &str = "Failed to create order";

    let request = parse_body(payload).map_err(|e| bridge_error_to_response(e, FAILURE))?;

    let details = order_details(&state, request)
        .await
        .map_err(|e| bridge_error_to_response(e, FAILURE))?;

    // Build the admin payload
    let order = Order::from_details(&details).map_err(|e| bridge_error_to_response(e, FAILURE))?;

    // Submit (single attempt)
    let created = state
        .admin
        .create_order(&order)
        .await
        .map_err(|e| bridge_error_to_response(e, FAILURE))?;

    Ok(Json(CreateOrderResponse {
        message: "Order created successfully".to_string(),
        order_id: created.id,
        order: created.order,
    }))
}

/// Flat shipping options for a destination
#[instrument(skip_all)]
pub async fn calculate_shipping(
    State(state): State<AppState>,
    payload: Result<Json<CalculateShippingRequest>, JsonRejection>,
) -> Result<Json<CalculateShippingResponse>, (StatusCode, Json<Value>)> {
    let quote = parse_body(payload).and_then(|request| {
        let country = request
            .shipping_address
            .as_ref()
            .and_then(|a| a.country.as_deref());
        state.shipping.quote(country).map(<[ShippingOption]>::to_vec)
    });

    match quote {
        Ok(options) => Ok(Json(CalculateShippingResponse {
            supported_shipping_options: options,
        })),
        Err(e) => {
            info!("Shipping quote refused: {}", e);
            Err((
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "status": "invalid_shipping_address" })),
            ))
        }
    }
}

/// Get single product
#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, &'static str)> {
    let product = state.storefront.fetch_product(&product_id).await.map_err(|e| {
        error!("Error fetching product {}: {}", product_id, e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Error fetching product")
    })?;

    Ok(Json(serde_json::json!({ "product": product })))
}

/// Get available products
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, &'static str)> {
    let listing = state.storefront.fetch_products().await.map_err(|e| {
        error!("Error fetching products: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Error fetching products")
    })?;

    Ok(Json(listing))
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// Handle an order-payment webhook. The body is taken as raw bytes so the
/// signature is checked against exactly what was sent.
#[instrument(skip(state, headers, body))]
pub async fn order_payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<MessageResponse>) {
    let event = WebhookEvent {
        payload: body.to_vec(),
        signature: header_string(&headers, HEADER_HMAC),
        topic: header_string(&headers, HEADER_TOPIC),
        shop_domain: header_string(&headers, HEADER_SHOP_DOMAIN),
        webhook_id: header_string(&headers, HEADER_WEBHOOK_ID),
    };

    // Verify before reading anything from the payload
    if !state.webhooks.verify_event(&event).is_valid() {
        warn!(
            "Discarding webhook with invalid signature: {}",
            BridgeError::InvalidWebhookSignature
        );
        return (
            StatusCode::BAD_REQUEST,
            Json(MessageResponse::new("Webhook verification failed")),
        );
    }

    info!(
        "Received webhook: topic={:?}, shop={:?}, id={:?}, order={:?}",
        event.topic,
        event.shop_domain,
        event.webhook_id,
        event.order_reference()
    );

    (
        StatusCode::OK,
        Json(MessageResponse::new("Webhook received successfully")),
    )
}

/// Re-emit a client-side log line through the server's logger
pub async fn client_log(
    payload: Result<Json<ClientLogRequest>, JsonRejection>,
) -> (StatusCode, Json<MessageResponse>) {
    let entry = match parse_body(payload) {
        Ok(entry) => entry,
        Err(e) => {
            warn!("Discarding client log entry: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(MessageResponse::new("Invalid log entry")),
            );
        }
    };

    let meta = entry.meta.unwrap_or(Value::Null);
    let level = entry.level.as_deref().unwrap_or("info").to_ascii_lowercase();

    match level.as_str() {
        "error" => error!(target: "client", %meta, "{}", entry.message),
        "warn" | "warning" => warn!(target: "client", %meta, "{}", entry.message),
        "debug" => debug!(target: "client", %meta, "{}", entry.message),
        _ => info!(target: "client", %meta, "{}", entry.message),
    }

    (StatusCode::OK, Json(MessageResponse::new("Log received")))
}
