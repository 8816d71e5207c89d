use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use bridge_api::{create_router, AppConfig, AppState};
use bridge_core::{
    BridgeError, BridgeResult, IntentShipping, PaymentIntent, PaymentIntentRequest,
    PaymentProcessor, ShippingRates,
};
use bridge_shopify::{ShopifyConfig, WebhookVerifier};
use bridge_stripe::StripeConfig;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WEBHOOK_SECRET: &str = "webhook-secret";

/// Records create requests; fails them when `fail` is set
#[derive(Default)]
struct FakeProcessor {
    requests: Mutex<Vec<PaymentIntentRequest>>,
    fail: bool,
}

fn intent(amount: i64, metadata: BTreeMap<String, String>) -> PaymentIntent {
    PaymentIntent {
        id: "pi_fake".to_string(),
        client_secret: "pi_fake_secret_123".to_string(),
        amount,
        currency: "usd".to_string(),
        status: Some("succeeded".to_string()),
        metadata,
        receipt_email: Some("ada@example.com".to_string()),
        shipping: Some(IntentShipping {
            name: Some("Ada Lovelace".to_string()),
            phone: None,
            address: Some(bridge_core::AddressInput {
                line1: Some("1 Main St".to_string()),
                city: Some("Boston".to_string()),
                state: Some("MA".to_string()),
                country: Some("US".to_string()),
                postal_code: Some("02110".to_string()),
                ..Default::default()
            }),
        }),
        created: None,
    }
}

#[async_trait]
impl PaymentProcessor for FakeProcessor {
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> BridgeResult<PaymentIntent> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(BridgeError::PaymentIntentCreationFailed(
                "card_declined: internal detail".to_string(),
            ));
        }
        Ok(intent(request.amount, request.metadata.clone()))
    }

    async fn retrieve_payment_intent(&self, intent_id: &str) -> BridgeResult<PaymentIntent> {
        assert_eq!(intent_id, "pi_fake");
        let metadata = BTreeMap::from([
            ("variantId".to_string(), "gid://shopify/ProductVariant/77".to_string()),
            ("quantity".to_string(), "2".to_string()),
        ]);
        Ok(intent(2000, metadata))
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

struct Harness {
    server: TestServer,
    shopify: MockServer,
    processor: Arc<FakeProcessor>,
}

async fn harness_with(processor: FakeProcessor) -> Harness {
    let shopify = MockServer::start().await;
    let shopify_config =
        ShopifyConfig::new("shop.myshopify.com", "sf-token", "shpat_admin", WEBHOOK_SECRET)
            .with_base_url(shopify.uri());
    let stripe_config = StripeConfig::new("sk_test_abc", "pk_test_publishable");

    let processor = Arc::new(processor);
    let state = AppState::new(
        AppConfig::default(),
        stripe_config,
        shopify_config,
        ShippingRates::default(),
    )
    .unwrap()
    .with_payments(processor.clone());

    Harness {
        server: TestServer::new(create_router(state)).unwrap(),
        shopify,
        processor,
    }
}

async fn harness() -> Harness {
    harness_with(FakeProcessor::default()).await
}

#[tokio::test]
async fn config_returns_publishable_key() {
    let h = harness().await;

    let response = h.server.get("/config").await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({ "publishableKey": "pk_test_publishable" })
    );
}

#[tokio::test]
async fn payment_intent_amount_is_sent_in_minor_units() {
    let h = harness().await;

    let response = h
        .server
        .post("/create-payment-intent")
        .json(&json!({
            "amount": 10.00,
            "currency": "USD",
            "variantId": "gid://shopify/ProductVariant/11",
            "productTitles": ["Shirt", "Hat"],
            "quantity": 2
        }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({ "clientSecret": "pi_fake_secret_123" })
    );

    let requests = h.processor.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].amount, 1000);
    assert_eq!(requests[0].currency.as_str(), "usd");
    assert_eq!(requests[0].payment_method_types, vec!["card".to_string()]);
    assert_eq!(requests[0].metadata["quantity"], "2");
    assert_eq!(requests[0].metadata["productTitles"], "Shirt, Hat");
}

#[tokio::test]
async fn payment_intent_failure_is_generic() {
    let h = harness_with(FakeProcessor {
        fail: true,
        ..Default::default()
    })
    .await;

    let response = h
        .server
        .post("/create-payment-intent")
        .json(&json!({ "amount": 5, "currency": "usd" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Failed to create PaymentIntent" })
    );
}

#[tokio::test]
async fn shipping_is_gated_on_country() {
    let h = harness().await;

    let response = h
        .server
        .post("/calculateShipping")
        .json(&json!({ "shippingAddress": { "country": "CA", "city": "Toronto" } }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "status": "invalid_shipping_address" })
    );

    let response = h
        .server
        .post("/calculateShipping")
        .json(&json!({ "shippingAddress": { "country": "US" } }))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    let ids: Vec<_> = body["supportedShippingOptions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["standard", "express"]);
}

#[tokio::test]
async fn product_listing_only_contains_available_products() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/api/2023-10/graphql.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "products": {
                "edges": [
                    { "node": { "id": "p1", "title": "One", "availableForSale": false } },
                    { "node": { "id": "p2", "title": "Two", "availableForSale": true } }
                ],
                "pageInfo": { "hasNextPage": false, "endCursor": "c2" }
            } }
        })))
        .mount(&h.shopify)
        .await;

    let response = h.server.get("/api/products").await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({
            "products": [{ "id": "p2", "title": "Two", "available": true }],
            "pageInfo": { "hasNextPage": false, "endCursor": "c2" }
        })
    );
}

#[tokio::test]
async fn single_product_is_flattened() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/api/2023-10/graphql.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "product": {
                "id": "gid://shopify/Product/1",
                "title": "Shirt",
                "description": "Soft",
                "variants": { "edges": [
                    { "node": { "id": "v1", "priceV2": { "amount": "29.99", "currencyCode": "USD" } } }
                ] },
                "images": { "edges": [ { "node": { "src": "https://cdn.example.com/a.jpg" } } ] }
            } }
        })))
        .mount(&h.shopify)
        .await;

    let response = h.server.get("/api/products/1").await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({ "product": {
            "id": "gid://shopify/Product/1",
            "variant_id": "v1",
            "title": "Shirt",
            "description": "Soft",
            "images": ["https://cdn.example.com/a.jpg"],
            "price": "29.99",
            "currency": "USD"
        } })
    );
}

#[tokio::test]
async fn product_without_variants_is_a_server_error() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/api/2023-10/graphql.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "product": {
                "id": "gid://shopify/Product/1",
                "title": "Shirt",
                "description": "",
                "variants": { "edges": [] },
                "images": { "edges": [] }
            } }
        })))
        .mount(&h.shopify)
        .await;

    let response = h.server.get("/api/products/1").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "Error fetching product");
}

#[tokio::test]
async fn order_is_submitted_with_fallback_addresses() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/admin/api/2023-10/orders.json"))
        .and(body_partial_json(json!({
            "order": {
                "email": "ada@example.com",
                "customer": { "first_name": "Ada", "last_name": "Lovelace" },
                "shipping_address": {
                    "address1": "500 Market St",
                    "address2": "",
                    "city": "N/A",
                    "province": "CA",
                    "zip": "94105"
                },
                "financial_status": "paid",
                "inventory_behaviour": "decrement_obeying_policy"
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "order": { "id": 1001, "name": "#1001" }
        })))
        .expect(1)
        .mount(&h.shopify)
        .await;

    let response = h
        .server
        .post("/create-shopify-order")
        .json(&json!({
            "variant_id": "gid://shopify/ProductVariant/11",
            "quantity": 1,
            "customerEmail": "ada@example.com",
            "customerName": "Ada Lovelace",
            "shippingAddress": {
                "addressLine": ["500 Market St"],
                "region": "CA",
                "postalCode": "94105",
                "country": "US"
            },
            "billingAddress": { "line1": "1 Main St", "city": "Boston", "country": "US" }
        }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({
            "message": "Order created successfully",
            "orderId": 1001,
            "order": { "id": 1001, "name": "#1001" }
        })
    );
}

#[tokio::test]
async fn rejected_order_is_a_generic_server_error() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/admin/api/2023-10/orders.json"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({ "errors": "bad variant" })))
        .expect(1)
        .mount(&h.shopify)
        .await;

    let response = h
        .server
        .post("/create-shopify-order")
        .json(&json!({
            "variant_id": "11",
            "quantity": 1,
            "customerEmail": "ada@example.com",
            "customerName": "Ada"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Failed to create order" })
    );
}

#[tokio::test]
async fn order_by_payment_intent_uses_intent_details() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/admin/api/2023-10/orders.json"))
        .and(body_partial_json(json!({
            "order": {
                "line_items": [{ "variant_id": 77, "quantity": 2 }],
                "shipping_address": { "city": "Boston", "zip": "02110" },
                "billing_address": { "city": "Boston" }
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "order": { "id": 7 } })))
        .expect(1)
        .mount(&h.shopify)
        .await;

    let response = h
        .server
        .post("/create-shopify-order")
        .json(&json!({ "paymentIntentId": "pi_fake" }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["orderId"], 7);
}

#[tokio::test]
async fn order_without_variant_or_intent_is_rejected() {
    let h = harness().await;

    let response = h
        .server
        .post("/create-shopify-order")
        .json(&json!({ "customerEmail": "ada@example.com" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Failed to create order" })
    );
}

fn hmac_header() -> HeaderName {
    HeaderName::from_static("x-shopify-hmac-sha256")
}

#[tokio::test]
async fn webhook_with_valid_signature_is_accepted() {
    let h = harness().await;
    let body = br##"{"id": 820982911946154508, "name": "#9999"}"##;
    let signature = WebhookVerifier::new(WEBHOOK_SECRET).sign(body);

    let response = h
        .server
        .post("/webhooks/order-payment")
        .add_header(hmac_header(), HeaderValue::from_str(&signature).unwrap())
        .bytes(Bytes::from_static(body))
        .await;

    response.assert_status_ok();
    assert!(response.json::<Value>()["message"].is_string());
}

#[tokio::test]
async fn webhook_with_mutated_body_is_rejected() {
    let h = harness().await;
    let body = br##"{"id": 820982911946154508, "name": "#9999"}"##;
    let signature = WebhookVerifier::new(WEBHOOK_SECRET).sign(body);

    let response = h
        .server
        .post("/webhooks/order-payment")
        .add_header(hmac_header(), HeaderValue::from_str(&signature).unwrap())
        .bytes(Bytes::from_static(br##"{"id": 820982911946154509, "name": "#9999"}"##))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["message"].is_string());
}

#[tokio::test]
async fn webhook_without_signature_is_rejected() {
    let h = harness().await;

    let response = h
        .server
        .post("/webhooks/order-payment")
        .bytes(Bytes::from_static(b"{}"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn client_logs_are_acknowledged() {
    let h = harness().await;

    let response = h
        .server
        .post("/api/logs")
        .json(&json!({ "level": "warn", "message": "checkout slow", "meta": { "ms": 5400 } }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "message": "Log received" }));
}

#[tokio::test]
async fn payment_intent_amount_may_be_a_numeric_string() {
    let h = harness().await;

    let response = h
        .server
        .post("/create-payment-intent")
        .json(&json!({ "amount": "10.00", "currency": "usd" }))
        .await;

    response.assert_status_ok();
    assert_eq!(h.processor.requests.lock().unwrap()[0].amount, 1000);
}

#[tokio::test]
async fn rejected_payment_intent_bodies_get_the_fixed_error() {
    let h = harness().await;

    let response = h
        .server
        .post("/create-payment-intent")
        .json(&json!({ "amount": "ten dollars", "currency": "usd" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Failed to create PaymentIntent" })
    );

    let response = h
        .server
        .post("/create-payment-intent")
        .text("amount=10&currency=usd")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Failed to create PaymentIntent" })
    );

    assert!(h.processor.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn large_amounts_are_rejected_before_the_processor() {
    let h = harness().await;

    let response = h
        .server
        .post("/create-payment-intent")
        .json(&json!({ "amount": 1e12, "currency": "usd" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(h.processor.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn order_accepts_numeric_postal_code() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/admin/api/2023-10/orders.json"))
        .and(body_partial_json(json!({
            "order": { "shipping_address": { "zip": "94105" } }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "order": { "id": 5 } })))
        .expect(1)
        .mount(&h.shopify)
        .await;

    let response = h
        .server
        .post("/create-shopify-order")
        .json(&json!({
            "variant_id": 11,
            "quantity": "1",
            "customerEmail": "ada@example.com",
            "customerName": "Ada Lovelace",
            "shippingAddress": { "line1": "500 Market St", "postal_code": 94105, "country": "US" }
        }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["orderId"], 5);
}

#[tokio::test]
async fn malformed_order_body_gets_the_fixed_error() {
    let h = harness().await;

    let response = h
        .server
        .post("/create-shopify-order")
        .bytes(Bytes::from_static(b"{\"variant_id\": "))
        .content_type("application/json")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Failed to create order" })
    );
}

#[tokio::test]
async fn order_for_a_product_gid_is_rejected() {
    let h = harness().await;

    let response = h
        .server
        .post("/create-shopify-order")
        .json(&json!({
            "variant_id": "gid://shopify/Product/11",
            "customerEmail": "ada@example.com",
            "customerName": "Ada"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "error": "Failed to create order" })
    );
}

#[tokio::test]
async fn shipping_accepts_numeric_postal_code_and_rejects_bad_bodies() {
    let h = harness().await;

    let response = h
        .server
        .post("/calculateShipping")
        .json(&json!({ "shippingAddress": { "country": "US", "postalCode": 10001 } }))
        .await;
    response.assert_status_ok();

    let response = h
        .server
        .post("/calculateShipping")
        .json(&json!({ "shippingAddress": "somewhere in Ohio" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "status": "invalid_shipping_address" })
    );

    let response = h.server.post("/calculateShipping").text("US").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "status": "invalid_shipping_address" })
    );
}

#[tokio::test]
async fn malformed_client_log_is_rejected() {
    let h = harness().await;

    let response = h.server.post("/api/logs").text("boom").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>(),
        json!({ "message": "Invalid log entry" })
    );
}
