//! The JSON gateway end to end, in front of the fake backends.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use cybermart_integration_tests::{
    BUYER_EMAIL, BUYER_PASSWORD, BUYER_TOKEN, FakeMarketplace, LAMP_ID, MUG_ID, SELLER_ID,
    SELLER_TOKEN, SHIRT_ID,
};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Send one request through the gateway; non-JSON bodies come back as strings.
async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::GET, uri, token, None).await
}

// ============================================================================
// Health and auth
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let fake = FakeMarketplace::start().await;
    let app = fake.gateway();

    let (status, body) = get(&app, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));

    let (status, _) = get(&app, "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let fake = FakeMarketplace::start().await;
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-42")
        .body(Body::empty())
        .unwrap();

    let response = fake.gateway().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-42");
}

#[tokio::test]
async fn test_protected_routes_need_bearer() {
    let fake = FakeMarketplace::start().await;
    let app = fake.gateway();

    let (status, body) = get(&app, "/cart", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = get(&app, "/checkout", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_and_account() {
    let fake = FakeMarketplace::start().await;
    let app = fake.gateway();

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": BUYER_EMAIL, "password": BUYER_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(token, BUYER_TOKEN);

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": BUYER_EMAIL, "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = get(&app, "/account", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Bea Buyer");

    let (status, _) = send(&app, Method::POST, "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_signup_checks_confirmation_first() {
    let fake = FakeMarketplace::start().await;
    let app = fake.gateway();

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({
            "name": "Casey",
            "email": "casey@example.com",
            "password": "abc",
            "confirm_password": "abd",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Passwords do not match");
    assert_eq!(fake.data().users.len(), 2);

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({
            "name": "Casey",
            "email": "casey@example.com",
            "password": "abc",
            "confirm_password": "abc",
            "role": "seller",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(fake.data().users.len(), 3);
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_product_listing_sorted() {
    let fake = FakeMarketplace::start().await;
    let app = fake.gateway();

    let (status, body) = get(&app, "/products?sort=price-asc", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![MUG_ID, SHIRT_ID, LAMP_ID]);

    let (status, _) = get(&app, "/products?sort=sideways", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_detail_for_shopper() {
    let fake = FakeMarketplace::start().await;
    fake.seed_cart(BUYER_TOKEN, SHIRT_ID, 2);
    let app = fake.gateway();

    let (status, body) = get(&app, &format!("/products/{SHIRT_ID}"), Some(BUYER_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["name"], "Cotton Shirt");
    assert_eq!(body["seller"]["name"], "Sam Seller");
    assert_eq!(body["cart_entry"]["quantity"], 2);
    assert_eq!(body["in_cart"], true);
    assert_eq!(body["in_wishlist"], false);

    let (status, body) = get(&app, &format!("/products/{LAMP_ID}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["cart_entry"].is_null());

    let (status, body) = get(&app, "/products/gone", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");
}

#[tokio::test]
async fn test_seller_page() {
    let fake = FakeMarketplace::start().await;
    let app = fake.gateway();

    let (status, body) = get(&app, &format!("/sellers/{SELLER_ID}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["seller"]["name"], "Sam Seller");
    assert_eq!(body["products"].as_array().unwrap().len(), 3);
}

// ============================================================================
// Cart and wishlist
// ============================================================================

#[tokio::test]
async fn test_add_and_remove_cart_items() {
    let fake = FakeMarketplace::start().await;
    let app = fake.gateway();
    let token = Some(BUYER_TOKEN);

    let (status, body) = send(
        &app,
        Method::POST,
        "/cart/items",
        token,
        Some(json!({ "product_id": SHIRT_ID, "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item_count"], 1);
    assert_eq!(body["unit_count"], 2);
    assert_eq!(body["total_minor"], 3998);

    let (_, body) = send(
        &app,
        Method::POST,
        "/cart/items",
        token,
        Some(json!({ "product_id": MUG_ID })),
    )
    .await;
    assert_eq!(body["item_count"], 2);
    assert_eq!(body["total_minor"], 4848);

    let (status, body) = send(
        &app,
        Method::POST,
        "/cart/items",
        token,
        Some(json!({ "product_id": MUG_ID, "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Quantity must be at least 1");

    let (_, body) = get(&app, "/cart/membership", token).await;
    assert_eq!(body["product_ids"], json!([MUG_ID, SHIRT_ID]));

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/cart/items/{MUG_ID}"),
        token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item_count"], 1);
    assert_eq!(body["total_minor"], 3998);
}

#[tokio::test]
async fn test_cart_toggle() {
    let fake = FakeMarketplace::start().await;
    let app = fake.gateway();
    let uri = format!("/cart/membership/{LAMP_ID}/toggle");

    let (status, body) = send(&app, Method::POST, &uri, Some(BUYER_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["member"], true);
    assert_eq!(fake.data().carts[BUYER_TOKEN][0].color.as_deref(), Some("Black"));

    let (_, body) = send(&app, Method::POST, &uri, Some(BUYER_TOKEN), None).await;
    assert_eq!(body["member"], false);
    assert!(fake.data().carts[BUYER_TOKEN].is_empty());
}

#[tokio::test]
async fn test_wishlist_toggle_and_set() {
    let fake = FakeMarketplace::start().await;
    let app = fake.gateway();
    let token = Some(BUYER_TOKEN);

    let toggle = format!("/wishlist/{MUG_ID}/toggle");
    let (_, body) = send(&app, Method::POST, &toggle, token, None).await;
    assert_eq!(body["member"], true);
    assert_eq!(body["kind"], "wishlist");
    let (_, body) = send(&app, Method::POST, &toggle, token, None).await;
    assert_eq!(body["member"], false);
    assert_eq!(fake.data().wishlist_writes, 2);

    let set = format!("/wishlist/{SHIRT_ID}");
    for _ in 0..2 {
        let (status, body) = send(
            &app,
            Method::PUT,
            &set,
            token,
            Some(json!({ "in_wishlist": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["member"], true);
    }
    assert_eq!(fake.data().wishlist_writes, 3);

    let (_, body) = get(&app, "/wishlist", token).await;
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product_id"], SHIRT_ID);
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_places_one_order() {
    let fake = FakeMarketplace::start().await;
    fake.seed_cart(BUYER_TOKEN, SHIRT_ID, 2);
    fake.seed_cart(BUYER_TOKEN, MUG_ID, 1);
    let app = fake.gateway();
    let token = Some(BUYER_TOKEN);

    let (status, body) = send(&app, Method::POST, "/checkout", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payment"]["amount_minor"], 4848);
    assert_eq!(body["publishable_key"], "pk_test_fake");
    assert!(body["checkout_id"].is_string());

    // Cart edits are refused while the payment widget is open
    let (status, _) = send(
        &app,
        Method::POST,
        "/cart/items",
        token,
        Some(json!({ "product_id": LAMP_ID })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let outcome = json!({ "succeeded": true });
    let (status, body) = send(&app, Method::POST, "/checkout/payment", token, Some(outcome.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "success");
    assert_eq!(body["receipt"]["order_id"], "order-1");
    assert_eq!(body["redirect_to"], "/orders");

    let (status, body) = send(&app, Method::POST, "/checkout/payment", token, Some(outcome)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["receipt"]["order_id"], "order-1");
    assert_eq!(fake.data().order_posts, 1);
    assert_eq!(fake.data().payment_intents, vec![4848]);

    let (_, body) = get(&app, "/orders", token).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_checkout_with_empty_cart() {
    let fake = FakeMarketplace::start().await;
    let app = fake.gateway();

    let (status, body) = send(&app, Method::POST, "/checkout", Some(BUYER_TOKEN), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Your cart is empty");
    assert!(fake.data().payment_intents.is_empty());
}

#[tokio::test]
async fn test_payment_failure_then_cancel() {
    let fake = FakeMarketplace::start().await;
    fake.seed_cart(BUYER_TOKEN, LAMP_ID, 1);
    let app = fake.gateway();
    let token = Some(BUYER_TOKEN);

    send(&app, Method::POST, "/checkout", token, None).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/checkout/payment",
        token,
        Some(json!({ "succeeded": false, "message": "insufficient funds" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "failed");
    assert_eq!(body["message"], "Payment failed: insufficient funds");

    let (status, _) = send(&app, Method::DELETE, "/checkout/payment", token, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::POST, "/checkout", token, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, Method::DELETE, "/checkout/payment", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "loaded");
    assert_eq!(fake.data().order_posts, 0);
}

// ============================================================================
// Selling
// ============================================================================

#[tokio::test]
async fn test_seller_summary_and_status() {
    let fake = FakeMarketplace::start().await;
    fake.seed_cart(BUYER_TOKEN, SHIRT_ID, 1);
    let app = fake.gateway();

    send(&app, Method::POST, "/checkout", Some(BUYER_TOKEN), None).await;
    send(
        &app,
        Method::POST,
        "/checkout/payment",
        Some(BUYER_TOKEN),
        Some(json!({ "succeeded": true })),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/seller/sales/order-1/status",
        Some(SELLER_TOKEN),
        Some(json!({ "status": "delivered" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Delivered");

    let (status, body) = get(&app, "/seller/sales/summary", Some(SELLER_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order_count"], 1);
    assert_eq!(body["units_sold"], 1);
    assert_eq!(body["by_status"]["delivered"], 1);
    assert_eq!(body["by_status"]["pending"], 0);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/seller/products/{LAMP_ID}"),
        Some(BUYER_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "You can only delete products you own");
}
