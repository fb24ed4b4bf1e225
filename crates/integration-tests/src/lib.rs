//! Integration tests for CyberMart.
//!
//! [`FakeMarketplace`] serves in-process stand-ins for the profile, catalog
//! and cart/order services, each on its own ephemeral port. Tests point the
//! real `reqwest` clients, or the whole gateway router, at them.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cybermart-integration-tests
//! ```
//!
//! # Seed Data
//!
//! - a buyer ([`BUYER_EMAIL`], token [`BUYER_TOKEN`])
//! - a seller ([`SELLER_EMAIL`], token [`SELLER_TOKEN`], id [`SELLER_ID`])
//! - three products: [`SHIRT_ID`] (sizes and colors), [`MUG_ID`] (price sent
//!   as a string) and [`LAMP_ID`], all listed by the seller

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use cybermart_core::BearerToken;
use cybermart_storefront::backend::Marketplace;
use cybermart_storefront::config::{ServiceEndpoints, StorefrontConfig};
use cybermart_storefront::state::AppState;
use serde_json::{Value, json};

pub const BUYER_EMAIL: &str = "buyer@example.com";
pub const BUYER_PASSWORD: &str = "hunter22";
pub const BUYER_TOKEN: &str = "buyer-token";
pub const BUYER_ID: &str = "user-buyer";

pub const SELLER_EMAIL: &str = "seller@example.com";
pub const SELLER_PASSWORD: &str = "sell-sell";
pub const SELLER_TOKEN: &str = "seller-token";
pub const SELLER_ID: &str = "user-seller";

pub const SHIRT_ID: &str = "prod-shirt";
pub const MUG_ID: &str = "prod-mug";
pub const LAMP_ID: &str = "prod-lamp";

// =============================================================================
// Fake State
// =============================================================================

/// A registered account.
#[derive(Debug, Clone)]
pub struct FakeUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub role: String,
    pub token: String,
    pub about: Option<String>,
    pub address: Option<String>,
}

impl FakeUser {
    fn to_json(&self) -> Value {
        json!({
            "_id": self.id,
            "name": self.name,
            "email": self.email,
            "phone": self.phone,
            "role": self.role,
            "about": self.about,
            "address": self.address,
            "img": null,
        })
    }
}

/// One cart or order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeLine {
    pub product_id: String,
    pub amount: u32,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// A placed order.
#[derive(Debug, Clone)]
pub struct FakeOrder {
    pub id: String,
    pub buyer_token: String,
    pub buyer_id: String,
    pub lines: Vec<FakeLine>,
    pub amount: String,
    pub status: String,
}

/// Everything the fake backends know, plus counters and failure switches
/// for assertions.
#[derive(Debug, Default)]
pub struct FakeData {
    pub users: Vec<FakeUser>,
    pub products: Vec<Value>,
    pub carts: HashMap<String, Vec<FakeLine>>,
    pub wishlists: HashMap<String, Vec<String>>,
    pub orders: Vec<FakeOrder>,
    /// Idempotency key to order ID.
    pub idempotency: HashMap<String, String>,
    /// Amounts (minor units) of every payment intent requested.
    pub payment_intents: Vec<i64>,
    /// Orders actually created (repeats with a known key excluded).
    pub order_posts: usize,
    pub wishlist_writes: usize,
    pub cart_writes: usize,
    pub fail_payment_intent: bool,
    pub fail_order: bool,
}

impl FakeData {
    fn seeded() -> Self {
        let users = vec![
            FakeUser {
                id: BUYER_ID.to_string(),
                name: "Bea Buyer".to_string(),
                email: BUYER_EMAIL.to_string(),
                password: BUYER_PASSWORD.to_string(),
                phone: "555-0100".to_string(),
                role: "Buyer".to_string(),
                token: BUYER_TOKEN.to_string(),
                about: None,
                address: Some("1 Main St".to_string()),
            },
            FakeUser {
                id: SELLER_ID.to_string(),
                name: "Sam Seller".to_string(),
                email: SELLER_EMAIL.to_string(),
                password: SELLER_PASSWORD.to_string(),
                phone: "555-0199".to_string(),
                role: "Seller".to_string(),
                token: SELLER_TOKEN.to_string(),
                about: Some("Handmade goods".to_string()),
                address: None,
            },
        ];

        let products = vec![
            json!({
                "_id": SHIRT_ID,
                "name": "Cotton Shirt",
                "desc": "Soft and breathable",
                "price": 19.99,
                "stock": 12,
                "available": true,
                "type": "Fashion",
                "sizes": ["S", "M", "L"],
                "colors": ["Red", "Blue"],
                "img": ["https://img.example.com/shirt.jpg"],
                "seller": SELLER_ID,
            }),
            json!({
                "_id": MUG_ID,
                "name": "Coffee Mug",
                "desc": "Holds coffee",
                "price": "8.50",
                "stock": "40",
                "type": "Home and Kitchen",
                "sizes": null,
                "colors": [],
                "img": [],
                "seller": { "_id": SELLER_ID, "name": "Sam Seller" },
            }),
            json!({
                "_id": LAMP_ID,
                "name": "Desk Lamp",
                "desc": "Bright",
                "price": 45,
                "stock": 3,
                "available": true,
                "type": "Electronics",
                "sizes": [],
                "colors": ["Black"],
                "img": [],
                "seller": SELLER_ID,
            }),
        ];

        Self {
            users,
            products,
            ..Self::default()
        }
    }

    fn user_by_token(&self, token: &str) -> Option<&FakeUser> {
        self.users.iter().find(|u| u.token == token)
    }

    fn product(&self, id: &str) -> Option<&Value> {
        self.products.iter().find(|p| p["_id"] == id)
    }

    /// Populated product document, or the bare id if it no longer exists.
    fn product_ref(&self, id: &str) -> Value {
        self.product(id).cloned().unwrap_or_else(|| Value::String(id.to_string()))
    }

    fn line_json(&self, line: &FakeLine) -> Value {
        json!({
            "product": self.product_ref(&line.product_id),
            "amount": line.amount,
            "size": line.size,
            "color": line.color,
        })
    }

    fn order_json(&self, order: &FakeOrder) -> Value {
        json!({
            "_id": order.id,
            "items": order.lines.iter().map(|line| self.line_json(line)).collect::<Vec<_>>(),
            "amount": order.amount,
            "status": order.status,
            "user": order.buyer_id,
            "createdAt": "2026-01-05T10:00:00Z",
            "updatedAt": "2026-01-05T10:00:00Z",
        })
    }
}

type Shared = Arc<Mutex<FakeData>>;

fn lock(state: &Shared) -> MutexGuard<'_, FakeData> {
    state.lock().unwrap()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn unauthorized() -> Response {
    error(StatusCode::UNAUTHORIZED, "Unauthorized")
}

/// Resolve the caller's user, or answer 401.
fn caller(data: &FakeData, headers: &HeaderMap) -> Result<FakeUser, Response> {
    bearer(headers)
        .and_then(|token| data.user_by_token(&token).cloned())
        .ok_or_else(unauthorized)
}

fn first_choice(value: &Value) -> Option<String> {
    value
        .as_array()
        .and_then(|list| list.first())
        .and_then(Value::as_str)
        .map(str::to_string)
}

// =============================================================================
// Profile Service
// =============================================================================

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let data = lock(&state);
    data.users
        .iter()
        .find(|u| u.email == body["email"] && u.password == body["password"])
        .map_or_else(
            || error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
            |u| Json(json!({ "token": u.token })).into_response(),
        )
}

async fn signup(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut data = lock(&state);
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if data.users.iter().any(|u| u.email == email) {
        return error(StatusCode::BAD_REQUEST, "User already exists");
    }
    let id = format!("user-{}", data.users.len() + 1);
    data.users.push(FakeUser {
        id,
        name: body["name"].as_str().unwrap_or_default().to_string(),
        token: format!("token-{email}"),
        email,
        password: body["password"].as_str().unwrap_or_default().to_string(),
        phone: body["phone"].as_str().unwrap_or_default().to_string(),
        role: body["role"].as_str().unwrap_or("Buyer").to_string(),
        about: None,
        address: None,
    });
    (StatusCode::CREATED, Json(json!({ "message": "User created" }))).into_response()
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let data = lock(&state);
    match caller(&data, &headers) {
        Ok(user) => Json(user.to_json()).into_response(),
        Err(response) => response,
    }
}

async fn update_profile(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut data = lock(&state);
    let user = match caller(&data, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Some(stored) = data.users.iter_mut().find(|u| u.id == user.id) {
        if let Some(name) = body["name"].as_str() {
            stored.name = name.to_string();
        }
        if let Some(phone) = body["phone"].as_str() {
            stored.phone = phone.to_string();
        }
        if let Some(about) = body["about"].as_str() {
            stored.about = Some(about.to_string());
        }
        if let Some(address) = body["address"].as_str() {
            stored.address = Some(address.to_string());
        }
    }
    Json(json!({ "message": "Profile updated" })).into_response()
}

async fn seller_profile(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let data = lock(&state);
    data.users
        .iter()
        .find(|u| u.id == id && u.role == "Seller")
        .map_or_else(
            || error(StatusCode::NOT_FOUND, "Seller not found"),
            |u| Json(json!({ "user": u.to_json() })).into_response(),
        )
}

fn profile_router(state: Shared) -> Router {
    Router::new()
        .route("/", get(me))
        .route("/login", post(login))
        .route("/signup", post(signup))
        .route("/profile", put(update_profile))
        .route("/seller-profile/{id}", get(seller_profile))
        .with_state(state)
}

// =============================================================================
// Catalog Service
// =============================================================================

async fn list_products(State(state): State<Shared>) -> Json<Value> {
    Json(Value::Array(lock(&state).products.clone()))
}

async fn get_product(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    lock(&state).product(&id).cloned().map_or_else(
        || error(StatusCode::NOT_FOUND, "Product not found"),
        |p| Json(p).into_response(),
    )
}

fn filtered(state: &Shared, keep: impl Fn(&Value) -> bool) -> Json<Value> {
    Json(Value::Array(
        lock(state).products.iter().filter(|p| keep(p)).cloned().collect(),
    ))
}

fn seller_of(product: &Value) -> &str {
    product["seller"]
        .as_str()
        .or_else(|| product["seller"]["_id"].as_str())
        .unwrap_or_default()
}

async fn by_category(State(state): State<Shared>, Path(category): Path<String>) -> Json<Value> {
    filtered(&state, |p| p["type"] == category.as_str())
}

async fn search(State(state): State<Shared>, Path(query): Path<String>) -> Json<Value> {
    let query = query.to_lowercase();
    filtered(&state, |p| {
        p["name"]
            .as_str()
            .is_some_and(|name| name.to_lowercase().contains(&query))
    })
}

async fn seller_products(State(state): State<Shared>, Path(id): Path<String>) -> Json<Value> {
    filtered(&state, |p| seller_of(p) == id)
}

async fn my_products(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let user = match caller(&lock(&state), &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    filtered(&state, |p| seller_of(p) == user.id).into_response()
}

async fn create_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    let mut data = lock(&state);
    let user = match caller(&data, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if user.role != "Seller" {
        return error(StatusCode::FORBIDDEN, "Only sellers can create products");
    }
    body["_id"] = json!(format!("prod-new-{}", data.products.len() + 1));
    body["seller"] = json!(user.id);
    data.products.push(body.clone());
    (StatusCode::CREATED, Json(json!({ "product": body }))).into_response()
}

async fn update_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut data = lock(&state);
    let user = match caller(&data, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let Some(product) = data.products.iter_mut().find(|p| p["_id"] == id.as_str()) else {
        return error(StatusCode::NOT_FOUND, "Product not found");
    };
    if seller_of(product) != user.id {
        return error(StatusCode::FORBIDDEN, "Not your product");
    }
    if let (Some(product), Some(fields)) = (product.as_object_mut(), body.as_object()) {
        for (key, value) in fields {
            product.insert(key.clone(), value.clone());
        }
    }
    Json(product.clone()).into_response()
}

async fn delete_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut data = lock(&state);
    let user = match caller(&data, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let owned = data
        .product(&id)
        .is_some_and(|p| seller_of(p) == user.id);
    if !owned {
        return error(StatusCode::FORBIDDEN, "Not your product");
    }
    data.products.retain(|p| p["_id"] != id.as_str());
    Json(json!({ "message": "Product deleted" })).into_response()
}

async fn get_wishlist(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let data = lock(&state);
    let Some(token) = bearer(&headers) else {
        return unauthorized();
    };
    let entries: Vec<Value> = data
        .wishlists
        .get(&token)
        .into_iter()
        .flatten()
        .map(|id| json!({ "product": data.product_ref(id) }))
        .collect();
    Json(Value::Array(entries)).into_response()
}

async fn add_to_wishlist(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut data = lock(&state);
    let Some(token) = bearer(&headers) else {
        return unauthorized();
    };
    let id = body["product"]["_id"].as_str().unwrap_or_default().to_string();
    if data.product(&id).is_none() {
        return error(StatusCode::NOT_FOUND, "Product not found");
    }
    data.wishlist_writes += 1;
    let list = data.wishlists.entry(token).or_default();
    if !list.contains(&id) {
        list.push(id);
    }
    Json(json!({ "message": "Added to wishlist" })).into_response()
}

async fn remove_from_wishlist(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut data = lock(&state);
    let Some(token) = bearer(&headers) else {
        return unauthorized();
    };
    data.wishlist_writes += 1;
    data.wishlists.entry(token).or_default().retain(|p| *p != id);
    Json(json!({ "message": "Removed from wishlist" })).into_response()
}

async fn manage_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut data = lock(&state);
    let Some(token) = bearer(&headers) else {
        return unauthorized();
    };
    let id = body["product"]["_id"].as_str().unwrap_or_default().to_string();
    let Some(product) = data.product(&id).cloned() else {
        return error(StatusCode::NOT_FOUND, "Product not found");
    };
    let size = first_choice(&body["product"]["sizes"]);
    let color = first_choice(&body["product"]["colors"]);
    data.cart_writes += 1;

    let lines = data.carts.entry(token).or_default();
    if body["isRemove"].as_bool().unwrap_or(false) {
        lines.retain(|line| {
            !(line.product_id == id
                && size.as_ref().is_none_or(|s| line.size.as_ref() == Some(s))
                && color.as_ref().is_none_or(|c| line.color.as_ref() == Some(c)))
        });
    } else {
        let size = size.or_else(|| first_choice(&product["sizes"]));
        let color = color.or_else(|| first_choice(&product["colors"]));
        let amount = u32::try_from(body["amount"].as_u64().unwrap_or(1)).unwrap_or(1);
        match lines
            .iter_mut()
            .find(|line| line.product_id == id && line.size == size && line.color == color)
        {
            Some(line) => line.amount += amount,
            None => lines.push(FakeLine {
                product_id: id,
                amount,
                size,
                color,
            }),
        }
    }
    Json(json!({ "message": "Cart updated" })).into_response()
}

fn catalog_router(state: Shared) -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/{id}", get(get_product))
        .route("/category/{category}", get(by_category))
        .route("/search/{query}", get(search))
        .route("/seller-products/{id}", get(seller_products))
        .route("/products/seller", get(my_products))
        .route("/product/create", post(create_product))
        .route("/product/{id}", put(update_product).delete(delete_product))
        .route("/wishlist", get(get_wishlist).post(add_to_wishlist))
        .route("/wishlist/{id}", delete(remove_from_wishlist))
        .route("/cart", put(manage_cart))
        .with_state(state)
}

// =============================================================================
// Cart/Order Service
// =============================================================================

async fn get_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let data = lock(&state);
    let Some(token) = bearer(&headers) else {
        return unauthorized();
    };
    let items: Vec<Value> = data
        .carts
        .get(&token)
        .into_iter()
        .flatten()
        .map(|line| data.line_json(line))
        .collect();
    Json(json!([{ "_id": format!("cart-{token}"), "items": items }])).into_response()
}

async fn create_payment_intent(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut data = lock(&state);
    if data.fail_payment_intent {
        return error(StatusCode::BAD_GATEWAY, "Payment provider unavailable");
    }
    let total = body["total"].as_i64().unwrap_or_default();
    data.payment_intents.push(total);
    let secret = format!("pi_{}_secret_test", data.payment_intents.len());
    Json(json!({ "paymentIntent": secret })).into_response()
}

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut data = lock(&state);
    let user = match caller(&data, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let key = headers
        .get("idempotency-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if let Some(existing) = key.as_ref().and_then(|k| data.idempotency.get(k)) {
        return Json(json!({ "_id": existing })).into_response();
    }
    if data.fail_order {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Order service unavailable");
    }

    let lines = body["items"]
        .as_array()
        .into_iter()
        .flatten()
        .map(|item| FakeLine {
            product_id: item["product"]["_id"].as_str().unwrap_or_default().to_string(),
            amount: u32::try_from(item["amount"].as_u64().unwrap_or(1)).unwrap_or(1),
            size: item["size"].as_str().map(str::to_string),
            color: item["color"].as_str().map(str::to_string),
        })
        .collect();
    let id = format!("order-{}", data.orders.len() + 1);
    data.orders.push(FakeOrder {
        id: id.clone(),
        buyer_token: user.token.clone(),
        buyer_id: user.id,
        lines,
        amount: body["amount"].as_str().unwrap_or("0.00").to_string(),
        status: body["status"].as_str().unwrap_or("Pending").to_string(),
    });
    data.order_posts += 1;
    if let Some(key) = key {
        data.idempotency.insert(key, id.clone());
    }
    data.carts.remove(&user.token);

    (StatusCode::CREATED, Json(json!({ "order": { "_id": id } }))).into_response()
}

async fn list_orders(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let data = lock(&state);
    let Some(token) = bearer(&headers) else {
        return unauthorized();
    };
    let orders: Vec<Value> = data
        .orders
        .iter()
        .filter(|o| o.buyer_token == token)
        .map(|o| data.order_json(o))
        .collect();
    Json(Value::Array(orders)).into_response()
}

async fn seller_sales(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let data = lock(&state);
    let user = match caller(&data, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let sales: Vec<Value> = data
        .orders
        .iter()
        .filter(|o| {
            o.lines.iter().any(|line| {
                data.product(&line.product_id)
                    .is_some_and(|p| seller_of(p) == user.id)
            })
        })
        .map(|o| data.order_json(o))
        .collect();
    Json(Value::Array(sales)).into_response()
}

async fn update_sale(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut data = lock(&state);
    if let Err(response) = caller(&data, &headers) {
        return response;
    }
    let Some(order) = data.orders.iter_mut().find(|o| o.id == id) else {
        return error(StatusCode::NOT_FOUND, "Order not found");
    };
    order.status = body["status"].as_str().unwrap_or_default().to_string();
    Json(json!({ "message": "Status updated" })).into_response()
}

fn orders_router(state: Shared) -> Router {
    Router::new()
        .route("/cart", get(get_cart))
        .route("/create-payment-intent", post(create_payment_intent))
        .route("/order", post(create_order))
        .route("/orders", get(list_orders))
        .route("/seller-sales", get(seller_sales))
        .route("/sales/{id}", put(update_sale))
        .with_state(state)
}

// =============================================================================
// Harness
// =============================================================================

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "Fake backend stopped");
        }
    });
    format!("http://{addr}/")
}

/// The three fake backends, running.
pub struct FakeMarketplace {
    state: Shared,
    endpoints: ServiceEndpoints,
}

impl FakeMarketplace {
    /// Start the fake services with seed data.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeData::seeded()));
        let profile = serve(profile_router(state.clone())).await;
        let catalog = serve(catalog_router(state.clone())).await;
        let orders = serve(orders_router(state.clone())).await;
        let endpoints = ServiceEndpoints::new(&profile, &catalog, &orders).unwrap();
        Self { state, endpoints }
    }

    /// Inspect or change the fake data.
    pub fn data(&self) -> MutexGuard<'_, FakeData> {
        lock(&self.state)
    }

    /// Where the fakes listen.
    #[must_use]
    pub const fn endpoints(&self) -> &ServiceEndpoints {
        &self.endpoints
    }

    /// Gateway configuration pointing at the fakes.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        let mut config = StorefrontConfig::with_services(self.endpoints.clone());
        config.checkout.publishable_key = Some("pk_test_fake".to_string());
        config
    }

    /// Real backend clients pointing at the fakes.
    #[must_use]
    pub fn marketplace(&self) -> Marketplace {
        let config = self.config();
        Marketplace::new(&config.services, config.catalog_cache_ttl).unwrap()
    }

    /// The gateway router in front of the fakes.
    #[must_use]
    pub fn gateway(&self) -> Router {
        cybermart_storefront::app(AppState::new(self.config()).unwrap())
    }

    /// Put a line straight into a shopper's cart.
    pub fn seed_cart(&self, token: &str, product_id: &str, amount: u32) {
        self.data()
            .carts
            .entry(token.to_string())
            .or_default()
            .push(FakeLine {
                product_id: product_id.to_string(),
                amount,
                size: None,
                color: None,
            });
    }
}

/// A bearer credential for one of the seeded accounts.
#[must_use]
pub fn token(raw: &str) -> BearerToken {
    BearerToken::new(raw).unwrap()
}
