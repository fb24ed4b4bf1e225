//! HTTP route handlers for the storefront gateway.
//!
//! Every route speaks JSON. Authenticated routes forward the caller's
//! `Authorization: Bearer` header to the backends.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                       - Liveness
//! GET    /health/ready                 - Readiness (profile service reachable)
//!
//! # Auth
//! POST   /auth/login                   - Exchange credentials for a token
//! POST   /auth/signup                  - Create an account
//! POST   /auth/logout                  - Drop the gateway's shopper state
//!
//! # Account (requires auth)
//! GET    /account                      - Own profile
//! PUT    /account                      - Update profile
//!
//! # Catalog
//! GET    /products?sort=               - Product listing
//! GET    /products/{id}                - Product detail (+seller, +cart entry)
//! GET    /categories                   - Known categories
//! GET    /categories/{category}?sort=  - Per-category listing
//! GET    /search/{query}               - Search
//! GET    /sellers/{id}                 - Seller profile and products
//!
//! # Cart (requires auth)
//! GET    /cart                         - Cart view
//! POST   /cart/items                   - Add a line
//! DELETE /cart/items/{product_id}      - Remove a line (?size=&color=)
//! GET    /cart/membership              - Product IDs in the cart
//! POST   /cart/membership/{id}/toggle  - Toggle cart membership
//!
//! # Wishlist (requires auth)
//! GET    /wishlist                     - Wishlist items
//! GET    /wishlist/membership          - Product IDs in the wishlist
//! POST   /wishlist/{id}/toggle         - Toggle wishlist membership
//! PUT    /wishlist/{id}                - Set membership {in_wishlist}
//!
//! # Checkout (requires auth)
//! GET    /checkout                     - Current checkout state
//! POST   /checkout                     - Begin checkout, returns client secret
//! POST   /checkout/payment             - Provider outcome {succeeded, message?}
//! DELETE /checkout/payment             - Abandon the payment
//!
//! # Orders and selling (requires auth)
//! GET    /orders                       - Order history
//! GET    /seller/products              - Own products
//! POST   /seller/products              - Create product
//! PUT    /seller/products/{id}         - Update product
//! DELETE /seller/products/{id}         - Delete product
//! GET    /seller/sales                 - Sales list
//! GET    /seller/sales/summary         - Sales summary
//! PUT    /seller/sales/{id}/status     - Update order status {status}
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod membership;
pub mod orders;
pub mod products;
pub mod seller;
pub mod wishlist;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::categories))
        .route("/{category}", get(products::category))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/items", post(cart::add))
        .route("/items/{product_id}", delete(cart::remove))
        .route("/membership", get(cart::membership))
        .route("/membership/{id}/toggle", post(cart::toggle))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::index))
        .route("/membership", get(wishlist::membership))
        .route("/{id}", put(wishlist::set))
        .route("/{id}/toggle", post(wishlist::toggle))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::begin))
        .route(
            "/payment",
            post(checkout::payment_outcome).delete(checkout::cancel),
        )
}

/// Create the seller routes router.
pub fn seller_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(seller::products).post(seller::create_product))
        .route(
            "/products/{id}",
            put(seller::update_product).delete(seller::delete_product),
        )
        .route("/sales", get(seller::sales))
        .route("/sales/summary", get(seller::summary))
        .route("/sales/{id}/status", put(seller::update_status))
}

/// Create all routes for the gateway.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/auth", auth_routes())
        .route("/account", get(account::show).put(account::update))
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .route("/search/{query}", get(products::search))
        .route("/sellers/{id}", get(products::seller))
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/checkout", checkout_routes())
        .route("/orders", get(orders::index))
        .nest("/seller", seller_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the profile service is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.marketplace().profile().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
