//! Cart route handlers.
//!
//! The cart lives in the order service. Every write is followed by a fresh
//! read, and the shopper's cart membership mirror is refreshed from it.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use cybermart_core::{BearerToken, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::membership::{self, MembershipChange};
use crate::backend::{CartItem, CartMutation, MembershipKind};
use crate::cart::{Cart, CartSummary};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::membership::MembershipSnapshot;
use crate::middleware::RequireAuth;
use crate::shopper::ShopperState;
use crate::state::AppState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Cart view returned by every cart route.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    #[serde(flatten)]
    pub summary: CartSummary,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().to_vec(),
            summary: cart.summary(),
        }
    }
}

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddItemForm {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub size: Option<String>,
    pub color: Option<String>,
}

const fn default_quantity() -> u32 {
    1
}

/// Line options for removal.
#[derive(Debug, Default, Deserialize)]
pub struct LineQuery {
    pub size: Option<String>,
    pub color: Option<String>,
}

// =============================================================================
// Helpers
// =============================================================================

/// Re-read the cart unless a payment is in flight, in which case the cart
/// held by the checkout flow is returned as is.
async fn current_cart(state: &AppState, token: &BearerToken, shopper: &mut ShopperState) -> Result<Cart> {
    if shopper.checkout.state().payment_in_progress() {
        return Ok(shopper.checkout.state().cart().cloned().unwrap_or_default());
    }
    let cart = shopper.checkout.load(state.marketplace(), token).await?.clone();
    shopper.cart.replace(cart.member_ids());
    Ok(cart)
}

/// Run a cart write and refresh the membership mirror from the result.
async fn write_cart(state: &AppState, token: &BearerToken, mutation: &CartMutation) -> Result<CartView> {
    let shared = state.shoppers().get(token).await;
    let mut guard = shared.lock().await;
    let shopper = &mut *guard;

    let cart = shopper
        .checkout
        .update_cart(state.marketplace(), token, mutation)
        .await?
        .clone();
    shopper.cart.replace(cart.member_ids());
    Ok(CartView::from(&cart))
}

// =============================================================================
// Handlers
// =============================================================================

/// Show the cart with totals.
#[instrument(skip_all)]
pub async fn show(State(state): State<AppState>, RequireAuth(token): RequireAuth) -> Result<Json<CartView>> {
    let shared = state.shoppers().get(&token).await;
    let mut guard = shared.lock().await;
    let cart = current_cart(&state, &token, &mut guard).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add a product to the cart.
#[instrument(skip(state, token, form), fields(product_id = %form.product_id, quantity = form.quantity))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(token): RequireAuth,
    Json(form): Json<AddItemForm>,
) -> Result<Json<CartView>> {
    let product_id = ProductId::new(&form.product_id);
    if product_id.is_empty() {
        return Err(AppError::BadRequest("Product is required".to_string()));
    }
    if form.quantity == 0 {
        return Err(AppError::BadRequest("Quantity must be at least 1".to_string()));
    }

    let mutation = CartMutation::add(product_id, form.quantity).with_options(form.size, form.color);
    let view = write_cart(&state, &token, &mutation).await?;

    add_breadcrumb("cart", "Added to cart", &[("product_id", form.product_id.as_str())]);
    Ok(Json(view))
}

/// Remove one line from the cart.
#[instrument(skip(state, token, query))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(token): RequireAuth,
    Path(product_id): Path<String>,
    Query(query): Query<LineQuery>,
) -> Result<Json<CartView>> {
    let mutation = CartMutation::remove(ProductId::new(&product_id), query.size, query.color);
    let view = write_cart(&state, &token, &mutation).await?;

    add_breadcrumb("cart", "Removed from cart", &[("product_id", product_id.as_str())]);
    Ok(Json(view))
}

/// Product IDs currently in the cart.
#[instrument(skip_all)]
pub async fn membership(
    State(state): State<AppState>,
    RequireAuth(token): RequireAuth,
) -> Result<Json<MembershipSnapshot>> {
    let snapshot = membership::snapshot(&state, &token, MembershipKind::Cart).await?;
    Ok(Json(snapshot))
}

/// Add the product (one unit, default options) if absent, remove it if
/// present.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn toggle(
    State(state): State<AppState>,
    RequireAuth(token): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<MembershipChange>> {
    let change =
        membership::change(&state, &token, MembershipKind::Cart, ProductId::new(id), None).await?;
    Ok(Json(change))
}
