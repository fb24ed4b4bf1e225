//! Seller route handlers: own products and sales.
//!
//! Ownership is enforced by the backends. The gateway only forwards the
//! seller's credential and reports the refusal.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use cybermart_core::{OrderId, OrderStatus, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::backend::{Order, Product, ProductDraft};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::sales::SalesSummary;
use crate::state::AppState;

/// Body of a status change.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub status: String,
}

/// Status change response.
#[derive(Debug, Serialize)]
pub struct StatusChanged {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

/// The caller's own listings.
#[instrument(skip_all)]
pub async fn products(
    State(state): State<AppState>,
    RequireAuth(token): RequireAuth,
) -> Result<Json<Vec<Product>>> {
    let products = state.marketplace().catalog().my_products(&token).await?;
    Ok(Json(products))
}

/// Create a listing. The body is the created product when the catalog
/// echoes it, `null` otherwise.
#[instrument(skip(state, token, draft), fields(name = %draft.name))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireAuth(token): RequireAuth,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Option<Product>>)> {
    let product = state
        .marketplace()
        .catalog()
        .create_product(&token, &draft)
        .await?;

    add_breadcrumb("seller", "Product created", &[("name", draft.name.as_str())]);
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a listing's fields.
#[instrument(skip(state, token, draft))]
pub async fn update_product(
    State(state): State<AppState>,
    RequireAuth(token): RequireAuth,
    Path(id): Path<String>,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<Option<Product>>> {
    let product = state
        .marketplace()
        .catalog()
        .update_product(&token, &ProductId::new(id), &draft)
        .await?;
    Ok(Json(product))
}

/// Delete a listing.
#[instrument(skip(state, token))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAuth(token): RequireAuth,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state
        .marketplace()
        .catalog()
        .delete_product(&token, &ProductId::new(&id))
        .await?;

    add_breadcrumb("seller", "Product deleted", &[("product_id", id.as_str())]);
    Ok(StatusCode::NO_CONTENT)
}

/// Orders containing the caller's products.
#[instrument(skip_all)]
pub async fn sales(State(state): State<AppState>, RequireAuth(token): RequireAuth) -> Result<Json<Vec<Order>>> {
    let sales = state.marketplace().orders().seller_sales(&token).await?;
    Ok(Json(sales))
}

/// Order count, revenue and per-status breakdown of the caller's sales.
#[instrument(skip_all)]
pub async fn summary(
    State(state): State<AppState>,
    RequireAuth(token): RequireAuth,
) -> Result<Json<SalesSummary>> {
    let sales = state.marketplace().orders().seller_sales(&token).await?;
    Ok(Json(SalesSummary::from_orders(&sales)))
}

/// Change the status of one sale.
#[instrument(skip(state, token, form), fields(status = %form.status))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAuth(token): RequireAuth,
    Path(id): Path<String>,
    Json(form): Json<StatusForm>,
) -> Result<Json<StatusChanged>> {
    let order_id = OrderId::new(id);
    let Ok(status) = form.status.parse::<OrderStatus>();
    state
        .marketplace()
        .orders()
        .update_order_status(&token, &order_id, &status)
        .await?;
    Ok(Json(StatusChanged { order_id, status }))
}
