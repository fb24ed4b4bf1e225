//! Wishlist route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use cybermart_core::ProductId;
use serde::Deserialize;
use tracing::instrument;

use super::membership::{self, MembershipChange};
use crate::backend::{MembershipKind, WishlistItem};
use crate::error::Result;
use crate::membership::MembershipSnapshot;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Body of the idempotent set form.
#[derive(Debug, Deserialize)]
pub struct SetMembershipForm {
    pub in_wishlist: bool,
}

/// The wishlist with populated products where the catalog sent them.
///
/// Also resynchronizes the membership mirror.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(token): RequireAuth,
) -> Result<Json<Vec<WishlistItem>>> {
    let items = state.marketplace().catalog().wishlist(&token).await?;

    let shopper = state.shoppers().get(&token).await;
    shopper
        .lock()
        .await
        .wishlist
        .replace(items.iter().map(|item| item.product_id.clone()));

    Ok(Json(items))
}

/// Product IDs currently in the wishlist.
#[instrument(skip_all)]
pub async fn membership(
    State(state): State<AppState>,
    RequireAuth(token): RequireAuth,
) -> Result<Json<MembershipSnapshot>> {
    let snapshot = membership::snapshot(&state, &token, MembershipKind::Wishlist).await?;
    Ok(Json(snapshot))
}

/// Flip wishlist membership with one backend call.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn toggle(
    State(state): State<AppState>,
    RequireAuth(token): RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<MembershipChange>> {
    let change =
        membership::change(&state, &token, MembershipKind::Wishlist, ProductId::new(id), None).await?;
    Ok(Json(change))
}

/// Bring wishlist membership to the requested value. Repeating a settled
/// request makes no backend call.
#[instrument(skip_all, fields(product_id = %id, in_wishlist = form.in_wishlist))]
pub async fn set(
    State(state): State<AppState>,
    RequireAuth(token): RequireAuth,
    Path(id): Path<String>,
    Json(form): Json<SetMembershipForm>,
) -> Result<Json<MembershipChange>> {
    let change = membership::change(
        &state,
        &token,
        MembershipKind::Wishlist,
        ProductId::new(id),
        Some(form.in_wishlist),
    )
    .await?;
    Ok(Json(change))
}
