//! Catalog route handlers.
//!
//! Browsing works anonymously. When a bearer credential is present it is
//! forwarded, and the product detail also reports the shopper's cart entry
//! and wishlist membership.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use cybermart_core::{BearerToken, Category, ProductId, SellerId};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use super::membership::ensure_loaded;
use crate::backend::{CartItem, Product, ProductSort, SellerProfile};
use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Query parameters for listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub sort: Option<String>,
}

impl ListQuery {
    fn sort(&self) -> Result<ProductSort> {
        self.sort
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(AppError::BadRequest)
    }
}

/// Product detail response.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    pub product: Product,
    pub seller: Option<SellerProfile>,
    pub cart_entry: Option<CartItem>,
    pub in_cart: bool,
    pub in_wishlist: bool,
}

/// Seller page response.
#[derive(Debug, Serialize)]
pub struct SellerPage {
    pub seller: SellerProfile,
    pub products: Vec<Product>,
}

/// Product listing.
#[instrument(skip(state, token))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(token): OptionalAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    let sort = query.sort()?;
    let mut products = state.marketplace().catalog().products(token.as_ref()).await?;
    sort.apply(&mut products);
    Ok(Json(products))
}

/// Product detail with seller profile and, for a signed-in shopper, the
/// matching cart line.
#[instrument(skip(state, token), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(token): OptionalAuth,
    Path(id): Path<String>,
) -> Result<Json<ProductDetail>> {
    let id = ProductId::new(id);
    let product = state
        .marketplace()
        .catalog()
        .product(token.as_ref(), &id)
        .await?;

    // A missing seller profile does not hide the product
    let seller = match &product.seller {
        Some(seller_id) => state
            .marketplace()
            .profile()
            .seller_profile(token.as_ref(), seller_id)
            .await
            .inspect_err(|e| warn!(error = %e, "Seller profile unavailable"))
            .ok(),
        None => None,
    };

    let mut detail = ProductDetail {
        product,
        seller,
        cart_entry: None,
        in_cart: false,
        in_wishlist: false,
    };
    if let Some(token) = token {
        shopper_view(&state, &token, &mut detail).await;
    }

    Ok(Json(detail))
}

/// Fill in the shopper-specific part of a product detail. Failures only
/// leave the fields at their defaults.
async fn shopper_view(state: &AppState, token: &BearerToken, detail: &mut ProductDetail) {
    let shared = state.shoppers().get(token).await;
    let mut guard = shared.lock().await;
    let shopper = &mut *guard;
    let id = &detail.product.id;

    if shopper.checkout.is_idle() {
        if let Err(e) = shopper.checkout.load(state.marketplace(), token).await {
            warn!(error = %e, "Cart unavailable for product detail");
        }
    }
    if let Some(cart) = shopper.checkout.state().cart() {
        detail.cart_entry = cart.entry_for(id).cloned();
        shopper.cart.replace(cart.member_ids());
    }
    detail.in_cart = shopper.cart.contains(id);

    match ensure_loaded(&mut shopper.wishlist, state.marketplace(), token).await {
        Ok(()) => detail.in_wishlist = shopper.wishlist.contains(id),
        Err(e) => warn!(error = %e, "Wishlist unavailable for product detail"),
    }
}

/// The known category list.
pub async fn categories() -> Json<Vec<Category>> {
    Json(Category::known())
}

/// Products in one category. Known names match case-insensitively.
#[instrument(skip(state, token))]
pub async fn category(
    State(state): State<AppState>,
    OptionalAuth(token): OptionalAuth,
    Path(category): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    let sort = query.sort()?;
    let category = Category::new(&category);
    let mut products = state
        .marketplace()
        .catalog()
        .products_by_category(token.as_ref(), &category)
        .await?;
    sort.apply(&mut products);
    Ok(Json(products))
}

/// Full-text search.
#[instrument(skip(state, token))]
pub async fn search(
    State(state): State<AppState>,
    OptionalAuth(token): OptionalAuth,
    Path(query): Path<String>,
) -> Result<Json<Vec<Product>>> {
    let products = state
        .marketplace()
        .catalog()
        .search(token.as_ref(), &query)
        .await?;
    Ok(Json(products))
}

/// A seller's public profile and products.
#[instrument(skip(state, token))]
pub async fn seller(
    State(state): State<AppState>,
    OptionalAuth(token): OptionalAuth,
    Path(id): Path<String>,
) -> Result<Json<SellerPage>> {
    let seller_id = SellerId::new(id);
    let marketplace = state.marketplace();
    let (seller, products) = tokio::try_join!(
        marketplace.profile().seller_profile(token.as_ref(), &seller_id),
        marketplace.catalog().seller_products(token.as_ref(), &seller_id),
    )?;
    Ok(Json(SellerPage { seller, products }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_sort() {
        let query = ListQuery {
            sort: Some("price-desc".to_string()),
        };
        assert_eq!(query.sort().unwrap_or_default(), ProductSort::PriceDesc);
        assert_eq!(ListQuery::default().sort().unwrap_or_default(), ProductSort::Default);

        let bad = ListQuery {
            sort: Some("name".to_string()),
        };
        assert!(matches!(bad.sort(), Err(AppError::BadRequest(_))));
    }
}
