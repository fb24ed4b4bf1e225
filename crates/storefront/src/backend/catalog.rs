//! Catalog service client.
//!
//! Caches product reads using `moka` (5-minute TTL by default). Any seller
//! write clears the whole cache, since a single product can appear in the
//! full listing, its category and its seller's listing.

use std::sync::Arc;
use std::time::Duration;

use cybermart_core::{BearerToken, Category, ProductId, SellerId};
use moka::future::Cache;
use reqwest::Method;
use serde::de::IgnoredAny;
use serde_json::Value;
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::conversions::{convert_product_detail, convert_product_list, convert_wishlist};
use super::types::{CartMutation, Product, ProductDraft, WishlistItem};
use super::wire::{ManageCartBody, ProductBody, ProductSelection, WishlistBody};
use super::{BackendError, RestClient};

/// Maximum number of cached catalog responses.
const CACHE_CAPACITY: u64 = 1000;

/// Client for the catalog service.
///
/// Besides products, the catalog service owns wishlists and cart writes.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    rest: RestClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    pub(crate) fn new(rest: RestClient, cache_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(cache_ttl)
            .build();

        Self {
            inner: Arc::new(CatalogClientInner { rest, cache }),
        }
    }

    /// Drop every cached catalog response.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    async fn cached_list(
        &self,
        key: CacheKey,
        segments: &[&str],
        token: Option<&BearerToken>,
    ) -> Result<Vec<Product>, BackendError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!(?key, "Cache hit for product list");
            return Ok(products);
        }

        let value: Value = self.inner.rest.get(segments, token).await?;
        let products = convert_product_list(value);

        self.inner
            .cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn products(&self, token: Option<&BearerToken>) -> Result<Vec<Product>, BackendError> {
        self.cached_list(CacheKey::Products, &[], token).await
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if the product does not exist, or an
    /// error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn product(
        &self,
        token: Option<&BearerToken>,
        id: &ProductId,
    ) -> Result<Product, BackendError> {
        let cache_key = CacheKey::Product(id.clone());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let value: Value = match self.inner.rest.get(&[id.as_str()], token).await {
            Err(e) if e.status() == Some(404) => {
                return Err(BackendError::NotFound("Product".to_string()));
            }
            other => other?,
        };
        let product = convert_product_detail(value)
            .ok_or_else(|| BackendError::NotFound("Product".to_string()))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List the products in one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(category = %category))]
    pub async fn products_by_category(
        &self,
        token: Option<&BearerToken>,
        category: &Category,
    ) -> Result<Vec<Product>, BackendError> {
        self.cached_list(
            CacheKey::Category(category.clone()),
            &["category", category.as_str()],
            token,
        )
        .await
    }

    /// Full-text search. A blank query returns no results without a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn search(
        &self,
        token: Option<&BearerToken>,
        query: &str,
    ) -> Result<Vec<Product>, BackendError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let value: Value = self.inner.rest.get(&["search", query], token).await?;
        Ok(convert_product_list(value))
    }

    /// List a seller's products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(seller_id = %seller_id))]
    pub async fn seller_products(
        &self,
        token: Option<&BearerToken>,
        seller_id: &SellerId,
    ) -> Result<Vec<Product>, BackendError> {
        self.cached_list(
            CacheKey::SellerProducts(seller_id.clone()),
            &["seller-products", seller_id.as_str()],
            token,
        )
        .await
    }

    /// List the caller's own products (sellers only). Never cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn my_products(&self, token: &BearerToken) -> Result<Vec<Product>, BackendError> {
        let value: Value = self
            .inner
            .rest
            .get(&["products", "seller"], Some(token))
            .await?;
        Ok(convert_product_list(value))
    }

    // =========================================================================
    // Seller Product Management
    // =========================================================================

    /// Create a product owned by the caller.
    ///
    /// Returns the created product when the service echoes it back.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Rejected` for an invalid draft, or an error if
    /// the API request fails.
    #[instrument(skip(self, token, draft), fields(name = %draft.name))]
    pub async fn create_product(
        &self,
        token: &BearerToken,
        draft: &ProductDraft,
    ) -> Result<Option<Product>, BackendError> {
        draft.validate().map_err(BackendError::Rejected)?;
        let value: Value = self
            .inner
            .rest
            .send_json(
                Method::POST,
                &["product", "create"],
                Some(token),
                &product_body(draft),
            )
            .await?;
        self.invalidate_cache();
        Ok(convert_product_detail(value))
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Rejected` for an invalid draft, or an error if
    /// the API request fails.
    #[instrument(skip(self, token, draft), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        token: &BearerToken,
        id: &ProductId,
        draft: &ProductDraft,
    ) -> Result<Option<Product>, BackendError> {
        draft.validate().map_err(BackendError::Rejected)?;
        let value: Value = self
            .inner
            .rest
            .send_json(
                Method::PUT,
                &["product", id.as_str()],
                Some(token),
                &product_body(draft),
            )
            .await?;
        self.invalidate_cache();
        Ok(convert_product_detail(value))
    }

    /// Delete a product owned by the caller.
    ///
    /// # Errors
    ///
    /// Any refusal from the service is reported as the product not belonging
    /// to the caller. Transport failures are returned unchanged.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn delete_product(&self, token: &BearerToken, id: &ProductId) -> Result<(), BackendError> {
        let result: Result<IgnoredAny, _> = self
            .inner
            .rest
            .delete(&["product", id.as_str()], Some(token))
            .await;

        match result {
            Ok(_) => {
                self.invalidate_cache();
                Ok(())
            }
            Err(BackendError::Http(e)) => Err(BackendError::Http(e)),
            Err(e) => {
                tracing::warn!(error = %e, "Product delete refused");
                Err(BackendError::Rejected(
                    "You can only delete products you own".to_string(),
                ))
            }
        }
    }

    // =========================================================================
    // Wishlist Methods
    // =========================================================================

    /// Get the caller's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn wishlist(&self, token: &BearerToken) -> Result<Vec<WishlistItem>, BackendError> {
        let value: Value = self.inner.rest.get(&["wishlist"], Some(token)).await?;
        Ok(convert_wishlist(value))
    }

    /// Add a product to the caller's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn add_to_wishlist(
        &self,
        token: &BearerToken,
        product_id: &ProductId,
    ) -> Result<(), BackendError> {
        let body = WishlistBody {
            product: ProductSelection {
                id: product_id,
                sizes: Some(Vec::new()),
                colors: Some(Vec::new()),
            },
            amount: 1,
        };
        let _: IgnoredAny = self
            .inner
            .rest
            .send_json(Method::POST, &["wishlist"], Some(token), &body)
            .await?;
        Ok(())
    }

    /// Remove a product from the caller's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_from_wishlist(
        &self,
        token: &BearerToken,
        product_id: &ProductId,
    ) -> Result<(), BackendError> {
        let _: IgnoredAny = self
            .inner
            .rest
            .delete(&["wishlist", product_id.as_str()], Some(token))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Cart Writes
    // =========================================================================

    /// Upsert or remove one cart line (`PUT /cart`).
    ///
    /// The chosen size and color travel as one-element lists, or `null` when
    /// nothing was chosen.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %mutation.product_id, remove = mutation.remove))]
    pub async fn manage_cart(
        &self,
        token: &BearerToken,
        mutation: &CartMutation,
    ) -> Result<(), BackendError> {
        let body = ManageCartBody {
            product: ProductSelection {
                id: &mutation.product_id,
                sizes: mutation.size.as_deref().map(|s| vec![s]),
                colors: mutation.color.as_deref().map(|c| vec![c]),
            },
            amount: if mutation.remove { 0 } else { mutation.quantity },
            is_remove: mutation.remove,
        };
        let _: IgnoredAny = self
            .inner
            .rest
            .send_json(Method::PUT, &["cart"], Some(token), &body)
            .await?;
        Ok(())
    }
}

fn product_body(draft: &ProductDraft) -> ProductBody<'_> {
    ProductBody {
        name: draft.name.trim(),
        desc: &draft.description,
        img: &draft.images,
        category: draft.category.as_ref().map(Category::as_str),
        stock: draft.stock,
        price: draft.price.amount(),
        available: draft.available,
        sizes: &draft.sizes,
        colors: &draft.colors,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cybermart_core::Price;

    #[test]
    fn test_product_body_wire_names() {
        let draft = ProductDraft {
            name: " Lamp ".to_string(),
            description: "Bright".to_string(),
            price: Price::new("12.50".parse().unwrap()),
            stock: 4,
            available: true,
            category: Some(Category::new("electronics")),
            sizes: vec![],
            colors: vec!["White".to_string()],
            images: vec!["lamp.png".to_string()],
        };
        let json = serde_json::to_value(product_body(&draft)).unwrap();
        assert_eq!(json["name"], "Lamp");
        assert_eq!(json["desc"], "Bright");
        assert_eq!(json["type"], "Electronics");
        assert_eq!(json["price"], 12.5);
        assert_eq!(json["img"][0], "lamp.png");
        assert_eq!(json["colors"][0], "White");
    }
}
