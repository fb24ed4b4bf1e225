//! Cache types for catalog responses.

use cybermart_core::{Category, ProductId, SellerId};

use super::types::Product;

/// Cache key for catalog reads.
///
/// Search results and the caller's own products are never cached.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products,
    Category(Category),
    SellerProducts(SellerId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
}
