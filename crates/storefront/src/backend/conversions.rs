//! Conversions from wire shapes to domain types.
//!
//! Anything that fails validation is dropped with a debug log rather than
//! failing the whole response.

use chrono::{DateTime, Utc};
use cybermart_core::{Category, OrderId, Price, ProductId, Role, SellerId, UserId};
use serde_json::Value;
use tracing::debug;

use super::types::{
    CartItem, Order, OrderItem, Product, SellerProfile, UserProfile, WishlistItem,
};
use super::wire::{ProductRef, WireCartLine, WireOrder, WireOrderLine, WireProduct, WireProfile};
use crate::cart::Cart;

// =============================================================================
// Products
// =============================================================================

/// Convert a catalog product. A missing or non-numeric price reads as zero.
pub fn convert_product(product: WireProduct) -> Product {
    Product {
        id: product.id,
        name: product.name.unwrap_or_default(),
        description: product.desc.unwrap_or_default(),
        price: Price::new(product.price.unwrap_or_default()),
        stock: product.stock.unwrap_or_default(),
        available: product.available,
        category: product.category.as_deref().map(Category::new),
        sizes: product.sizes,
        colors: product.colors,
        images: product.img,
        seller: product.seller.map(|s| SellerId::new(s.into_id())),
    }
}

/// Product listing from either a bare array or `{ "products": [...] }`.
pub fn convert_product_list(value: Value) -> Vec<Product> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("products") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<WireProduct>(item) {
            Ok(product) => Some(convert_product(product)),
            Err(e) => {
                debug!(error = %e, "Skipping malformed product");
                None
            }
        })
        .collect()
}

/// Single product from either the document itself or `{ "product": {...} }`.
pub fn convert_product_detail(value: Value) -> Option<Product> {
    let value = match value {
        Value::Object(mut map) if !map.contains_key("_id") => map.remove("product")?,
        other => other,
    };
    serde_json::from_value::<WireProduct>(value)
        .ok()
        .map(convert_product)
}

// =============================================================================
// Cart
// =============================================================================

/// Pull the cart lines out of whatever shape the cart service returned.
///
/// Accepted shapes: an array of cart documents (the first one's `items` are
/// used), an array of lines, `{ "items": [...] }` or `{ "products": [...] }`.
/// Anything else is an empty cart.
fn cart_lines(value: Value) -> Vec<Value> {
    fn lines_of(value: Value) -> Vec<Value> {
        match value {
            Value::Object(mut map) => match map.remove("items").or_else(|| map.remove("products")) {
                Some(Value::Array(lines)) => lines,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    match value {
        Value::Array(mut docs) => {
            let is_document = docs
                .first()
                .is_some_and(|doc| doc.get("items").is_some());
            if is_document {
                lines_of(docs.swap_remove(0))
            } else {
                docs
            }
        }
        other => lines_of(other),
    }
}

/// Convert a cart response.
///
/// Lines whose product is not populated, or whose price or amount is not
/// numeric, are left out of the item list. Every referenced product id still
/// counts towards membership.
pub fn convert_cart(value: Value) -> Cart {
    let mut items = Vec::new();
    let mut members = Vec::new();

    for raw in cart_lines(value) {
        let line: WireCartLine = match serde_json::from_value(raw) {
            Ok(line) => line,
            Err(e) => {
                debug!(error = %e, "Skipping malformed cart line");
                continue;
            }
        };

        let Some(product_ref) = line.product else {
            continue;
        };
        members.push(product_ref.id().clone());

        let ProductRef::Populated(product) = product_ref else {
            debug!("Skipping cart line with unpopulated product");
            continue;
        };
        let (Some(_), Some(quantity)) = (product.price, line.amount) else {
            debug!(product_id = %product.id, "Skipping cart line with non-numeric price or amount");
            continue;
        };

        items.push(CartItem {
            product: convert_product(*product),
            size: line.size.or_else(|| line.sizes.into_iter().next()),
            color: line.color.or_else(|| line.colors.into_iter().next()),
            quantity,
        });
    }

    Cart::from_parts(items, members)
}

// =============================================================================
// Wishlist
// =============================================================================

/// Convert a wishlist response.
///
/// Accepts a bare array or an object holding `wishlist`, `items` or
/// `products`. Each entry is either `{ "product": <ref> }` or a product
/// reference itself.
pub fn convert_wishlist(value: Value) -> Vec<WishlistItem> {
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut map) => ["wishlist", "items", "products"]
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(entries)) => Some(entries),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    let mut seen = std::collections::HashSet::new();
    entries
        .into_iter()
        .filter_map(|mut entry| {
            let reference = entry
                .as_object_mut()
                .and_then(|map| map.remove("product"))
                .unwrap_or(entry);
            serde_json::from_value::<ProductRef>(reference).ok()
        })
        .filter(|reference| seen.insert(reference.id().clone()))
        .map(|reference| match reference {
            ProductRef::Populated(product) => WishlistItem {
                product_id: product.id.clone(),
                product: Some(convert_product(*product)),
            },
            ProductRef::Bare(id) => WishlistItem {
                product_id: id,
                product: None,
            },
        })
        .collect()
}

// =============================================================================
// Orders
// =============================================================================

fn convert_order_line(raw: Value) -> Option<OrderItem> {
    let line: WireOrderLine = serde_json::from_value(raw).ok()?;
    let (product_id, product) = match line.product? {
        ProductRef::Populated(product) => (product.id.clone(), Some(convert_product(*product))),
        ProductRef::Bare(id) => (id, None),
    };
    Some(OrderItem {
        product_id,
        product,
        quantity: line.amount.unwrap_or(1),
        size: line.size,
        color: line.color,
    })
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn convert_order(order: WireOrder) -> Order {
    Order {
        id: OrderId::new(&order.id),
        items: order
            .items
            .into_iter()
            .filter_map(convert_order_line)
            .collect(),
        total: Price::new(order.amount.unwrap_or_default()),
        status: order.status.unwrap_or_default(),
        buyer: order.user.map(|u| UserId::new(u.into_id())),
        created_at: parse_timestamp(order.created_at.as_deref()),
        updated_at: parse_timestamp(order.updated_at.as_deref()),
    }
}

/// Convert an order listing. Returns `None` unless the response is an array.
pub fn convert_order_list(value: Value) -> Option<Vec<Order>> {
    let Value::Array(items) = value else {
        return None;
    };
    Some(
        items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<WireOrder>(item) {
                Ok(order) => Some(convert_order(order)),
                Err(e) => {
                    debug!(error = %e, "Skipping malformed order");
                    None
                }
            })
            .collect(),
    )
}

/// New order id from `{ "_id": .. }` or `{ "order": { "_id": .. } }`.
pub fn created_order_id(value: &Value) -> Option<OrderId> {
    value
        .get("_id")
        .or_else(|| value.get("order").and_then(|order| order.get("_id")))
        .and_then(Value::as_str)
        .map(OrderId::new)
}

// =============================================================================
// Profiles
// =============================================================================

/// Unwrap `{ "user": {...} }` / `{ "profile": {...} }` envelopes.
pub fn unwrap_profile(value: Value) -> Value {
    match value {
        Value::Object(mut map) if !map.contains_key("name") && !map.contains_key("email") => map
            .remove("user")
            .or_else(|| map.remove("profile"))
            .or_else(|| map.remove("seller"))
            .unwrap_or(Value::Object(map)),
        other => other,
    }
}

pub fn convert_profile(profile: WireProfile) -> UserProfile {
    UserProfile {
        id: profile.id.map(UserId::new),
        name: profile.name.unwrap_or_default(),
        email: profile.email,
        phone: profile.phone,
        gender: profile.gender,
        about: profile.about,
        address: profile.address,
        role: profile
            .role
            .and_then(|r| r.parse::<Role>().ok())
            .unwrap_or_default(),
        avatar_url: profile.img,
    }
}

pub fn convert_seller_profile(id: &SellerId, profile: WireProfile) -> SellerProfile {
    SellerProfile {
        id: profile.id.map_or_else(|| id.clone(), SellerId::new),
        name: profile.name.unwrap_or_default(),
        avatar_url: profile.img,
        about: profile.about,
    }
}

/// Ids only, for refreshing a membership set.
pub fn product_ids(items: &[WishlistItem]) -> Vec<ProductId> {
    items.iter().map(|item| item.product_id.clone()).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cart_from_document_array() {
        let cart = convert_cart(json!([{
            "_id": "cart1",
            "items": [
                {"product": {"_id": "p1", "name": "Lamp", "price": 10, "sizes": ["M"]}, "amount": 2},
                {"product": {"_id": "p2", "name": "Mug", "price": "3.5"}, "amount": 1, "color": "Red"}
            ]
        }]));
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total().to_fixed(), "23.50");
        assert_eq!(cart.items()[1].color.as_deref(), Some("Red"));
    }

    #[test]
    fn test_cart_with_huge_backend_price() {
        let cart = convert_cart(json!([{
            "items": [{"product": {"_id": "p1", "price": 1e27}, "amount": 1}]
        }]));
        assert_eq!(cart.item_count(), 1);
        let summary = cart.summary();
        assert_eq!(summary.total.to_fixed(), "1000000000000000000000000000.00");
        assert_eq!(summary.total_minor, None);
    }

    #[test]
    fn test_cart_drops_invalid_lines() {
        let cart = convert_cart(json!({
            "items": [
                {"product": "p-bare", "amount": 1},
                {"product": {"_id": "p-noprice", "name": "X"}, "amount": 1},
                {"product": {"_id": "p-badamount", "price": 4}, "amount": "lots"},
                {"amount": 3},
                {"product": {"_id": "p-ok", "price": 1}, "quantity": 5}
            ]
        }));
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.items()[0].product.id.as_str(), "p-ok");
        assert_eq!(cart.items()[0].quantity, 5);
        // Dropped lines still count as members.
        assert!(cart.contains(&ProductId::new("p-bare")));
        assert!(cart.contains(&ProductId::new("p-noprice")));
    }

    #[test]
    fn test_cart_odd_shapes_are_empty() {
        assert!(convert_cart(json!(null)).is_empty());
        assert!(convert_cart(json!([])).is_empty());
        assert!(convert_cart(json!("nope")).is_empty());
        assert!(convert_cart(json!([{"items": null}])).is_empty());
        assert!(convert_cart(json!({"message": "no cart"})).is_empty());
    }

    #[test]
    fn test_cart_line_option_lists() {
        let cart = convert_cart(json!({
            "products": [
                {"product": {"_id": "p1", "price": 2}, "amount": 1, "sizes": ["L"], "colors": ["Blue"]}
            ]
        }));
        assert_eq!(cart.items()[0].size.as_deref(), Some("L"));
        assert_eq!(cart.items()[0].color.as_deref(), Some("Blue"));
    }

    #[test]
    fn test_wishlist_shapes() {
        let items = convert_wishlist(json!({
            "wishlist": [
                {"_id": "w1", "product": {"_id": "p1", "name": "Lamp", "price": 1}},
                {"_id": "w2", "product": "p2"},
                {"_id": "w3", "product": " p1 "}
            ]
        }));
        assert_eq!(items.len(), 2);
        assert!(items[0].product.is_some());
        assert_eq!(items[1].product_id.as_str(), "p2");
        assert!(items[1].product.is_none());

        let items = convert_wishlist(json!([{"_id": "p9", "name": "Direct"}]));
        assert_eq!(product_ids(&items), [ProductId::new("p9")]);
    }

    #[test]
    fn test_order_conversion() {
        let orders = convert_order_list(json!([{
            "_id": "o1",
            "items": [
                {"product": {"_id": "p1", "name": "Lamp", "price": 10}, "amount": 2, "size": "M"},
                {"product": "p2", "amount": 1},
                {"amount": 1}
            ],
            "amount": "20.00",
            "status": "on the way",
            "user": {"_id": "u1", "name": "Ann"},
            "createdAt": "2024-03-01T10:00:00.000Z"
        }]))
        .unwrap();
        let order = &orders[0];
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.total.to_fixed(), "20.00");
        assert_eq!(order.status, cybermart_core::OrderStatus::OnTheWay);
        assert_eq!(order.buyer.as_ref().unwrap().as_str(), "u1");
        assert!(order.created_at.is_some());
        assert!(order.updated_at.is_none());

        assert!(convert_order_list(json!({"orders": []})).is_none());
    }

    #[test]
    fn test_product_list_and_detail() {
        let products = convert_product_list(json!({"products": [{"_id": "p1", "price": 3}, {"name": "no id"}]}));
        assert_eq!(products.len(), 1);
        assert_eq!(convert_product_list(json!([{"_id": "p1"}])).len(), 1);

        let product = convert_product_detail(json!({"product": {"_id": "p1", "type": "books"}})).unwrap();
        assert_eq!(product.category.unwrap().as_str(), "Books");
        assert!(convert_product_detail(json!({"message": "gone"})).is_none());
    }

    #[test]
    fn test_profile_conversion() {
        let profile: WireProfile = serde_json::from_value(unwrap_profile(json!({
            "user": {"_id": "u1", "name": "Ann", "role": "seller", "img": "a.png", "phone": 5551234}
        })))
        .unwrap();
        let profile = convert_profile(profile);
        assert_eq!(profile.role, Role::Seller);
        assert_eq!(profile.avatar_url.as_deref(), Some("a.png"));
        assert_eq!(profile.phone.as_deref(), Some("5551234"));

        let created = created_order_id(&json!({"order": {"_id": "o7"}})).unwrap();
        assert_eq!(created.as_str(), "o7");
    }
}
