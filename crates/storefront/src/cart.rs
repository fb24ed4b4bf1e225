//! The caller's cart as displayed by the storefront.
//!
//! A [`Cart`] is a transient copy of what the cart/order service reported.
//! Lines that failed validation are not in [`Cart::items`], but their product
//! ids still count for membership, so a broken line never lets the same
//! product be added twice.

use cybermart_core::{Price, ProductId};
use serde::Serialize;

use crate::backend::CartItem;

/// A fetched cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cart {
    items: Vec<CartItem>,
    #[serde(skip)]
    members: Vec<ProductId>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Build a cart from displayable lines plus every product id referenced.
    ///
    /// Ids of `items` are always members, even if missing from `members`.
    #[must_use]
    pub fn from_parts(items: Vec<CartItem>, members: Vec<ProductId>) -> Self {
        let mut all: Vec<ProductId> = Vec::with_capacity(members.len() + items.len());
        for id in items.iter().map(|item| &item.product.id).chain(&members) {
            if !all.contains(id) {
                all.push(id.clone());
            }
        }
        Self { items, members: all }
    }

    /// Cart built from lines only.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        Self::from_parts(items, Vec::new())
    }

    /// Displayable lines.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of lines.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Whether there is nothing to check out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of price × quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Whether a product is in the cart, by normalized id.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.members.contains(product_id)
    }

    /// Every product id in the cart.
    #[must_use]
    pub fn member_ids(&self) -> Vec<ProductId> {
        self.members.clone()
    }

    /// First line for a product, whatever options were chosen.
    #[must_use]
    pub fn entry_for(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product.id == *product_id)
    }

    /// Line matching a product and option pair (`None` matches any option).
    #[must_use]
    pub fn find(
        &self,
        product_id: &ProductId,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Option<&CartItem> {
        self.items
            .iter()
            .find(|item| item.matches(product_id, size, color))
    }

    /// Drop the first line matching a product and option pair.
    ///
    /// The product stays a member while another line still references it.
    pub fn remove(
        &mut self,
        product_id: &ProductId,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Option<CartItem> {
        let index = self
            .items
            .iter()
            .position(|item| item.matches(product_id, size, color))?;
        let removed = self.items.remove(index);
        if !self.items.iter().any(|item| item.product.id == *product_id) {
            self.members.retain(|id| id != product_id);
        }
        Some(removed)
    }

    /// Totals for display.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        let total = self.total();
        CartSummary {
            item_count: self.item_count(),
            unit_count: self.unit_count(),
            total,
            total_minor: total.minor_units(),
        }
    }
}

/// Cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    /// Number of lines.
    pub item_count: usize,
    /// Total units.
    pub unit_count: u64,
    /// Sum of line totals.
    pub total: Price,
    /// Total in minor units, as charged.
    pub total_minor: Option<i64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::Product;

    fn item(id: &str, price: &str, quantity: u32, size: Option<&str>) -> CartItem {
        CartItem {
            product: Product {
                id: ProductId::new(id),
                name: id.to_string(),
                description: String::new(),
                price: Price::new(price.parse().unwrap()),
                stock: 10,
                available: true,
                category: None,
                sizes: vec![],
                colors: vec![],
                images: vec![],
                seller: None,
            },
            size: size.map(str::to_string),
            color: None,
            quantity,
        }
    }

    #[test]
    fn test_total_is_sum_of_lines() {
        let cart = Cart::from_items(vec![
            item("a", "19.99", 2, None),
            item("b", "0.01", 3, None),
            item("c", "5", 1, None),
        ]);
        assert_eq!(cart.total().to_fixed(), "45.01");
        assert_eq!(cart.summary().total_minor, Some(4501));
        assert_eq!(cart.unit_count(), 6);
    }

    #[test]
    fn test_huge_prices_summarize_without_minor_units() {
        let cart = Cart::from_items(vec![
            item("a", "1e27", 1, None),
            item("b", "70000000000000000000000000000", 4_000_000, None),
        ]);
        let summary = cart.summary();
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.unit_count, 4_000_001);
        assert_eq!(summary.total, Price::new(rust_decimal::Decimal::MAX));
        assert_eq!(summary.total_minor, None);
    }

    #[test]
    fn test_remove_drops_exactly_one_line() {
        let mut cart = Cart::from_items(vec![
            item("a", "10", 1, Some("M")),
            item("a", "10", 2, Some("L")),
            item("b", "4", 1, None),
        ]);
        let before_total = cart.total();
        let before_count = cart.item_count();

        let removed = cart.remove(&ProductId::new("a"), Some("L"), None).unwrap();
        assert_eq!(cart.item_count(), before_count - 1);
        assert_eq!(cart.total(), Price::new(before_total.amount() - removed.line_total().amount()));
        // Another line still holds product a
        assert!(cart.contains(&ProductId::new("a")));

        cart.remove(&ProductId::new("a"), None, None).unwrap();
        assert!(!cart.contains(&ProductId::new("a")));
        assert!(cart.remove(&ProductId::new("zzz"), None, None).is_none());
    }

    #[test]
    fn test_members_include_unlisted_ids() {
        let cart = Cart::from_parts(
            vec![item("a", "1", 1, None)],
            vec![ProductId::new("a"), ProductId::new("ghost")],
        );
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.member_ids().len(), 2);
        assert!(cart.contains(&ProductId::new("ghost")));
        assert!(cart.entry_for(&ProductId::new("ghost")).is_none());
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::empty();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
        assert_eq!(cart.summary().item_count, 0);
    }
}
