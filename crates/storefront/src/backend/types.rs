//! Domain types for the marketplace backends.
//!
//! These types provide a clean API separate from the raw wire shapes in
//! `wire.rs`, which tolerate the loose JSON the services actually return.

use chrono::{DateTime, Utc};
use cybermart_core::{
    Category, Email, OrderId, OrderStatus, Price, ProductId, Role, SellerId, UserId,
};
use serde::{Deserialize, Serialize};

/// Label shown for a size or color that was never chosen.
pub const NO_CHOICE_LABEL: &str = "None";

/// Display form of an optional size/color choice.
#[must_use]
pub fn choice_label(choice: Option<&str>) -> &str {
    choice.unwrap_or(NO_CHOICE_LABEL)
}

// =============================================================================
// Catalog Types
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog document ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Units in stock.
    pub stock: u32,
    /// Whether the seller lists the product as available.
    pub available: bool,
    /// Catalog category, if set.
    pub category: Option<Category>,
    /// Size options in the seller's order.
    pub sizes: Vec<String>,
    /// Color options in the seller's order.
    pub colors: Vec<String>,
    /// Image URLs, first is the cover.
    pub images: Vec<String>,
    /// Owning seller.
    pub seller: Option<SellerId>,
}

impl Product {
    /// The first declared size option.
    #[must_use]
    pub fn default_size(&self) -> Option<&str> {
        self.sizes.first().map(String::as_str)
    }

    /// The first declared color option.
    #[must_use]
    pub fn default_color(&self) -> Option<&str> {
        self.colors.first().map(String::as_str)
    }

    /// Cover image URL.
    #[must_use]
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether the product can be bought right now.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.available && self.stock > 0
    }
}

/// Client-side ordering of a product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProductSort {
    /// Keep the order the catalog returned.
    #[default]
    #[serde(rename = "default")]
    Default,
    /// Cheapest first.
    #[serde(rename = "price-asc")]
    PriceAsc,
    /// Most expensive first.
    #[serde(rename = "price-desc")]
    PriceDesc,
}

impl ProductSort {
    /// Sort a listing in place. Ties keep their catalog order.
    pub fn apply(self, products: &mut [Product]) {
        match self {
            Self::Default => {}
            Self::PriceAsc => products.sort_by(|a, b| a.price.cmp(&b.price)),
            Self::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price)),
        }
    }
}

impl std::str::FromStr for ProductSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "default" => Ok(Self::Default),
            "price-asc" => Ok(Self::PriceAsc),
            "price-desc" => Ok(Self::PriceDesc),
            other => Err(format!(
                "unknown sort '{other}' (expected default, price-asc or price-desc)"
            )),
        }
    }
}

/// Fields a seller fills in when creating or editing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    /// Product name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Units in stock.
    #[serde(default)]
    pub stock: u32,
    /// Listed as available.
    #[serde(default = "default_true")]
    pub available: bool,
    /// Catalog category.
    #[serde(default)]
    pub category: Option<Category>,
    /// Size options.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Color options.
    #[serde(default)]
    pub colors: Vec<String>,
    /// Image URLs (already uploaded elsewhere).
    #[serde(default)]
    pub images: Vec<String>,
}

const fn default_true() -> bool {
    true
}

impl ProductDraft {
    /// Check the draft before it is sent to the catalog.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message for the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name is required".to_string());
        }
        if self.price < Price::ZERO {
            return Err("Price cannot be negative".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Cart Types
// =============================================================================

/// One line of the caller's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// The product, as populated by the cart service.
    pub product: Product,
    /// Chosen size, if any.
    pub size: Option<String>,
    /// Chosen color, if any.
    pub color: Option<String>,
    /// Quantity.
    pub quantity: u32,
}

impl CartItem {
    /// Price × quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        cybermart_core::line_total(self.product.price, self.quantity)
    }

    /// Chosen size, falling back to the product's first size option.
    #[must_use]
    pub fn effective_size(&self) -> Option<&str> {
        self.size.as_deref().or_else(|| self.product.default_size())
    }

    /// Chosen color, falling back to the product's first color option.
    #[must_use]
    pub fn effective_color(&self) -> Option<&str> {
        self.color.as_deref().or_else(|| self.product.default_color())
    }

    /// Whether this line matches a product and option pair.
    ///
    /// A `None` size or color matches any choice.
    #[must_use]
    pub fn matches(&self, product_id: &ProductId, size: Option<&str>, color: Option<&str>) -> bool {
        self.product.id == *product_id
            && size.is_none_or(|s| self.effective_size() == Some(s))
            && color.is_none_or(|c| self.effective_color() == Some(c))
    }
}

/// A cart upsert-or-remove request for the catalog service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartMutation {
    /// Target product.
    pub product_id: ProductId,
    /// New quantity (ignored on removal).
    pub quantity: u32,
    /// Chosen size, sent as a one-element list.
    pub size: Option<String>,
    /// Chosen color, sent as a one-element list.
    pub color: Option<String>,
    /// Remove the line instead of upserting it.
    pub remove: bool,
}

impl CartMutation {
    /// Add `quantity` units with no option chosen.
    #[must_use]
    pub const fn add(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            size: None,
            color: None,
            remove: false,
        }
    }

    /// Same mutation with the chosen options.
    #[must_use]
    pub fn with_options(mut self, size: Option<String>, color: Option<String>) -> Self {
        self.size = size;
        self.color = color;
        self
    }

    /// Remove the line for a product and option pair.
    #[must_use]
    pub const fn remove(product_id: ProductId, size: Option<String>, color: Option<String>) -> Self {
        Self {
            product_id,
            quantity: 0,
            size,
            color,
            remove: true,
        }
    }
}

// =============================================================================
// Wishlist Types
// =============================================================================

/// One wishlist entry.
///
/// The product is `None` when the server returned a bare id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    /// Wishlisted product.
    pub product_id: ProductId,
    /// Populated product, when available.
    pub product: Option<Product>,
}

/// Which server-side list a membership set mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipKind {
    /// The buyer's wishlist.
    Wishlist,
    /// The buyer's cart.
    Cart,
}

impl std::fmt::Display for MembershipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wishlist => f.write_str("wishlist"),
            Self::Cart => f.write_str("cart"),
        }
    }
}

// =============================================================================
// Order Types
// =============================================================================

/// A provider-issued payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Client secret handed to the payment widget.
    pub client_secret: String,
    /// Charged amount in minor units.
    pub amount_minor: i64,
}

/// One line of an order being placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineDraft {
    /// Ordered product.
    pub product_id: ProductId,
    /// Quantity.
    pub quantity: u32,
    /// Size after fallback (`None` when the product has no sizes).
    pub size: Option<String>,
    /// Color after fallback.
    pub color: Option<String>,
}

/// An order about to be posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    /// Snapshot of the cart lines.
    pub items: Vec<OrderLineDraft>,
    /// Order total.
    pub total: Price,
    /// Initial status.
    pub status: OrderStatus,
}

impl OrderDraft {
    /// Snapshot cart lines into an order, applying the size/color fallback.
    #[must_use]
    pub fn from_items(items: &[CartItem], total: Price) -> Self {
        Self {
            items: items
                .iter()
                .map(|item| OrderLineDraft {
                    product_id: item.product.id.clone(),
                    quantity: item.quantity,
                    size: item.effective_size().map(str::to_string),
                    color: item.effective_color().map(str::to_string),
                })
                .collect(),
            total,
            status: OrderStatus::Pending,
        }
    }
}

/// What the order service returned for a newly placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    /// New order ID, when the service reported one.
    pub order_id: Option<OrderId>,
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Ordered product.
    pub product_id: ProductId,
    /// Populated product, when available.
    pub product: Option<Product>,
    /// Quantity.
    pub quantity: u32,
    /// Chosen size.
    pub size: Option<String>,
    /// Chosen color.
    pub color: Option<String>,
}

/// A placed order (buyer history or seller sale).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order ID.
    pub id: OrderId,
    /// Lines.
    pub items: Vec<OrderItem>,
    /// Total charged.
    pub total: Price,
    /// Fulfillment status.
    pub status: OrderStatus,
    /// Buyer, when reported.
    pub buyer: Option<UserId>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last status change.
    pub updated_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Profile Types
// =============================================================================

/// The caller's own profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Account ID.
    pub id: Option<UserId>,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Gender, free text.
    pub gender: Option<String>,
    /// About text.
    pub about: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Account role.
    pub role: Role,
    /// Avatar URL.
    pub avatar_url: Option<String>,
}

/// Public subset of a seller's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerProfile {
    /// Seller ID.
    pub id: SellerId,
    /// Display name.
    pub name: String,
    /// Avatar URL.
    pub avatar_url: Option<String>,
    /// About text.
    pub about: Option<String>,
}

/// Editable profile fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Gender.
    #[serde(default)]
    pub gender: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// About text.
    #[serde(default)]
    pub about: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Postal address.
    #[serde(default)]
    pub address: Option<String>,
}

/// A new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupRequest {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: Email,
    /// Password.
    pub password: String,
    /// Phone number.
    pub phone: String,
    /// Requested role.
    pub role: Role,
}

impl SignupRequest {
    /// Build a signup, checking the password confirmation first.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message when the passwords differ or a required
    /// field is blank.
    pub fn new(
        name: &str,
        email: Email,
        password: &str,
        confirm_password: &str,
        phone: &str,
        role: Role,
    ) -> Result<Self, String> {
        if name.trim().is_empty() {
            return Err("Name is required".to_string());
        }
        if password.is_empty() {
            return Err("Password is required".to_string());
        }
        if password != confirm_password {
            return Err("Passwords do not match".to_string());
        }
        Ok(Self {
            name: name.trim().to_string(),
            email,
            password: password.to_string(),
            phone: phone.trim().to_string(),
            role,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_string(),
            description: String::new(),
            price: Price::new(price.parse().unwrap()),
            stock: 3,
            available: true,
            category: None,
            sizes: vec!["M".to_string(), "L".to_string()],
            colors: vec![],
            images: vec![],
            seller: None,
        }
    }

    #[test]
    fn test_effective_options_fall_back() {
        let item = CartItem {
            product: product("p1", "5"),
            size: None,
            color: None,
            quantity: 2,
        };
        assert_eq!(item.effective_size(), Some("M"));
        assert_eq!(item.effective_color(), None);
        assert_eq!(choice_label(item.effective_color()), "None");

        let item = CartItem {
            size: Some("L".to_string()),
            ..item
        };
        assert_eq!(item.effective_size(), Some("L"));
    }

    #[test]
    fn test_line_total() {
        let item = CartItem {
            product: product("p1", "2.50"),
            size: None,
            color: None,
            quantity: 4,
        };
        assert_eq!(item.line_total().to_fixed(), "10.00");
    }

    #[test]
    fn test_matches_options() {
        let item = CartItem {
            product: product("p1", "1"),
            size: Some("L".to_string()),
            color: None,
            quantity: 1,
        };
        let id = ProductId::new("p1");
        assert!(item.matches(&id, None, None));
        assert!(item.matches(&id, Some("L"), None));
        assert!(!item.matches(&id, Some("M"), None));
        assert!(!item.matches(&ProductId::new("p2"), None, None));
    }

    #[test]
    fn test_sort() {
        let mut products = vec![product("a", "3"), product("b", "1"), product("c", "2")];
        ProductSort::PriceAsc.apply(&mut products);
        let ids: Vec<_> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);

        ProductSort::PriceDesc.apply(&mut products);
        let ids: Vec<_> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "c", "b"]);

        assert_eq!("price-asc".parse::<ProductSort>().unwrap(), ProductSort::PriceAsc);
        assert_eq!("".parse::<ProductSort>().unwrap(), ProductSort::Default);
        assert!("cheapest".parse::<ProductSort>().is_err());
    }

    #[test]
    fn test_order_draft_applies_fallback() {
        let items = vec![CartItem {
            product: product("p1", "2"),
            size: None,
            color: None,
            quantity: 1,
        }];
        let draft = OrderDraft::from_items(&items, Price::new(2.into()));
        let line = draft.items.first().unwrap();
        assert_eq!(line.size.as_deref(), Some("M"));
        assert_eq!(line.color, None);
        assert_eq!(draft.status, OrderStatus::Pending);
    }

    #[test]
    fn test_signup_password_confirmation() {
        let email = Email::parse("new@shop.io").unwrap();
        assert_eq!(
            SignupRequest::new("Ann", email.clone(), "a", "b", "", Role::Buyer),
            Err("Passwords do not match".to_string())
        );
        let signup = SignupRequest::new(" Ann ", email, "pw", "pw", "555", Role::Seller).unwrap();
        assert_eq!(signup.name, "Ann");
        assert_eq!(signup.role, Role::Seller);
    }

    #[test]
    fn test_draft_validation() {
        let mut draft = ProductDraft {
            name: "Lamp".to_string(),
            description: String::new(),
            price: Price::new(10.into()),
            stock: 1,
            available: true,
            category: Some(Category::new("home and kitchen")),
            sizes: vec![],
            colors: vec![],
            images: vec![],
        };
        assert!(draft.validate().is_ok());
        draft.name = "  ".to_string();
        assert!(draft.validate().is_err());
    }
}
