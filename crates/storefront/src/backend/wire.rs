//! Raw JSON shapes exchanged with the backends.
//!
//! The services are loosely typed: numbers sometimes arrive as strings, lists
//! as `null`, and product references either populated or as bare ids. The
//! deserializers here accept all of that and leave validation to
//! `conversions.rs`.

use cybermart_core::{OrderStatus, ProductId, Role};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// =============================================================================
// Lenient field deserializers
// =============================================================================

/// Number or numeric string; anything else is `None`.
fn lenient_decimal<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Decimal>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Non-negative whole number, or numeric string holding one.
fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// A list of strings that may also be `null` or a single string.
fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                _ => None,
            })
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    })
}

/// A string that may be `null`, blank, or something else entirely.
fn optional_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

const fn default_true() -> bool {
    true
}

// =============================================================================
// Product references
// =============================================================================

/// A product reference: populated document or bare id string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Populated(Box<WireProduct>),
    Bare(ProductId),
}

impl ProductRef {
    pub fn id(&self) -> &ProductId {
        match self {
            Self::Populated(product) => &product.id,
            Self::Bare(id) => id,
        }
    }
}

/// A user reference: populated document or bare id string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UserRef {
    Populated {
        #[serde(rename = "_id")]
        id: String,
    },
    Bare(String),
}

impl UserRef {
    pub fn into_id(self) -> String {
        match self {
            Self::Populated { id } | Self::Bare(id) => id,
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct WireProduct {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(default, deserialize_with = "optional_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub desc: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub stock: Option<u32>,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default, rename = "type", deserialize_with = "optional_text")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub sizes: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub colors: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub img: Vec<String>,
    #[serde(default)]
    pub seller: Option<UserRef>,
}

/// Body for product create/update.
#[derive(Debug, Serialize)]
pub struct ProductBody<'a> {
    pub name: &'a str,
    pub desc: &'a str,
    pub img: &'a [String],
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub category: Option<&'a str>,
    pub stock: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub available: bool,
    pub sizes: &'a [String],
    pub colors: &'a [String],
}

// =============================================================================
// Cart and wishlist
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct WireCartLine {
    #[serde(default)]
    pub product: Option<ProductRef>,
    #[serde(default, alias = "quantity", deserialize_with = "lenient_count")]
    pub amount: Option<u32>,
    #[serde(default, deserialize_with = "optional_text")]
    pub size: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub sizes: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub colors: Vec<String>,
}

/// Product part of a cart or wishlist write.
#[derive(Debug, Serialize)]
pub struct ProductSelection<'a> {
    #[serde(rename = "_id")]
    pub id: &'a ProductId,
    pub sizes: Option<Vec<&'a str>>,
    pub colors: Option<Vec<&'a str>>,
}

/// Body for `PUT /cart` (upsert-or-remove).
#[derive(Debug, Serialize)]
pub struct ManageCartBody<'a> {
    pub product: ProductSelection<'a>,
    pub amount: u32,
    #[serde(rename = "isRemove")]
    pub is_remove: bool,
}

/// Body for `POST /wishlist`.
#[derive(Debug, Serialize)]
pub struct WishlistBody<'a> {
    pub product: ProductSelection<'a>,
    pub amount: u32,
}

// =============================================================================
// Orders and payments
// =============================================================================

#[derive(Debug, Serialize)]
pub struct PaymentIntentBody {
    pub total: i64,
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntentResponse {
    #[serde(default, rename = "paymentIntent", alias = "clientSecret")]
    pub payment_intent: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductIdBody<'a> {
    #[serde(rename = "_id")]
    pub id: &'a ProductId,
}

#[derive(Debug, Serialize)]
pub struct OrderLineBody<'a> {
    pub product: ProductIdBody<'a>,
    pub amount: u32,
    pub size: Option<&'a str>,
    pub color: Option<&'a str>,
}

/// Body for `POST /order`. The total is a two-decimal string.
#[derive(Debug, Serialize)]
pub struct OrderBody<'a> {
    pub items: Vec<OrderLineBody<'a>>,
    pub amount: String,
    pub status: &'a OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct WireOrderLine {
    #[serde(default)]
    pub product: Option<ProductRef>,
    #[serde(default, alias = "quantity", deserialize_with = "lenient_count")]
    pub amount: Option<u32>,
    #[serde(default, deserialize_with = "optional_text")]
    pub size: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireOrder {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(default, alias = "total", deserialize_with = "lenient_decimal")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default, alias = "buyer")]
    pub user: Option<UserRef>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default, rename = "updatedAt")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusBody<'a> {
    pub status: &'a str,
}

// =============================================================================
// Profile
// =============================================================================

#[derive(Debug, Serialize)]
pub struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupBody<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub phone: &'a str,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct WireProfile {
    #[serde(default, rename = "_id", deserialize_with = "optional_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub about: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub img: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<&'a str>,
}
