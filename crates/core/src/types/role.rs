//! Marketplace account roles.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Error returned for an unrecognized role string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid role: {0} (expected buyer or seller)")]
pub struct ParseRoleError(pub String);

/// Account role chosen at signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Role {
    /// Browses, buys, keeps a wishlist.
    #[default]
    Buyer,
    /// Lists products and manages sales.
    Seller,
}

impl Role {
    /// Whether this role may manage products and sales.
    #[must_use]
    pub const fn is_seller(self) -> bool {
        matches!(self, Self::Seller)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buyer => write!(f, "buyer"),
            Self::Seller => write!(f, "seller"),
        }
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buyer" => Ok(Self::Buyer),
            "seller" => Ok(Self::Seller),
            _ => Err(ParseRoleError(s.to_owned())),
        }
    }
}

// The profile service stores whatever casing the signup form sent.
impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
