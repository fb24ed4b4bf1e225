//! Order status as reported by the order service.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Order fulfillment status.
///
/// Sellers set the status by hand, so the order service stores free text.
/// Known values are matched case-insensitively with `-`, `_` and spaces treated
/// alike; anything else is kept verbatim in [`OrderStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    /// Paid, not yet acknowledged by the seller.
    #[default]
    Pending,
    /// Seller acknowledged the order.
    Received,
    /// Shipped.
    OnTheWay,
    /// Delivered to the buyer.
    Delivered,
    /// Cancelled by seller or buyer.
    Cancelled,
    /// Unrecognized status text.
    Other(String),
}

impl OrderStatus {
    /// The statuses a seller can pick from.
    pub const KNOWN: [Self; 5] = [
        Self::Pending,
        Self::Received,
        Self::OnTheWay,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Wire string for this status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Received => "Received",
            Self::OnTheWay => "On the way",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Other(raw) => raw,
        }
    }

    /// Whether the order can still change status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Lower-case grouping key (used when counting orders per status).
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Other(raw) => raw.trim().to_lowercase(),
            known => known.as_str().to_lowercase().replace(' ', "-"),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| if c == '_' || c == ' ' { '-' } else { c.to_ascii_lowercase() })
            .collect();

        Ok(match normalized.as_str() {
            "pending" => Self::Pending,
            "received" => Self::Received,
            "on-the-way" | "ontheway" | "shipped" => Self::OnTheWay,
            "delivered" => Self::Delivered,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Other(s.trim().to_owned()),
        })
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let Ok(status) = raw.parse();
        Ok(status)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(s: &str) -> OrderStatus {
        let Ok(status) = s.parse();
        status
    }

    #[test]
    fn test_parse_known_case_insensitive() {
        assert_eq!(parse("Pending"), OrderStatus::Pending);
        assert_eq!(parse("RECEIVED"), OrderStatus::Received);
        assert_eq!(parse("on the way"), OrderStatus::OnTheWay);
        assert_eq!(parse("On-The-Way"), OrderStatus::OnTheWay);
        assert_eq!(parse("on_the_way"), OrderStatus::OnTheWay);
        assert_eq!(parse(" delivered "), OrderStatus::Delivered);
        assert_eq!(parse("canceled"), OrderStatus::Cancelled);
    }

    #[test]
    fn test_parse_unknown_is_preserved() {
        assert_eq!(
            parse("waiting for pickup"),
            OrderStatus::Other("waiting for pickup".to_string())
        );
    }

    #[test]
    fn test_serde_round_trip_wire_form() {
        let json = serde_json::to_string(&OrderStatus::OnTheWay).unwrap();
        assert_eq!(json, "\"On the way\"");
        let status: OrderStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(status, OrderStatus::Pending);
    }

    #[test]
    fn test_key_groups_variants() {
        assert_eq!(OrderStatus::OnTheWay.key(), "on-the-way");
        assert_eq!(OrderStatus::Other(" Lost ".to_string()).key(), "lost");
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Received.is_terminal());
    }
}
