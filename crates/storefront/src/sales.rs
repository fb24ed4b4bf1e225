//! Seller sales summary.
//!
//! The numbers behind a seller dashboard: how many orders, how much revenue
//! and how the orders split across statuses. Cancelled orders are counted
//! but earn nothing.

use std::collections::BTreeMap;

use cybermart_core::{OrderStatus, Price};
use serde::Serialize;

use crate::backend::Order;

/// Aggregate over a seller's sales.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SalesSummary {
    /// Number of orders.
    pub order_count: usize,
    /// Units sold across non-cancelled orders.
    pub units_sold: u64,
    /// Revenue across non-cancelled orders.
    pub revenue: Price,
    /// Order count per status key (`pending`, `on-the-way`, ...).
    pub by_status: BTreeMap<String, usize>,
}

impl SalesSummary {
    /// Summarize a sales list.
    #[must_use]
    pub fn from_orders(orders: &[Order]) -> Self {
        let mut summary = Self::default();
        for status in &OrderStatus::KNOWN {
            summary.by_status.insert(status.key(), 0);
        }

        for order in orders {
            summary.order_count += 1;
            *summary.by_status.entry(order.status.key()).or_default() += 1;

            if order.status == OrderStatus::Cancelled {
                continue;
            }
            summary.revenue = summary.revenue + order.total;
            summary.units_sold += order
                .items
                .iter()
                .map(|item| u64::from(item.quantity))
                .sum::<u64>();
        }

        summary
    }
}
