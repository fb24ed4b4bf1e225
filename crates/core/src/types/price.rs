//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog prices arrive as decimal major units (e.g. dollars). Payment
//! providers want integer minor units (e.g. cents), so the conversion lives
//! here in one place.
//!
//! Prices come from backend JSON and can be arbitrarily large. Sums and
//! line totals saturate at the decimal bounds instead of panicking, and any
//! amount that does not fit in minor units converts to `None`.

use core::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of minor units per major unit (cents per dollar).
const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// A price in major currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// The zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from minor units (e.g. cents).
    #[must_use]
    pub fn from_minor_units(minor: i64) -> Self {
        Self(Decimal::new(minor, 2))
    }

    /// The decimal amount in major units.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Round to cents, midpoint away from zero.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Amount in minor units, or `None` if it does not fit in an `i64`.
    #[must_use]
    pub fn minor_units(&self) -> Option<i64> {
        to_minor_units(self.0)
    }

    /// Two-decimal string form (e.g. `"19.90"`).
    #[must_use]
    pub fn to_fixed(&self) -> String {
        format!("{:.2}", self.rounded().0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.to_fixed())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self::Output {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Price {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Line total for a unit price and quantity.
#[must_use]
pub fn line_total(unit: Price, quantity: u32) -> Price {
    unit * quantity
}

/// Convert a major-unit amount to minor units.
///
/// The amount is first rounded to two decimal places with midpoint away from
/// zero, so `10.005` becomes `1001`.
#[must_use]
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))?
        .to_i64()
}
