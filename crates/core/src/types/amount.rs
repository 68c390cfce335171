//! Decimal amounts: item prices and carat weights.
//!
//! Both are non-negative decimals with at most two fractional digits, so they
//! are stored as whole hundredths (cents and points) and sorted as integers.

use std::fmt;
use std::iter::Sum;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a submitted amount is rejected.
///
/// Messages are phrased to follow the field label, e.g. "Price must be a number".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("must be a number")]
    Invalid,
    #[error("must not be negative")]
    Negative,
    #[error("must have at most two decimal places")]
    TooPrecise,
    #[error("is too large")]
    OutOfRange,
}

/// Convert a decimal into whole hundredths, enforcing the shared amount rules.
fn to_hundredths(value: Decimal) -> Result<i64, AmountError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AmountError::Negative);
    }
    if value.normalize().scale() > 2 {
        return Err(AmountError::TooPrecise);
    }
    value
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.to_i64())
        .ok_or(AmountError::OutOfRange)
}

fn parse_decimal(raw: &str) -> Result<Decimal, AmountError> {
    Decimal::from_str(raw.trim()).map_err(|_| AmountError::Invalid)
}

/// An item price in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(i64);

impl Price {
    /// A zero price, the total of an empty cart.
    pub const ZERO: Self = Self(0);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `AmountError` if the amount is negative, has more than two
    /// decimal places, or does not fit in cents.
    pub fn new(amount: Decimal) -> Result<Self, AmountError> {
        to_hundredths(amount).map(Self)
    }

    /// Create a price from whole cents as stored in the database.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The price in whole cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// The price as a decimal amount.
    #[must_use]
    pub fn amount(self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl FromStr for Price {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(parse_decimal(s)?)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.amount()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.amount())
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|p| p.0).fold(0_i64, i64::saturating_add))
    }
}

impl<'a> Sum<&'a Self> for Price {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// A carat weight, stored as points (hundredths of a carat).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Carat(i64);

impl Carat {
    /// Create a carat weight from a decimal value.
    ///
    /// # Errors
    ///
    /// Returns `AmountError` under the same rules as [`Price::new`].
    pub fn new(weight: Decimal) -> Result<Self, AmountError> {
        to_hundredths(weight).map(Self)
    }

    /// Create a carat weight from points.
    #[must_use]
    pub const fn from_points(points: i64) -> Self {
        Self(points)
    }

    /// The weight in points.
    #[must_use]
    pub const fn points(self) -> i64 {
        self.0
    }

    /// The weight in carats.
    #[must_use]
    pub fn weight(self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl FromStr for Carat {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(parse_decimal(s)?)
    }
}

impl TryFrom<Decimal> for Carat {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Carat> for Decimal {
    fn from(carat: Carat) -> Self {
        carat.weight()
    }
}

impl fmt::Display for Carat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} ct", self.weight())
    }
}
