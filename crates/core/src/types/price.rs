//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored as decimal strings (`"2999"`, `"24.99"`) in the JSON
//! datastore. Deserialization also accepts bare JSON numbers, which older
//! files and hand-written fixtures sometimes contain.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("price must be a decimal number: {0}")]
    Invalid(String),
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
}

/// A non-negative monetary amount in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// Parse a price from its decimal string form.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Invalid` for non-numeric input and
    /// `PriceError::Negative` for amounts below zero.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.to_owned()))?;
        Self::new(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Relative distance from `self` to `other`, as a fraction of `self`.
    ///
    /// Returns `None` when `self` is zero, since no meaningful ratio exists.
    #[must_use]
    pub fn relative_difference(&self, other: &Self) -> Option<f64> {
        if self.0.is_zero() {
            return None;
        }
        ((self.0 - other.0).abs() / self.0).to_f64()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Price {
    fn from(amount: u32) -> Self {
        Self(Decimal::from(amount))
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|p| p.0).sum())
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        let amount = match Repr::deserialize(deserializer)? {
            Repr::Text(s) => return Self::parse(&s).map_err(serde::de::Error::custom),
            Repr::Integer(n) => Decimal::from(n),
            Repr::Float(f) => Decimal::try_from(f).map_err(serde::de::Error::custom)?,
        };
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_and_fraction() {
        assert_eq!(Price::parse("2999").unwrap().to_string(), "2999");
        assert_eq!(Price::parse(" 24.99 ").unwrap().to_string(), "24.99");
    }

    #[test]
    fn test_parse_rejects_garbage_and_negative() {
        assert!(matches!(Price::parse("abc"), Err(PriceError::Invalid(_))));
        assert!(matches!(Price::parse("-1"), Err(PriceError::Negative)));
    }

    #[test]
    fn test_times() {
        let price = Price::parse("12.50").unwrap();
        assert_eq!(price.times(2), Price::parse("25.00").unwrap());
    }

    #[test]
    fn test_relative_difference() {
        let base = Price::parse("100").unwrap();
        let other = Price::parse("105").unwrap();
        let diff = base.relative_difference(&other).unwrap();
        assert!((diff - 0.05).abs() < 1e-9);
        assert!(Price::ZERO.relative_difference(&other).is_none());
    }

    #[test]
    fn test_serializes_as_string() {
        let price = Price::parse("1899").unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"1899\"");
    }

    #[test]
    fn test_deserializes_string_or_number() {
        let from_str: Price = serde_json::from_str("\"2499.00\"").unwrap();
        let from_int: Price = serde_json::from_str("2499").unwrap();
        let from_float: Price = serde_json::from_str("2499.5").unwrap();
        assert_eq!(from_str, from_int);
        assert_eq!(from_float, Price::parse("2499.5").unwrap());
        assert!(serde_json::from_str::<Price>("\"-3\"").is_err());
    }

    #[test]
    fn test_sum() {
        let total: Price = ["1.10", "2.20"]
            .iter()
            .map(|s| Price::parse(s).unwrap())
            .sum();
        assert_eq!(total, Price::parse("3.30").unwrap());
    }
}
