//! Type-safe price representation using decimal arithmetic.
//!
//! Prices travel as JSON numbers (the backend stores them as floats), but all
//! arithmetic on the client happens in [`Decimal`] so subtotals never drift.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Currency symbol used when formatting prices for display.
pub const CURRENCY_SYMBOL: &str = "₹";

/// Errors that can occur when parsing a [`Price`] or [`TaxRate`] from text.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The input is not a decimal number.
    #[error("'{0}' is not a valid number")]
    NotANumber(String),
    /// The value is outside the accepted range.
    #[error("value must be between {min} and {max}")]
    OutOfRange {
        /// Smallest accepted value.
        min: Decimal,
        /// Largest accepted value.
        max: Decimal,
    },
}

/// A non-negative price in the store currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// Negative amounts are clamped to zero.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self(amount.max(Decimal::ZERO))
    }

    /// Parse a price from user input.
    ///
    /// Only checks that the input is a number and not negative.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not numeric or is negative.
    pub fn parse(s: &str) -> Result<Self, AmountError> {
        let trimmed = s.trim();
        let amount = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| AmountError::NotANumber(trimmed.to_owned()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(AmountError::OutOfRange {
                min: Decimal::ZERO,
                max: Decimal::MAX,
            });
        }
        Ok(Self(amount))
    }

    /// Returns the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units. Saturates at [`Decimal::MAX`].
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(
            self.0
                .checked_mul(Decimal::from(quantity))
                .unwrap_or(Decimal::MAX),
        )
    }

    /// Format for display (e.g., "₹199.00").
    #[must_use]
    pub fn display(&self) -> String {
        format!("{CURRENCY_SYMBOL}{:.2}", self.0.round_dp(2))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<u32> for Price {
    fn from(amount: u32) -> Self {
        Self(Decimal::from(amount))
    }
}

impl Add for Price {
    type Output = Self;

    /// Saturates at [`Decimal::MAX`].
    fn add(self, rhs: Self) -> Self {
        Self(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Accepts both JSON numbers and numeric strings.
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(D::Error::custom(format!(
                "price must not be negative, got {amount}"
            )));
        }
        Ok(Self(amount))
    }
}

/// Tax surcharge applied to the cart subtotal for display.
///
/// Illustrative only; the backend never enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// Parse a rate such as `0.1` (10%).
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a number in `[0, 1]`.
    pub fn parse(s: &str) -> Result<Self, AmountError> {
        let trimmed = s.trim();
        let rate = Decimal::from_str(trimmed)
            .map_err(|_| AmountError::NotANumber(trimmed.to_owned()))?;
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(AmountError::OutOfRange {
                min: Decimal::ZERO,
                max: Decimal::ONE,
            });
        }
        Ok(Self(rate))
    }

    /// Returns the rate as a decimal fraction.
    #[must_use]
    pub const fn rate(&self) -> Decimal {
        self.0
    }

    /// Tax owed on `subtotal`, rounded to two decimal places.
    #[must_use]
    pub fn apply(&self, subtotal: Price) -> Price {
        Price(
            subtotal
                .0
                .checked_mul(self.0)
                .unwrap_or(Decimal::MAX)
                .round_dp(2),
        )
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        Self(Decimal::new(10, 2))
    }
}

impl FromStr for TaxRate {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_display_two_decimals() {
        assert_eq!(Price::from(199).display(), "₹199.00");
        assert_eq!(Price::parse("12.5").unwrap().to_string(), "₹12.50");
    }

    #[test]
    fn test_price_parse_rejects_garbage_and_negative() {
        assert!(matches!(
            Price::parse("abc"),
            Err(AmountError::NotANumber(_))
        ));
        assert!(matches!(
            Price::parse("-3"),
            Err(AmountError::OutOfRange { .. })
        ));
        assert_eq!(Price::parse(" 0 ").unwrap(), Price::ZERO);
    }

    #[test]
    fn test_price_deserializes_from_number_and_string() {
        let from_number: Price = serde_json::from_str("199").unwrap();
        let from_string: Price = serde_json::from_str("\"199\"").unwrap();
        assert_eq!(from_number, Price::from(199));
        assert_eq!(from_string, Price::from(199));
    }

    #[test]
    fn test_price_serializes_as_number() {
        let json = serde_json::to_value(Price::parse("12.5").unwrap()).unwrap();
        assert!(json.is_number());
    }

    #[test]
    fn test_price_sum_and_times() {
        let total: Price = [Price::from(100).times(2), Price::from(50)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from(250));
    }

    #[test]
    fn test_price_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Price>("-50").is_err());
        assert!(serde_json::from_str::<Price>("\"-0.01\"").is_err());
        assert_eq!(serde_json::from_str::<Price>("0").unwrap(), Price::ZERO);
    }

    #[test]
    fn test_price_arithmetic_saturates() {
        let huge = Price::parse("50000000000000000000000000000").unwrap();
        assert_eq!(huge.times(2).amount(), Decimal::MAX);
        assert_eq!((huge + huge).amount(), Decimal::MAX);
        assert_eq!(Price::from(3).times(0), Price::ZERO);
    }

    #[test]
    fn test_tax_rate_default_is_ten_percent() {
        let tax = TaxRate::default().apply(Price::from(250));
        assert_eq!(tax, Price::from(25));
    }

    #[test]
    fn test_tax_rate_range() {
        assert!(TaxRate::parse("0.18").is_ok());
        assert!(TaxRate::parse("1.5").is_err());
        assert!(TaxRate::parse("-0.1").is_err());
        assert!(TaxRate::parse("ten").is_err());
    }
}
