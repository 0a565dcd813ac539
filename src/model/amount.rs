//! Amount type for handling monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal` so that totals never pick up
//! binary floating point drift. On the wire an `Amount` is a JSON number, but numeric strings
//! such as `"12.50"` or `"₹1,200"` are accepted too since HTML forms hand values over as text.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// The symbols that may precede the digits of a parsed amount.
const CURRENCY_SYMBOLS: [char; 5] = ['$', '₹', '€', '£', '¥'];

/// Represents an amount of money.
///
/// # Examples
///
/// ```
/// # use expense_tracker::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("0.1").unwrap();
/// let b = Amount::from_str("0.2").unwrap();
/// assert_eq!(a.checked_add(b).unwrap().to_string(), "0.3");
/// ```
///
/// A leading currency symbol and thousands separators are ignored when parsing:
/// ```
/// # use expense_tracker::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("₹1,200.50").unwrap();
/// assert_eq!(a.to_string(), "1200.50");
/// assert_eq!(a.display("₹"), "₹1,200.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const ZERO: Amount = Amount::new(Decimal::ZERO);

    /// The largest amount a single expense may have: one quadrillion.
    pub const MAX: Amount = Amount::new(Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0));

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value().is_sign_negative()
    }

    /// Adds two amounts, returning `None` if the sum does not fit in a `Decimal`.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.value.checked_add(rhs.value).map(Amount::new)
    }

    /// Subtracts `rhs`, returning `None` on overflow.
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.value.checked_sub(rhs.value).map(Amount::new)
    }

    /// Formats the amount for people: currency symbol, thousands separators and two decimals,
    /// e.g. `₹1,234.50` or `-$60,000.00`.
    pub fn display(&self, currency: &str) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let num = self.value().abs().round_dp(2);
        format!(
            "{sign}{currency}{}",
            format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
        )
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        // Keep the sign, drop one currency symbol in front of the digits: "-$50", "₹50"
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let rest = rest
            .strip_prefix(CURRENCY_SYMBOLS)
            .map(str::trim_start)
            .unwrap_or(rest);
        if !rest.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            return Err(AmountError(rust_decimal::Error::ErrorString(format!(
                "'{s}' is not a number"
            ))));
        }
        let digits = rest.replace(',', "");
        let number = if negative {
            format!("-{digits}")
        } else {
            digits
        };

        let value = Decimal::from_str(&number)
            .or_else(|_| Decimal::from_scientific(&number))
            .map_err(AmountError)?;
        Ok(Amount::new(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.value, f)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Whole numbers go out as integers (`12`, not `12.0`), like a JavaScript number would.
        let normalized = self.value.normalize();
        if normalized.scale() == 0 {
            if let Some(i) = normalized.to_i64() {
                return serializer.serialize_i64(i);
            }
        }
        match normalized.to_f64() {
            Some(f) => serializer.serialize_f64(f),
            None => Err(serde::ser::Error::custom(format!(
                "Amount {normalized} cannot be represented as a number"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        // `Decimal::try_from(f64)` keeps the shortest decimal that round-trips, so 4.5 stays 4.5
        // and 0.1 stays 0.1 instead of 0.1000000000000000055511151231257827.
        Decimal::try_from(v)
            .map(Amount::new)
            .map_err(|_| E::custom(format!("{v} is not a valid amount")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Amount::from_str(v).map_err(E::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("50.00").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
    }

    #[test]
    fn test_parse_with_currency_symbol() {
        assert_eq!(Amount::from_str("$50.00").unwrap().value(), dec("50"));
        assert_eq!(Amount::from_str("₹50.00").unwrap().value(), dec("50"));
    }

    #[test]
    fn test_parse_negative_with_currency_symbol() {
        let amount = Amount::from_str("-$50.00").unwrap();
        assert_eq!(amount.value(), dec("-50.00"));
        assert!(amount.is_negative());
    }

    #[test]
    fn test_parse_whitespace_and_commas() {
        let amount = Amount::from_str("  $1,234,567.89  ").unwrap();
        assert_eq!(amount.value(), dec("1234567.89"));
    }

    #[test]
    fn test_parse_scientific() {
        assert_eq!(Amount::from_str("1e2").unwrap().value(), dec("100"));
    }

    #[test]
    fn test_parse_garbage() {
        for text in ["lots", "", "12abc", "abc12", "USD 7", "e5", "$$5", "-", "$"] {
            assert!(Amount::from_str(text).is_err(), "{text}");
        }
    }

    #[test]
    fn test_parse_symbol_then_space() {
        assert_eq!(Amount::from_str("€ 7").unwrap().value(), dec("7"));
        assert_eq!(Amount::from_str("-£ 7.25").unwrap().value(), dec("-7.25"));
    }

    #[test]
    fn test_checked_add_is_exact() {
        let a = Amount::from_str("0.1").unwrap();
        let b = Amount::from_str("0.2").unwrap();
        assert_eq!(a.checked_add(b).unwrap().value(), dec("0.3"));
    }

    #[test]
    fn test_checked_add_overflow() {
        let huge = Amount::new(Decimal::MAX);
        assert_eq!(huge.checked_add(Amount::from_str("1").unwrap()), None);
        assert_eq!(huge.checked_add(Amount::ZERO), Some(huge));
    }

    #[test]
    fn test_max() {
        assert_eq!(Amount::MAX.value(), dec("1000000000000000"));
        assert_eq!(
            Amount::MAX.checked_sub(Amount::MAX),
            Some(Amount::ZERO)
        );
    }

    #[test]
    fn test_zero_is_not_negative() {
        assert!(!Amount::ZERO.is_negative());
        assert!(!Amount::from_str("-0").unwrap().is_negative());
    }

    #[test]
    fn test_display_for_people() {
        let amount = Amount::from_str("1234.5").unwrap();
        assert_eq!(amount.display("₹"), "₹1,234.50");
        let negative = Amount::from_str("-60000").unwrap();
        assert_eq!(negative.display("$"), "-$60,000.00");
        assert_eq!(Amount::ZERO.display("$"), "$0.00");
    }

    #[test]
    fn test_serialize_integral_as_integer() {
        let amount = Amount::from_str("12.00").unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "12");
        assert_eq!(serde_json::to_string(&Amount::ZERO).unwrap(), "0");
    }

    #[test]
    fn test_serialize_fraction_as_float() {
        let amount = Amount::from_str("4.50").unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "4.5");
    }

    #[test]
    fn test_deserialize_number() {
        let amount: Amount = serde_json::from_str("4.5").unwrap();
        assert_eq!(amount.value(), dec("4.5"));
        let amount: Amount = serde_json::from_str("0.1").unwrap();
        assert_eq!(amount.value(), dec("0.1"));
        let amount: Amount = serde_json::from_str("7").unwrap();
        assert_eq!(amount.value(), dec("7"));
    }

    #[test]
    fn test_deserialize_string() {
        let amount: Amount = serde_json::from_str("\"12.25\"").unwrap();
        assert_eq!(amount.value(), dec("12.25"));
    }

    #[test]
    fn test_deserialize_rejects_other_types() {
        assert!(serde_json::from_str::<Amount>("true").is_err());
        assert!(serde_json::from_str::<Amount>("\"abc\"").is_err());
    }
}
