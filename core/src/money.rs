//! # Money
//!
//! Exact currency arithmetic in minor units (cents).
//!
//! Prices, option deltas, fees and totals are all `Money`. Amounts are signed
//! because variation options may carry a discount; the pricing layer clamps
//! the final unit price, not the individual deltas.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;
use thiserror::Error;

/// A signed amount of money in cents.
///
/// Serialized as a bare integer number of cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Whole currency units, e.g. `Money::from_major(85)` is `$85.00`.
    pub const fn from_major(units: i64) -> Self {
        Money(units * 100)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Floors negative amounts at zero.
    pub fn clamp_zero(self) -> Self {
        Money(self.0.max(0))
    }

    /// Multiply by a line quantity, saturating at the `i64` bounds.
    pub fn times(self, quantity: u32) -> Self {
        Money(self.0.saturating_mul(i64::from(quantity)))
    }

    /// Multiply by a line quantity, `None` on overflow.
    pub fn checked_times(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(i64::from(quantity)).map(Money)
    }

    pub fn checked_add(self, rhs: Money) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Parse a decimal amount with at most two fractional digits.
    ///
    /// Accepts `"85"`, `"85.5"`, `"85.50"`, `"-5.00"` and an optional leading `$`.
    pub fn parse(input: &str) -> Result<Self, MoneyParseError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        let (negative, rest) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let rest = rest.strip_prefix('$').unwrap_or(rest);

        let (whole, fraction) = match rest.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (rest, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(MoneyParseError::Invalid(input.to_string()));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(MoneyParseError::Invalid(input.to_string()));
        }
        if fraction.len() > 2 {
            return Err(MoneyParseError::TooPrecise(input.to_string()));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| MoneyParseError::Invalid(input.to_string()))?
        };
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().unwrap_or(0) * 10,
            _ => fraction.parse().unwrap_or(0),
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction))
            .ok_or_else(|| MoneyParseError::Invalid(input.to_string()))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    #[error("empty amount")]
    Empty,
    #[error("invalid amount: {0}")]
    Invalid(String),
    #[error("amount has more than two decimal places: {0}")]
    TooPrecise(String),
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variants() {
        assert_eq!(Money::parse("85").unwrap(), Money::from_cents(8500));
        assert_eq!(Money::parse("85.5").unwrap(), Money::from_cents(8550));
        assert_eq!(Money::parse("$12.05").unwrap(), Money::from_cents(1205));
        assert_eq!(Money::parse("-5.00").unwrap(), Money::from_cents(-500));
        assert_eq!(Money::parse(".75").unwrap(), Money::from_cents(75));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Money::parse("  "), Err(MoneyParseError::Empty));
        assert!(matches!(Money::parse("12.345"), Err(MoneyParseError::TooPrecise(_))));
        assert!(matches!(Money::parse("1,50"), Err(MoneyParseError::Invalid(_))));
        assert!(matches!(Money::parse("."), Err(MoneyParseError::Invalid(_))));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_major(130).to_string(), "$130.00");
        assert_eq!(Money::from_cents(-505).to_string(), "-$5.05");
        assert_eq!(Money::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let total: Money = [Money::from_major(1), Money::from_cents(250)].iter().sum();
        assert_eq!(total, Money::from_cents(350));
        assert_eq!(Money::from_cents(125).times(3), Money::from_cents(375));
        assert_eq!(Money::from_cents(-10).clamp_zero(), Money::ZERO);
    }

    #[test]
    fn test_huge_amounts_do_not_wrap() {
        let price = Money::from_major(25_000_000);
        assert_eq!(price.checked_times(u32::MAX), None);
        assert_eq!(price.times(u32::MAX), Money::from_cents(i64::MAX));
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
        assert_eq!(Money::from_cents(i64::MAX) + Money::from_cents(1), Money::from_cents(i64::MAX));
        assert_eq!(Money::from_cents(i64::MIN) - Money::from_cents(1), Money::from_cents(i64::MIN));
        assert_eq!(price.checked_times(999), Some(Money::from_major(24_975_000_000)));
    }

    #[test]
    fn test_serializes_as_cents() {
        let json = serde_json::to_string(&Money::from_cents(8550)).unwrap();
        assert_eq!(json, "8550");
    }
}
