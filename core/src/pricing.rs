//! Price aggregation for cart lines and checkout quotes.

use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Base price plus every selected option delta, floored at zero.
///
/// Option deltas may be negative (a discount option); the sum is clamped so a
/// line can never charge a negative amount.
pub fn unit_price<I>(base: Money, deltas: I) -> Money
where
    I: IntoIterator<Item = Money>,
{
    let raw = deltas.into_iter().fold(base, |acc, delta| acc + delta);
    if raw.is_negative() {
        tracing::debug!(raw = %raw, "unit price below zero, clamping");
    }
    raw.clamp_zero()
}

pub fn line_total(unit: Money, quantity: u32) -> Money {
    unit.times(quantity)
}

/// [`unit_price`] times `quantity`, `None` when any step leaves the `i64` range.
pub fn checked_line_total<I>(base: Money, deltas: I, quantity: u32) -> Option<Money>
where
    I: IntoIterator<Item = Money>,
{
    deltas
        .into_iter()
        .try_fold(base, Money::checked_add)?
        .clamp_zero()
        .checked_times(quantity)
}

/// The three figures shown at checkout and frozen into the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

impl Quote {
    pub fn new(subtotal: Money, delivery_fee: Money) -> Self {
        Self {
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_quote_adds_delivery_fee() {
        let quote = Quote::new(Money::from_major(100), Money::from_major(30));
        assert_eq!(quote.total, Money::from_major(130));
        assert_eq!(quote.total.to_string(), "$130.00");
    }

    #[test]
    fn test_unit_price_clamps_discounts() {
        let price = unit_price(
            Money::from_major(10),
            [Money::from_major(-15), Money::from_major(2)],
        );
        assert_eq!(price, Money::ZERO);
    }

    #[test]
    fn test_unit_price_with_positive_deltas() {
        let price = unit_price(
            Money::from_major(85),
            [Money::from_major(35), Money::from_major(15)],
        );
        assert_eq!(line_total(price, 2), Money::from_major(270));
    }

    #[test]
    fn test_checked_line_total() {
        let deltas = [Money::from_major(35), Money::from_major(-200)];
        assert_eq!(checked_line_total(Money::from_major(85), deltas, 3), Some(Money::ZERO));
        assert_eq!(
            checked_line_total(Money::from_major(85), [Money::from_major(35)], 2),
            Some(Money::from_major(240))
        );
        assert_eq!(
            checked_line_total(Money::from_cents(i64::MAX), [Money::from_cents(1)], 1),
            None
        );
        assert_eq!(checked_line_total(Money::from_major(25_000_000), [], u32::MAX), None);
    }

    proptest! {
        #[test]
        fn prop_total_is_subtotal_plus_fee(subtotal in 0i64..10_000_000, fee in 0i64..100_000) {
            let quote = Quote::new(Money::from_cents(subtotal), Money::from_cents(fee));
            prop_assert_eq!(quote.total.cents(), subtotal + fee);
        }

        #[test]
        fn prop_unit_price_never_negative(
            base in 0i64..100_000,
            deltas in proptest::collection::vec(-50_000i64..50_000, 0..6),
        ) {
            let price = unit_price(Money::from_cents(base), deltas.into_iter().map(Money::from_cents));
            prop_assert!(!price.is_negative());
        }
    }
}
