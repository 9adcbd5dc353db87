//! Money type for representing prices.
//!
//! Uses cents-based integer representation so that proportional line-price
//! recomputation doesn't accumulate floating-point drift. On the wire and in
//! the local mirror a value serializes as a plain JSON number (`40.0`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Minor units per major unit.
const CENTS_PER_UNIT: i64 = 100;

/// A monetary amount in the storefront's single currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Money {
    amount_cents: i64,
}

impl Money {
    /// Create a new Money value from cents.
    pub const fn new(amount_cents: i64) -> Self {
        Self { amount_cents }
    }

    /// Create a Money value from a decimal amount, rounding to the nearest cent.
    ///
    /// ```
    /// use omakase_cart::Money;
    /// let price = Money::from_decimal(20.0);
    /// assert_eq!(price.amount_cents(), 2000);
    /// ```
    pub fn from_decimal(amount: f64) -> Self {
        Self::new((amount * CENTS_PER_UNIT as f64).round() as i64)
    }

    /// A zero amount.
    pub const fn zero() -> Self {
        Self::new(0)
    }

    /// Amount in cents.
    pub fn amount_cents(&self) -> i64 {
        self.amount_cents
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Convert to a decimal value.
    pub fn to_decimal(&self) -> f64 {
        self.amount_cents as f64 / CENTS_PER_UNIT as f64
    }

    /// Format without symbol (e.g., "49.99").
    pub fn display_amount(&self) -> String {
        format!("{:.2}", self.to_decimal())
    }

    /// Multiply by a quantity, returning `None` on overflow.
    pub fn try_multiply(&self, quantity: u32) -> Option<Money> {
        self.amount_cents
            .checked_mul(i64::from(quantity))
            .map(Money::new)
    }

    /// Rescale an amount priced for `from_quantity` units to `to_quantity` units.
    ///
    /// Computes `self / from_quantity * to_quantity`, rounded half away from
    /// zero to the nearest cent. A `from_quantity` of zero leaves the amount
    /// unchanged.
    pub fn prorate(&self, from_quantity: u32, to_quantity: u32) -> Money {
        if from_quantity == 0 {
            return *self;
        }
        let numerator = i128::from(self.amount_cents) * i128::from(to_quantity);
        let denominator = i128::from(from_quantity);
        let half = denominator / 2;
        let rounded = if numerator >= 0 {
            (numerator + half) / denominator
        } else {
            (numerator - half) / denominator
        };
        Money::new(i64::try_from(rounded).unwrap_or(i64::MAX))
    }

    /// Sum an iterator of Money values.
    pub fn sum<'a>(iter: impl Iterator<Item = &'a Money>) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money::new(self.amount_cents.saturating_add(other.amount_cents))
    }
}

impl From<f64> for Money {
    fn from(amount: f64) -> Self {
        Money::from_decimal(amount)
    }
}

impl From<Money> for f64 {
    fn from(money: Money) -> Self {
        money.to_decimal()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_amount())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_decimal_rounds() {
        assert_eq!(Money::from_decimal(49.99).amount_cents(), 4999);
        assert_eq!(Money::from_decimal(0.1 + 0.2).amount_cents(), 30);
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&Money::new(4000)).unwrap();
        assert_eq!(json, "40.0");

        let back: Money = serde_json::from_str("40").unwrap();
        assert_eq!(back, Money::new(4000));
    }

    #[test]
    fn test_prorate_preserves_unit_price() {
        let line = Money::from_decimal(40.0);
        assert_eq!(line.prorate(2, 3), Money::from_decimal(60.0));
        assert_eq!(line.prorate(2, 1), Money::from_decimal(20.0));
    }

    #[test]
    fn test_prorate_rounds_to_cent() {
        // 10.00 for 3 units is 3.333.. each
        let line = Money::from_decimal(10.0);
        assert_eq!(line.prorate(3, 4).amount_cents(), 1333);
        assert_eq!(line.prorate(3, 1).amount_cents(), 333);
    }

    #[test]
    fn test_prorate_zero_quantity_is_identity() {
        let line = Money::from_decimal(12.5);
        assert_eq!(line.prorate(0, 5), line);
    }

    #[test]
    fn test_sum_and_multiply() {
        let prices = [Money::new(100), Money::new(250)];
        assert_eq!(Money::sum(prices.iter()), Money::new(350));
        assert_eq!(Money::new(250).try_multiply(3), Some(Money::new(750)));
        assert_eq!(Money::new(i64::MAX).try_multiply(2), None);
    }

    #[test]
    fn test_display_amount() {
        assert_eq!(Money::from_decimal(7.5).to_string(), "7.50");
    }
}
