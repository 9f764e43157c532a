//! # Money Module
//!
//! Provides the `Money` and `DiscountRate` types used by every discount rule.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DRIFT ACROSS RERUNS                                                    │
//! │                                                                         │
//! │  With floating point, 12% off a $19.99 bundle is 2.3988000000000003.   │
//! │  Fold that into a running total rule after rule and two checkout runs  │
//! │  on the same cart can disagree in the last digit.                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Basis Points                             │
//! │    1999 cents × 1200 bps / 10000 = 239.88 → 240 cents (explicit round) │
//! │    Same input, same cents, every run                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::{DiscountRate, Money};
//!
//! let bundle = Money::from_cents(1999);
//! let off = bundle.percent_of(DiscountRate::from_percent(12));
//! assert_eq!(off.cents(), 240);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: rule output may be negative before validation
///   (e.g. a special price above the unit price), so the type must be able
///   to represent it long enough for the validator to clamp it.
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// ## Where Money Flows
/// ```text
/// ProductRecord.price_cents ──► Item.unit_price ──► CartView::net_price
///                                                        │
///                     Rule::process ──► DiscountRecord.amount
///                                                        │
///                      CheckoutEngine ──► Cart.total = subtotal − Σ amount
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_cents(6500);
    /// assert_eq!(price.cents(), 6500);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    ///
    /// Convenience for rule configuration where prices are round numbers
    /// (combo price 59, special price 10).
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units * 100)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion (truncated toward zero).
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps the value into `[lo, hi]`.
    ///
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let hi = Money::from_cents(500);
    /// assert_eq!(Money::from_cents(-20).clamp_to(Money::zero(), hi), Money::zero());
    /// assert_eq!(Money::from_cents(900).clamp_to(Money::zero(), hi), hi);
    /// ```
    #[inline]
    pub fn clamp_to(self, lo: Money, hi: Money) -> Money {
        self.max(lo).min(hi)
    }

    /// Addition that stops at the `i64` bounds instead of overflowing.
    #[inline]
    pub const fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    /// Applies a discount rate and returns the discount amount (not the
    /// discounted price).
    ///
    /// ## Rounding
    /// Integer math in i128: `(amount × bps ± 5000) / 10000`, so halves
    /// round away from zero. The result is exact for any whole-percent rate
    /// on prices that are multiples of one currency unit.
    ///
    /// ```rust
    /// use tally_core::money::{DiscountRate, Money};
    ///
    /// let pair = Money::from_units(130);
    /// assert_eq!(pair.percent_of(DiscountRate::from_percent(12)), Money::from_cents(1560));
    /// ```
    pub fn percent_of(&self, rate: DiscountRate) -> Money {
        let raw = self.0 as i128 * rate.bps() as i128;
        let bias = if raw < 0 { -5000 } else { 5000 };
        Money::from_cents(((raw + bias) / 10000) as i64)
    }

    /// Splits `amount` across `weights` proportionally.
    ///
    /// Each share is floored first, then leftover cents are handed out one
    /// at a time, front to back, to shares still below their weight. As long
    /// as `0 <= amount <= Σ weights` the shares sum exactly to `amount` and
    /// no share exceeds its weight.
    ///
    /// If every weight is zero the whole amount lands on the first share so
    /// the sum is preserved; the validator clamps it afterwards.
    ///
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let shares = Money::from_cents(100).allocate(&[
    ///     Money::from_cents(100),
    ///     Money::from_cents(100),
    ///     Money::from_cents(100),
    /// ]);
    /// let cents: Vec<i64> = shares.iter().map(|m| m.cents()).collect();
    /// assert_eq!(cents, vec![34, 33, 33]);
    /// ```
    pub fn allocate(&self, weights: &[Money]) -> Vec<Money> {
        if weights.is_empty() {
            return Vec::new();
        }

        let total: i128 = weights.iter().map(|w| w.0.max(0) as i128).sum();
        if total == 0 {
            let mut shares = vec![Money::zero(); weights.len()];
            shares[0] = *self;
            return shares;
        }

        let amount = self.0 as i128;
        let mut shares: Vec<Money> = weights
            .iter()
            .map(|w| Money::from_cents((amount * w.0.max(0) as i128 / total) as i64))
            .collect();

        let mut remainder = self.0 - shares.iter().map(|s| s.0).sum::<i64>();
        while remainder > 0 {
            let before = remainder;
            for (share, weight) in shares.iter_mut().zip(weights) {
                if remainder == 0 {
                    break;
                }
                if share.0 < weight.0 {
                    share.0 += 1;
                    remainder -= 1;
                }
            }
            if remainder == before {
                // amount exceeded Σ weights; the last share takes the excess
                if let Some(last) = shares.last_mut() {
                    last.0 += remainder;
                }
                break;
            }
        }
        if remainder < 0 {
            if let Some(last) = shares.last_mut() {
                last.0 += remainder;
            }
        }

        shares
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// A percentage discount expressed in basis points (bps).
///
/// 1 basis point = 0.01%, so `1200` bps is 12% off. Percentages are stored
/// as integers so `percentOff / 100` never touches floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Maximum sensible rate: 100% off.
    pub const MAX_BPS: u32 = 10_000;

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a rate from a whole percentage (`12` = 12% off).
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        DiscountRate(percent * 100)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Whole percentage, truncated (for labels such as "88折").
    #[inline]
    pub const fn whole_percent(&self) -> u32 {
        self.0 / 100
    }
}

impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-style display (`$12.34`). Real UI formatting is done by the caller.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(values: &[Money]) -> Vec<i64> {
        values.iter().map(|m| m.cents()).collect()
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_units(65)), "$65.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::zero()), "$0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!((-b).cents(), -500);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_saturating_add_stops_at_bounds() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!(max.saturating_add(Money::from_cents(1)), max);
        assert_eq!(Money::from_cents(5).saturating_add(Money::from_cents(7)).cents(), 12);
    }

    #[test]
    fn test_percent_of_rounds_half_away_from_zero() {
        // 1999 × 12% = 239.88 → 240
        assert_eq!(Money::from_cents(1999).percent_of(DiscountRate::from_percent(12)).cents(), 240);
        // 25 × 10% = 2.5 → 3
        assert_eq!(Money::from_cents(25).percent_of(DiscountRate::from_percent(10)).cents(), 3);
        assert_eq!(Money::from_cents(-25).percent_of(DiscountRate::from_percent(10)).cents(), -3);
        assert_eq!(Money::from_units(100).percent_of(DiscountRate::from_percent(0)), Money::zero());
        assert_eq!(
            Money::from_units(100).percent_of(DiscountRate::from_percent(100)),
            Money::from_units(100)
        );
    }

    #[test]
    fn test_percent_of_is_stable_across_calls() {
        let price = Money::from_cents(3333);
        let rate = DiscountRate::from_bps(1234);
        let first = price.percent_of(rate);
        for _ in 0..100 {
            assert_eq!(price.percent_of(rate), first);
        }
    }

    #[test]
    fn test_allocate_proportional() {
        let shares = Money::from_cents(300).allocate(&[Money::from_cents(1000), Money::from_cents(2000)]);
        assert_eq!(cents(&shares), vec![100, 200]);
    }

    #[test]
    fn test_allocate_distributes_remainder_front_to_back() {
        let shares = Money::from_cents(101).allocate(&[
            Money::from_cents(50),
            Money::from_cents(50),
            Money::from_cents(50),
        ]);
        assert_eq!(cents(&shares), vec![34, 34, 33]);
        assert_eq!(shares.iter().sum::<Money>().cents(), 101);
    }

    #[test]
    fn test_allocate_never_exceeds_weight() {
        let weights = [Money::from_cents(1), Money::from_cents(999)];
        let shares = Money::from_cents(1000).allocate(&weights);
        assert_eq!(cents(&shares), vec![1, 999]);
    }

    #[test]
    fn test_allocate_zero_weights_keeps_sum() {
        let shares = Money::from_cents(40).allocate(&[Money::zero(), Money::zero()]);
        assert_eq!(cents(&shares), vec![40, 0]);
        assert!(Money::from_cents(40).allocate(&[]).is_empty());
    }

    #[test]
    fn test_discount_rate_display() {
        assert_eq!(DiscountRate::from_percent(12).to_string(), "12%");
        assert_eq!(DiscountRate::from_bps(825).to_string(), "8.25%");
        assert_eq!(DiscountRate::from_percent(12).whole_percent(), 12);
    }
}
