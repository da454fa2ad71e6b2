//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In a discount-heavy retail system that drift compounds:                │
//! │    a 10% promotion on top of a capped voucher on top of a line sum     │
//! │    must reproduce the same total on every recompute.                   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Explicit Rounding                        │
//! │    All percentages are applied in i128 integer math and rounded        │
//! │    half-up to the cent — the same rule the books are kept in.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use atlas_core::money::Money;
//!
//! let price = Money::from_cents(10_000); // $100.00
//!
//! // 10% promotion: customer pays 90%
//! assert_eq!(price.retain_percent(90).cents(), 9_000);
//!
//! // 20% voucher discount amount
//! assert_eq!(price.percent_of(20).cents(), 2_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative intermediates for discount math
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// Every monetary value in the system flows through this type:
/// variant list prices, per-line discounted prices, order subtotals,
/// voucher discounts, and the final payable bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use atlas_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use atlas_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 897); // $8.97
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns `percent`% of this amount, rounded half-up to the cent.
    ///
    /// ## Rounding
    /// `(cents × percent + 50) / 100` in i128 — the ledger rounding rule
    /// for discount amounts. `percent` is a whole percentage (20 = 20%),
    /// not basis points.
    ///
    /// ## Example
    /// ```rust
    /// use atlas_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(27_000); // $270.00
    /// assert_eq!(subtotal.percent_of(20).cents(), 5_400); // $54.00
    ///
    /// // Half-up: 0.5 cents rounds away from zero
    /// assert_eq!(Money::from_cents(25).percent_of(10).cents(), 3); // 2.5 → 3
    /// ```
    pub fn percent_of(&self, percent: u32) -> Money {
        // i128 intermediate prevents overflow on large bills
        let amount = (self.0 as i128 * percent as i128 + 50) / 100;
        Money::from_cents(amount as i64)
    }

    /// Returns `percent`% of this amount kept, rounded half-up to the cent.
    ///
    /// This is the promotion rule: a 10% promotion keeps 90% of the list
    /// price, computed as `price × (100 − percent) / 100` half-up — not as
    /// `price − percent_of(percent)`, which can differ by one cent.
    ///
    /// ## Example
    /// ```rust
    /// use atlas_core::money::Money;
    ///
    /// let list = Money::from_cents(10_000); // $100.00
    /// assert_eq!(list.retain_percent(90).cents(), 9_000); // $90.00
    /// ```
    pub fn retain_percent(&self, percent: u32) -> Money {
        let amount = (self.0 as i128 * percent as i128 + 50) / 100;
        Money::from_cents(amount as i64)
    }

    /// Subtracts `discount`, clamping at zero.
    ///
    /// A capped voucher can never push a bill below zero.
    ///
    /// ## Example
    /// ```rust
    /// use atlas_core::money::Money;
    ///
    /// let bill = Money::from_cents(3_000);
    /// let discount = Money::from_cents(5_000);
    /// assert_eq!(bill.saturating_discount(discount).cents(), 0);
    /// ```
    pub fn saturating_discount(&self, discount: Money) -> Money {
        Money::from_cents((self.0 - discount.0).max(0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// For debugging and logs. Outward formatting is a collaborator concern
/// (localization, currency symbol).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_percent_of_rounds_half_up() {
        // $270.00 at 20% = $54.00 exactly
        assert_eq!(Money::from_cents(27_000).percent_of(20).cents(), 5_400);

        // 25 cents at 10% = 2.5 cents → 3 cents
        assert_eq!(Money::from_cents(25).percent_of(10).cents(), 3);

        // 24 cents at 10% = 2.4 cents → 2 cents
        assert_eq!(Money::from_cents(24).percent_of(10).cents(), 2);
    }

    #[test]
    fn test_retain_percent_matches_promotion_rule() {
        // 10% promotion on $100.00 → $90.00
        assert_eq!(Money::from_cents(10_000).retain_percent(90).cents(), 9_000);

        // 15 cents keeping 90% = 13.5 → 14 (half-up on the kept amount)
        assert_eq!(Money::from_cents(15).retain_percent(90).cents(), 14);
    }

    #[test]
    fn test_saturating_discount_clamps_at_zero() {
        let bill = Money::from_cents(3_000);
        assert_eq!(bill.saturating_discount(Money::from_cents(1_000)).cents(), 2_000);
        assert_eq!(bill.saturating_discount(Money::from_cents(5_000)).cents(), 0);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(299);
        let line_total = unit_price.multiply_quantity(3);
        assert_eq!(line_total.cents(), 897);
    }

    /// Large bills must not overflow the percentage math.
    #[test]
    fn test_percent_of_large_amounts() {
        let bill = Money::from_cents(i64::MAX / 200);
        let discount = bill.percent_of(50);
        assert!(discount.cents() > 0);
        assert!(discount.cents() < bill.cents());
    }
}
