//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Storage vs. Quotes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE PRECISION LIVES                                                  │
//! │                                                                         │
//! │  Database columns:  integer satang (1/100 baht)                         │
//! │    price_per_item_cents = 100000   → ฿1000.00                           │
//! │                                                                         │
//! │  Promotional quotes: exact decimals, never floats                       │
//! │    ฿2900.00 for 3 items → ฿966.666666... per item                       │
//! │    ×4 → ฿3866.666666... (always derived, never recomputed)              │
//! │                                                                         │
//! │  Display:  rounded to 2 places only at the edge                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tread_core::money::Money;
//!
//! let price = Money::from_cents(109_900); // ฿1099.00
//! let set_of_four = price.multiply_quantity(4);
//! assert_eq!(set_of_four, Money::from_major(4396));
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// Currency symbol used for display. The shop trades in Thai baht only.
pub const CURRENCY_SYMBOL: &str = "฿";

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in baht, backed by an exact decimal.
///
/// ## Design Decisions
/// - **Decimal, not i64 cents**: promotional prices divide by arbitrary
///   bundle sizes, so per-item quotes need sub-satang precision
/// - **Decimal, not f64**: same inputs must give bit-identical quotes
/// - **Storage in cents**: persisted prices are always whole satang
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a Money value from satang (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use tread_core::money::Money;
    ///
    /// let price = Money::from_cents(150_050); // ฿1500.50
    /// assert_eq!(price.to_string(), "฿1500.50");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Creates a Money value from whole baht.
    #[inline]
    pub fn from_major(major: i64) -> Self {
        Money(Decimal::from(major))
    }

    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Returns the exact decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Converts to whole satang using Bankers Rounding.
    ///
    /// Returns `None` when the amount does not fit in an `i64`.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tread_core::money::Money;
    ///
    /// let third = Money::from_decimal(Decimal::from(2900) / Decimal::from(3));
    /// assert_eq!(third.to_cents(), Some(96_667));
    /// ```
    pub fn to_cents(&self) -> Option<i64> {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            .to_i64()
    }

    /// Rounds to two decimal places (whole satang) using Bankers Rounding.
    pub fn round_to_cents(&self) -> Self {
        Money(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven),
        )
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is below zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Multiplies money by a quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Quote: ฿750.00 per tire
    ///      │
    ///      ▼
    /// multiply_quantity(4) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Set of four: ฿3000.00
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * Decimal::from(qty))
    }

    /// Like [`Money::multiply_quantity`], but `None` when the product does
    /// not fit in a `Decimal`.
    #[inline]
    pub fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(Decimal::from(qty)).map(Money)
    }
}

/// Formats a decimal with exactly two fractional digits, rounding half to even.
pub(crate) fn format_two_places(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    format!("{:.2}", rounded)
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `฿1234.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(
            f,
            "{}{}{}",
            sign,
            CURRENCY_SYMBOL,
            format_two_places(self.0.abs())
        )
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

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
