//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  The totals engine also has to run the discount chain BACKWARDS        │
//! │  (grand total → discount %), so integer cents are not enough either:  │
//! │  the inverse needs fractional percentages.                             │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal, rounded only at display time           │
//! │    Σ(qty × price) is exact                                             │
//! │    945 / (1000 × 1.05) = 0.9 exactly                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use shopfront_core::money::Money;
//!
//! let price = Money::from_minor(1099); // 10.99
//! let doubled = price * 2u32;          // 21.98
//! let total = price + Money::from_minor(500);
//!
//! assert_eq!(doubled.amount(), Decimal::new(2198, 2));
//! assert_eq!(total.to_string(), "15.99");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

/// Decimal places shown on screens, receipts and exports.
pub const DISPLAY_SCALE: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the shop's single currency.
///
/// ## Design Decisions
/// - **Decimal inside**: exact sums, no binary rounding drift
/// - **Unrounded in memory**: rounding happens only in [`Money::rounded`]
///   and `Display`, so the totals invariant holds exactly between fields
/// - **Signed**: intermediate values may go negative; the totals engine
///   clamps before anything reaches the operator
///
/// ## Where Money Flows
/// ```text
/// LineItem.unit_price ──► LineItem.line_total ──► InvoiceTotals.subtotal
///                                                       │
///                         discount_amount ◄─────────────┤
///                                                       ▼
///                         tax_amount ◄──────── post-discount subtotal
///                                                       │
///                                                       ▼
///                                              InvoiceTotals.grand_total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a Money value from minor units (paise, cents).
    ///
    /// ## Example
    /// ```rust
    /// use shopfront_core::money::Money;
    ///
    /// let price = Money::from_minor(1099);
    /// assert_eq!(price.to_string(), "10.99");
    /// ```
    #[inline]
    pub fn from_minor(minor: i64) -> Self {
        Money(Decimal::new(minor, DISPLAY_SCALE))
    }

    /// Returns the exact, unrounded amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Rounds to display precision using Bankers Rounding (half to even).
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use shopfront_core::money::Money;
    ///
    /// // 0.125 → 0.12 (2 is even), 0.135 → 0.14 (4 is even)
    /// assert_eq!(Money::from_decimal(Decimal::new(125, 3)).rounded().amount(), Decimal::new(12, 2));
    /// assert_eq!(Money::from_decimal(Decimal::new(135, 3)).rounded().amount(), Decimal::new(14, 2));
    /// ```
    pub fn rounded(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointNearestEven),
        )
    }

    /// Multiplies money by a quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Product: Basmati Rice 5kg 499.00
    /// Quantity: 3
    ///      │
    ///      ▼
    /// multiply_quantity(3) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line Total: 1497.00
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0 * Decimal::from(qty))
    }

    /// Calculates the flat-rate tax on this amount, unrounded.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use shopfront_core::money::Money;
    /// use shopfront_core::types::TaxRate;
    ///
    /// let base = Money::from_decimal(Decimal::from(900));
    /// let tax = base.calculate_tax(TaxRate::from_fraction(Decimal::new(5, 2)));
    /// assert_eq!(tax.amount(), Decimal::from(45));
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        Money(self.0 * rate.fraction())
    }

    /// Returns the share of this amount given by `percentage` (0-100).
    pub fn percentage_of(&self, percentage: Decimal) -> Money {
        Money(self.0 * percentage / Decimal::ONE_HUNDRED)
    }

    /// Clamps into `[min, max]`.
    pub fn clamp_between(self, min: Money, max: Money) -> Money {
        Money(self.0.max(min.0).min(max.0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount rounded to two places, without a currency symbol.
///
/// ## Note
/// The currency symbol lives in the store settings, so the document
/// layer prefixes it where a layout asks for one.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.rounded().0)
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
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

/// Multiplication by a line quantity.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
