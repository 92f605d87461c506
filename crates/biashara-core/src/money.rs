//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A receipt total summed from float line amounts can drift away from    │
//! │  the sum of its items.                                                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Line amounts are converted to cents ONCE, at the HTTP edge.         │
//! │    Everything after that (totals, unit prices, balances) is i64.       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use biashara_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(1099); // KSh 10.99
//!
//! // Arithmetic operations
//! let doubled = price * 2;
//! let total = price + Money::from_cents(500);
//! assert_eq!(doubled.cents(), 2198);
//! assert_eq!(total.cents(), 1599);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Balances can be negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  Request line amount ──► Money::from_decimal ──► Item.total_cents       │
/// │                                   │                                     │
/// │                                   ├──► split_evenly(qty) ──► unit price │
/// │                                   │                                     │
/// │                                   └──► Σ ──► Receipt.total_cents        │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use biashara_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal amount received over the wire into cents.
    ///
    /// This is the only place a floating point amount enters the system.
    /// The value is rounded to the nearest cent. NaN, infinities and
    /// negative amounts are rejected.
    ///
    /// ## Example
    /// ```rust
    /// use biashara_core::money::Money;
    ///
    /// let amount = Money::from_decimal(20.0, "amount").unwrap();
    /// assert_eq!(amount.cents(), 2000);
    ///
    /// // 0.1 + 0.2 style noise is rounded away
    /// let amount = Money::from_decimal(0.1 + 0.2, "amount").unwrap();
    /// assert_eq!(amount.cents(), 30);
    ///
    /// assert!(Money::from_decimal(-1.0, "amount").is_err());
    /// ```
    pub fn from_decimal(value: f64, field: &str) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: "must be a finite number".to_string(),
            });
        }

        if value < 0.0 {
            return Err(ValidationError::MustNotBeNegative {
                field: field.to_string(),
            });
        }

        let cents = (value * 100.0).round();
        if cents > i64::MAX as f64 {
            return Err(ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: "is too large".to_string(),
            });
        }

        Ok(Money(cents as i64))
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (shillings) portion.
    ///
    /// ## Example
    /// ```rust
    /// use biashara_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).major(), 10);
    /// assert_eq!(Money::from_cents(-550).major(), -5);
    /// ```
    #[inline]
    pub const fn major(&self) -> i64 {
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
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Adds two amounts, or `None` if the sum does not fit in cents.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Divides a line amount by the quantity sold, giving the unit price.
    ///
    /// Rounds half away from zero to the nearest cent. The result is
    /// informational: the line total stays the exact submitted amount, so
    /// `unit_price × quantity` may differ from the total by a fraction of a
    /// cent per unit.
    ///
    /// Returns `None` when `qty` is not positive.
    ///
    /// ## Example
    /// ```rust
    /// use biashara_core::money::Money;
    ///
    /// let line = Money::from_cents(2000);
    /// assert_eq!(line.split_evenly(2).unwrap().cents(), 1000);
    ///
    /// // 10.00 / 3 = 3.333... → 3.33
    /// assert_eq!(Money::from_cents(1000).split_evenly(3).unwrap().cents(), 333);
    /// // 0.05 / 2 = 0.025 → 0.03
    /// assert_eq!(Money::from_cents(5).split_evenly(2).unwrap().cents(), 3);
    /// assert!(line.split_evenly(0).is_none());
    /// ```
    pub fn split_evenly(&self, qty: i64) -> Option<Money> {
        if qty <= 0 {
            return None;
        }

        // i128 keeps the doubled numerator from overflowing
        let numerator = self.0 as i128 * 2;
        let denominator = qty as i128 * 2;
        let rounded = if numerator >= 0 {
            (numerator + qty as i128) / denominator
        } else {
            (numerator - qty as i128) / denominator
        };

        Some(Money(rounded as i64))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs. The front end formats amounts for display.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}KSh {}.{:02}", sign, self.major().abs(), self.cents_part())
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Summing line totals into a receipt total.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
