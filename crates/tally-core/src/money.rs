//! # Money Module
//!
//! Monetary values as integer minor units (cents for USD).
//!
//! Floating point is banned for money: `0.1 + 0.2 != 0.3` and a cash
//! drawer that drifts by a cent per sale fails reconciliation. Every
//! monetary value in the engine is an `i64` cent count wrapped in
//! [`Money`]; only a display layer converts to dollars.
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let line = price * 2;                // $21.98
//! assert_eq!(line.cents(), 2198);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// Signed so that refunds and over-discounted lines can be represented;
/// cart-wide totals are clamped to zero where the business rules demand it,
/// never at this level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -$5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
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

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Clamps a negative value up to zero. Positive values pass through.
    ///
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-250).clamp_non_negative().cents(), 0);
    /// assert_eq!(Money::from_cents(250).clamp_non_negative().cents(), 250);
    /// ```
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Multiplies by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Flat-rate tax on this amount, in basis points, rounded half-up.
    ///
    /// Uses i128 internally so large amounts cannot overflow the
    /// intermediate product.
    ///
    /// ```rust
    /// use tally_core::money::Money;
    /// use tally_core::types::TaxRate;
    ///
    /// let net = Money::from_cents(1000);           // $10.00
    /// let tax = net.tax_at(TaxRate::from_bps(825)); // 8.25%
    /// assert_eq!(tax.cents(), 83);
    /// ```
    pub fn tax_at(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Parses a user-entered decimal string, defaulting to zero.
    ///
    /// This is the single coercion point for keyed-in amounts and
    /// discounts: a cashier mistyping an amount must never halt the sale,
    /// so anything unparseable is treated as zero rather than an error.
    ///
    /// Accepted: optional leading `-`, digits, optional `.` with up to two
    /// fraction digits (extra digits are truncated, not rounded).
    ///
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// assert_eq!(Money::parse_or_zero("12.50").cents(), 1250);
    /// assert_eq!(Money::parse_or_zero("7").cents(), 700);
    /// assert_eq!(Money::parse_or_zero("3.5").cents(), 350);
    /// assert_eq!(Money::parse_or_zero("").cents(), 0);
    /// assert_eq!(Money::parse_or_zero("abc").cents(), 0);
    /// ```
    pub fn parse_or_zero(raw: &str) -> Money {
        parse_decimal_cents(raw).map(Money::from_cents).unwrap_or_default()
    }
}

/// Parses `[-]D[.F]` into cents. `None` on anything else.
fn parse_decimal_cents(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let (major_str, minor_str) = match body.split_once('.') {
        Some((m, f)) => (m, f),
        None => (body, ""),
    };

    // "." alone and ".5" style input are rejected; a bare fraction is not
    // something a price pad produces.
    if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !minor_str.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let major: i64 = major_str.parse().ok()?;

    // Two fraction digits carry value; anything beyond is truncated.
    let minor: i64 = match minor_str.len() {
        0 => 0,
        1 => minor_str.parse::<i64>().ok()? * 10,
        _ => minor_str[..2].parse().ok()?,
    };

    let cents = major.checked_mul(100)?.checked_add(minor)?;
    Some(if negative { -cents } else { cents })
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display. UI formatting (currency symbol, locale) is the
/// terminal configuration's job, not this type's.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
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
