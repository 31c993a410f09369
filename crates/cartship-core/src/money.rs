//! # Money Module
//!
//! Provides the `Money` type for shipping fees and totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE DRIFT PROBLEM                                                      │
//! │                                                                         │
//! │  A multi-vendor cart sums many small fees:                              │
//! │    item fee + additional items + weight fee + fixed fee, per store,     │
//! │    then every store again for the order total.                          │
//! │                                                                         │
//! │  With binary floats, 0.1 + 0.2 = 0.30000000000000004 and the error     │
//! │  compounds with every store in the cart.                                │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every fee is an i64 count of cents. Only the per-kg fee needs a     │
//! │    fractional step, and it is rounded once per store group.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cartship_core::money::Money;
//! use cartship_core::types::Weight;
//!
//! let per_kg = Money::from_cents(50);                 // $0.50 / kg
//! let fee = per_kg.per_kg(Weight::from_grams(2500));  // 2.5 kg
//! assert_eq!(fee, Some(Money::from_cents(125)));      // $1.25
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::types::Weight;

/// Grams per kilogram, the divisor for per-kg pricing.
const GRAMS_PER_KG: i128 = 1000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// FeeSchedule.per_item_fee ─────┐
/// FeeSchedule.additional_item_fee ─┼──► FeeBreakdown ──► StoreShipping.total_cost
/// FeeSchedule.per_kg_fee × kg ──┤                              │
/// FeeSchedule.fixed_fee ────────┘                              ▼
///                                        ShippingBreakdown.total_shipping_cost
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use cartship_core::money::Money;
    ///
    /// let fee = Money::from_cents(825); // $8.25
    /// assert_eq!(fee.cents(), 825);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
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

    /// Checks if the value is negative.
    ///
    /// Fee schedules reject negative amounts at validation time.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Multiplies a marginal fee by a unit count, `None` on overflow.
    ///
    /// ```rust
    /// use cartship_core::money::Money;
    ///
    /// let additional = Money::from_cents(100);
    /// assert_eq!(additional.multiply_quantity(2), Some(Money::from_cents(200)));
    /// assert_eq!(Money::from_cents(i64::MAX).multiply_quantity(2), None);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Prices a weight at this per-kilogram rate.
    ///
    /// ## Rounding
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  cents_per_kg × grams / 1000, rounded half away from zero          │
    /// │                                                                     │
    /// │   50¢/kg × 2500 g = 125 000 / 1000 = 125¢        (exact)            │
    /// │   33¢/kg × 1500 g =  49 500 / 1000 =  49.5¢ → 50¢                   │
    /// │   33¢/kg × 1499 g =  49 467 / 1000 =  49.467¢ → 49¢                 │
    /// │                                                                     │
    /// │  i128 intermediate: the product of any i64 rate and u64 grams fits │
    /// │  the rounded result must fit i64 again, else None                  │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// The aggregator calls this once per store group on the group's summed
    /// weight, so rounding never accumulates across line items.
    pub fn per_kg(&self, weight: Weight) -> Option<Money> {
        let raw = i128::from(self.0) * i128::from(weight.grams());
        let half = GRAMS_PER_KG / 2;
        let rounded = if raw >= 0 {
            (raw + half) / GRAMS_PER_KG
        } else {
            (raw - half) / GRAMS_PER_KG
        };
        i64::try_from(rounded).ok().map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display. Localised formatting belongs to the cart display.
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

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
