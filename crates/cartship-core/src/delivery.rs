//! # Delivery Estimator
//!
//! Turns a schedule's lead-time bounds into concrete dates.
//!
//! ```text
//! order_date = 2026-10-18, delivery_min_days = 1, delivery_max_days = 3
//!
//!   Oct 18 ──+1──► Oct 19 (min_date)
//!   Oct 18 ──+3──► Oct 21 (max_date)
//! ```
//!
//! Days are calendar days. No business-day skipping is performed (the source
//! configuration does not distinguish weekends/holidays); this is a deliberate
//! simplification, not an oversight, and must be called out verbatim if a
//! future revision needs calendar-aware estimation.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::FeeSchedule;

/// Earliest and latest expected delivery dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeliveryWindow {
    #[ts(as = "String")]
    pub min_date: NaiveDate,

    #[ts(as = "String")]
    pub max_date: NaiveDate,
}

impl DeliveryWindow {
    /// Number of calendar days between the earliest and latest date.
    pub fn spread_days(&self) -> i64 {
        (self.max_date - self.min_date).num_days()
    }

    /// Smallest window covering both `self` and `other`.
    pub fn union(&self, other: &DeliveryWindow) -> DeliveryWindow {
        DeliveryWindow {
            min_date: self.min_date.min(other.min_date),
            max_date: self.max_date.max(other.max_date),
        }
    }
}

/// Computes the delivery window for an order placed on `order_date`.
///
/// ## Returns
/// `None` only if a bound falls outside chrono's supported date range.
pub fn estimate(schedule: &FeeSchedule, order_date: NaiveDate) -> Option<DeliveryWindow> {
    let min_date = order_date.checked_add_days(Days::new(u64::from(schedule.delivery_min_days)))?;
    let max_date = order_date.checked_add_days(Days::new(u64::from(schedule.delivery_max_days)))?;

    Some(DeliveryWindow { min_date, max_date })
}

// =============================================================================
// Unit Tests
// =============================================================================
