//! # Shipping Breakdown
//!
//! The computed result handed to cart display and checkout.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ShippingBreakdown                                                      │
//! │  ├── destination, order_date                                            │
//! │  ├── stores (first-seen cart order)                                     │
//! │  │   ├── StoreShipping { store_id: "acme", is_free: false,              │
//! │  │   │     fee_breakdown: { item 3.00, additional 2.00,                 │
//! │  │   │                      weight 1.25, fixed 2.00 },                  │
//! │  │   │     total_cost: 8.25, delivery: Oct 19 – Oct 21 }                │
//! │  │   └── StoreShipping { store_id: "globex", is_free: true, ... }       │
//! │  └── total_shipping_cost = Σ stores[i].total_cost                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A breakdown has no identity of its own. It is recomputed on every request
//! and never cached across cart or destination changes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::delivery::DeliveryWindow;
use crate::error::{ShippingError, ShippingResult};
use crate::money::Money;
use crate::rates::RateSource;
use crate::types::{Destination, StoreId, Weight};

/// The four fee components of one store group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FeeBreakdown {
    pub item_fee: Money,
    pub additional_item_fee: Money,
    pub weight_fee: Money,
    pub fixed_fee: Money,
}

impl FeeBreakdown {
    /// All components zero (free shipping).
    pub fn zero() -> Self {
        FeeBreakdown::default()
    }

    /// Sum of the four components, `None` on overflow.
    pub fn total(&self) -> Option<Money> {
        self.item_fee
            .checked_add(self.additional_item_fee)?
            .checked_add(self.weight_fee)?
            .checked_add(self.fixed_fee)
    }
}

/// Shipping result for one store group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreShipping {
    pub store_id: StoreId,
    pub is_free: bool,
    pub rate_source: RateSource,

    /// Total units across the group's lines.
    #[ts(type = "number")]
    pub item_count: u64,

    /// Total weight across the group's lines.
    pub total_weight: Weight,

    pub fee_breakdown: FeeBreakdown,
    pub total_cost: Money,
    pub delivery: DeliveryWindow,

    /// Return policy text of the resolved schedule.
    pub return_policy: Option<String>,
}

/// Per-store and order-level shipping result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShippingBreakdown {
    pub destination: Destination,

    #[ts(as = "String")]
    pub order_date: NaiveDate,

    /// One entry per store, in order of first appearance in the cart.
    pub stores: Vec<StoreShipping>,

    pub total_shipping_cost: Money,
}

impl ShippingBreakdown {
    /// Assembles a breakdown, summing the order total from the store totals.
    ///
    /// Fails with `TotalOverflow` if the sum leaves the money range.
    pub fn new(
        destination: Destination,
        order_date: NaiveDate,
        stores: Vec<StoreShipping>,
    ) -> ShippingResult<Self> {
        let total_shipping_cost = stores
            .iter()
            .try_fold(Money::zero(), |acc, s| acc.checked_add(s.total_cost))
            .ok_or(ShippingError::TotalOverflow)?;

        Ok(ShippingBreakdown {
            destination,
            order_date,
            stores,
            total_shipping_cost,
        })
    }

    /// Looks up one store's result.
    pub fn store(&self, store_id: &StoreId) -> Option<&StoreShipping> {
        self.stores.iter().find(|s| &s.store_id == store_id)
    }

    /// Earliest and latest delivery across all stores, `None` for an empty cart.
    pub fn delivery_window(&self) -> Option<DeliveryWindow> {
        self.stores
            .iter()
            .map(|s| s.delivery)
            .reduce(|acc, w| acc.union(&w))
    }

    /// Checks if every store ships for free (true for an empty cart).
    pub fn is_all_free(&self) -> bool {
        self.stores.iter().all(|s| s.is_free)
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn store(id: &str, total: i64, min: u32, max: u32, free: bool) -> StoreShipping {
        StoreShipping {
            store_id: StoreId::from(id),
            is_free: free,
            rate_source: RateSource::Default,
            item_count: 1,
            total_weight: Weight::zero(),
            fee_breakdown: FeeBreakdown {
                fixed_fee: Money::from_cents(total),
                ..FeeBreakdown::zero()
            },
            total_cost: Money::from_cents(total),
            delivery: DeliveryWindow {
                min_date: date(min),
                max_date: date(max),
            },
            return_policy: None,
        }
    }

    #[test]
    fn test_fee_breakdown_total() {
        let fees = FeeBreakdown {
            item_fee: Money::from_cents(300),
            additional_item_fee: Money::from_cents(200),
            weight_fee: Money::from_cents(125),
            fixed_fee: Money::from_cents(200),
        };
        assert_eq!(fees.total(), Some(Money::from_cents(825)));
        assert_eq!(FeeBreakdown::zero().total(), Some(Money::zero()));

        let huge = FeeBreakdown {
            weight_fee: Money::from_cents(i64::MAX),
            fixed_fee: Money::from_cents(1),
            ..FeeBreakdown::zero()
        };
        assert_eq!(huge.total(), None);
    }

    #[test]
    fn test_total_is_sum_of_stores() {
        let breakdown = ShippingBreakdown::new(
            Destination::new("us", "US"),
            date(18),
            vec![store("a", 825, 19, 21, false), store("b", 0, 20, 25, true)],
        )
        .unwrap();
        assert_eq!(breakdown.total_shipping_cost.cents(), 825);
        assert!(!breakdown.is_all_free());
        assert_eq!(breakdown.store(&StoreId::from("b")).unwrap().total_cost.cents(), 0);
        assert!(breakdown.store(&StoreId::from("c")).is_none());
    }

    #[test]
    fn test_order_total_overflow_is_an_error() {
        let err = ShippingBreakdown::new(
            Destination::new("us", "US"),
            date(18),
            vec![store("a", i64::MAX, 19, 21, false), store("b", 1, 20, 25, false)],
        )
        .unwrap_err();
        assert_eq!(err, ShippingError::TotalOverflow);
    }

    #[test]
    fn test_delivery_window_spans_all_stores() {
        let breakdown = ShippingBreakdown::new(
            Destination::new("us", "US"),
            date(18),
            vec![store("a", 1, 19, 21, false), store("b", 1, 20, 25, false)],
        )
        .unwrap();
        let window = breakdown.delivery_window().unwrap();
        assert_eq!(window.min_date, date(19));
        assert_eq!(window.max_date, date(25));
    }

    #[test]
    fn test_empty_breakdown() {
        let breakdown = ShippingBreakdown::new(Destination::unknown(), date(18), Vec::new()).unwrap();
        assert!(breakdown.is_empty());
        assert!(breakdown.total_shipping_cost.is_zero());
        assert!(breakdown.delivery_window().is_none());
        assert!(breakdown.is_all_free());
    }

    #[test]
    fn test_serializes_for_cart_display() {
        let breakdown = ShippingBreakdown::new(
            Destination::new("us", "US"),
            date(18),
            vec![store("a", 825, 19, 21, false)],
        )
        .unwrap();
        let json = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(json["total_shipping_cost"], 825);
        assert_eq!(json["order_date"], "2026-10-18");
        assert_eq!(json["stores"][0]["delivery"]["max_date"], "2026-10-21");
        assert_eq!(json["stores"][0]["rate_source"], "default");
    }
}
