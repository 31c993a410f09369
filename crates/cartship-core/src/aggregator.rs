//! # Cart Aggregator
//!
//! Prices a multi-vendor cart: one shipping charge per store, summed into the
//! order total.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  compute_cart_shipping(items, destination, order_date)                  │
//! │                                                                         │
//! │  1. validate     cart size, quantity, store/product existence           │
//! │        │         (any failure → InvalidCartItem, nothing priced)        │
//! │        ▼                                                                │
//! │  2. group        by store_id, first-seen order                          │
//! │        │         [A, B, A, C] → A{lines 0,2}  B{line 1}  C{line 3}      │
//! │        ▼                                                                │
//! │  3. per group    RateResolver ──► FeeSchedule (+ RateSource)            │
//! │        │         FreeShippingEvaluator ──► is_free                      │
//! │        │         delivery::estimate ──► DeliveryWindow                  │
//! │        │         (sequential, or scoped threads past the threshold)     │
//! │        ▼                                                                │
//! │  4. assemble     stores in first-seen order, total = Σ store totals     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Group Formulas
//! ```text
//! item_count           = Σ quantity
//! item_fee             = per_item_fee                      (once per group)
//! additional_item_fee  = additional_item_fee × max(item_count − 1, 0)
//! weight_fee           = per_kg_fee × Σ(quantity × unit_weight)
//! fixed_fee            = fixed_fee                         (once per group)
//! total_cost           = item_fee + additional + weight + fixed
//! ```
//! A free group reports all four components as zero but keeps its delivery
//! window.
//!
//! Any failing group fails the whole cart. There is no partial breakdown.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::panic;
use std::thread;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::breakdown::{FeeBreakdown, ShippingBreakdown, StoreShipping};
use crate::delivery;
use crate::error::{ShippingError, ShippingResult};
use crate::free_shipping::{EmptyPolicyScope, FreeShippingEvaluator};
use crate::ports::{CatalogIndex, ShippingConfigStore};
use crate::rates::RateResolver;
use crate::types::{CartLineItem, Destination, FeeSchedule, StoreId, Weight};
use crate::validation::{validate_cart_size, validate_quantity};

/// Store groups at or above this count are priced on worker threads.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 8;

// =============================================================================
// Engine Options
// =============================================================================

/// Tunables that change how a cart is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Reading of a free-shipping policy with no listed countries.
    pub empty_policy: EmptyPolicyScope,

    /// Minimum number of store groups for parallel evaluation. `0` disables it.
    pub parallel_threshold: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            empty_policy: EmptyPolicyScope::AllCountries,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl EngineOptions {
    /// Default options with parallel evaluation turned off.
    pub fn sequential() -> Self {
        EngineOptions {
            parallel_threshold: 0,
            ..EngineOptions::default()
        }
    }

    fn runs_parallel(&self, groups: usize) -> bool {
        self.parallel_threshold != 0 && groups >= self.parallel_threshold
    }
}

// =============================================================================
// Store Groups
// =============================================================================

/// Cart lines of one store, reduced to what the formulas need.
#[derive(Debug)]
struct StoreGroup<'c> {
    store_id: &'c StoreId,
    item_count: u64,
    total_weight: Weight,
}

/// Partitions validated lines by store, keeping first-seen order.
fn group_by_store(items: &[CartLineItem]) -> ShippingResult<Vec<StoreGroup<'_>>> {
    let mut groups: Vec<StoreGroup<'_>> = Vec::new();
    let mut index: HashMap<&StoreId, usize> = HashMap::new();

    for (line, item) in items.iter().enumerate() {
        // quantity was validated as 1..=MAX_ITEM_QUANTITY
        let qty = u64::try_from(item.quantity).unwrap_or(0);

        let slot = *index.entry(&item.store_id).or_insert_with(|| {
            groups.push(StoreGroup {
                store_id: &item.store_id,
                item_count: 0,
                total_weight: Weight::zero(),
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];

        group.total_weight = item
            .line_weight()
            .and_then(|line_weight| group.total_weight.checked_add(line_weight))
            .ok_or_else(|| invalid_item(line, item, "weight is too large"))?;
        group.item_count += qty;
    }

    Ok(groups)
}

fn invalid_item(index: usize, item: &CartLineItem, reason: impl Into<String>) -> ShippingError {
    ShippingError::InvalidCartItem {
        index,
        store_id: item.store_id.clone(),
        product_id: item.product_id.clone(),
        reason: reason.into(),
    }
}

/// Applies the group formulas to a resolved schedule, `None` on overflow.
fn compute_fees(fees: &FeeSchedule, item_count: u64, total_weight: Weight) -> Option<FeeBreakdown> {
    let additional_units = i64::try_from(item_count.saturating_sub(1)).ok()?;

    Some(FeeBreakdown {
        item_fee: fees.per_item_fee,
        additional_item_fee: fees.additional_item_fee.multiply_quantity(additional_units)?,
        weight_fee: fees.per_kg_fee.per_kg(total_weight)?,
        fixed_fee: fees.fixed_fee,
    })
}

// =============================================================================
// Shipping Engine
// =============================================================================

/// Computes shipping breakdowns against one configuration snapshot.
///
/// ## Usage
/// ```rust
/// use cartship_core::aggregator::{EngineOptions, ShippingEngine};
/// use cartship_core::snapshot::ConfigSnapshot;
/// use cartship_core::types::{CartLineItem, Country, Destination, FeeSchedule, ShippingSchedule, Weight};
/// use cartship_core::money::Money;
/// use chrono::NaiveDate;
///
/// let fees = FeeSchedule { fixed_fee: Money::from_cents(499), ..FeeSchedule::free() };
/// let snapshot = ConfigSnapshot::builder()
///     .add_country(Country::new("us", "US", "United States"))?
///     .add_schedule(ShippingSchedule::store_default("acme", fees))?
///     .build()?;
///
/// let engine = ShippingEngine::new(&snapshot, EngineOptions::default());
/// let items = vec![CartLineItem::new("acme", "mug", 2, Weight::from_grams(300))];
/// let order_date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
/// let breakdown = engine
///     .compute_cart_shipping(&items, &Destination::new("us", "US"), order_date)
///     .unwrap();
/// assert_eq!(breakdown.total_shipping_cost.cents(), 499);
/// # Ok::<(), cartship_core::ValidationError>(())
/// ```
#[derive(Debug)]
pub struct ShippingEngine<'a, S: ?Sized> {
    config: &'a S,
    options: EngineOptions,
}

impl<'a, S> ShippingEngine<'a, S>
where
    S: ShippingConfigStore + CatalogIndex + Sync + ?Sized,
{
    pub fn new(config: &'a S, options: EngineOptions) -> Self {
        ShippingEngine { config, options }
    }

    /// Computes the per-store and order-level shipping breakdown.
    ///
    /// ## Errors
    /// - `InvalidCartItem`: bad quantity, unknown store or product, or the
    ///   cart is too large
    /// - `MissingShippingConfig`: a store has no schedule for the destination
    /// - `DateOutOfRange`: a delivery date overflows the calendar
    /// - `FeeOverflow` / `TotalOverflow`: an amount leaves the money range
    pub fn compute_cart_shipping(
        &self,
        items: &[CartLineItem],
        destination: &Destination,
        order_date: NaiveDate,
    ) -> ShippingResult<ShippingBreakdown> {
        self.validate_items(items)?;
        let groups = group_by_store(items)?;

        debug!(
            lines = items.len(),
            stores = groups.len(),
            destination = %destination.iso_code,
            "Computing cart shipping"
        );

        let stores = if self.options.runs_parallel(groups.len()) {
            self.price_groups_parallel(&groups, destination, order_date)?
        } else {
            groups
                .iter()
                .map(|group| self.price_group(group, destination, order_date))
                .collect::<ShippingResult<Vec<_>>>()?
        };

        let breakdown = ShippingBreakdown::new(destination.clone(), order_date, stores)?;
        debug!(
            total = %breakdown.total_shipping_cost,
            stores = breakdown.stores.len(),
            "Cart shipping computed"
        );
        Ok(breakdown)
    }

    /// Re-checks every line before any fee is computed.
    fn validate_items(&self, items: &[CartLineItem]) -> ShippingResult<()> {
        validate_cart_size(items.len())?;

        for (index, item) in items.iter().enumerate() {
            if let Err(err) = validate_quantity(item.quantity) {
                return Err(invalid_item(index, item, err.to_string()));
            }
            if !self.config.store_exists(&item.store_id) {
                return Err(invalid_item(index, item, "store does not exist"));
            }
            if !self.config.product_exists(&item.store_id, &item.product_id) {
                return Err(invalid_item(index, item, "product does not exist"));
            }
        }

        Ok(())
    }

    fn price_group(
        &self,
        group: &StoreGroup<'_>,
        destination: &Destination,
        order_date: NaiveDate,
    ) -> ShippingResult<StoreShipping> {
        let store_id = group.store_id;
        let country_id = &destination.country_id;

        let resolved = RateResolver::new(self.config).resolve_with_source(store_id, country_id)?;
        let is_free = FreeShippingEvaluator::new(self.config, self.options.empty_policy)
            .is_free(store_id, country_id);

        let overflow = || ShippingError::FeeOverflow {
            store_id: store_id.clone(),
        };
        let fee_breakdown = if is_free {
            FeeBreakdown::zero()
        } else {
            compute_fees(resolved.fees, group.item_count, group.total_weight).ok_or_else(overflow)?
        };
        let total_cost = fee_breakdown.total().ok_or_else(overflow)?;

        let delivery = delivery::estimate(resolved.fees, order_date).ok_or_else(|| {
            ShippingError::DateOutOfRange {
                store_id: store_id.clone(),
            }
        })?;

        debug!(
            store = %store_id,
            items = group.item_count,
            weight = %group.total_weight,
            is_free,
            total = %total_cost,
            "Priced store group"
        );

        Ok(StoreShipping {
            store_id: store_id.clone(),
            is_free,
            rate_source: resolved.source,
            item_count: group.item_count,
            total_weight: group.total_weight,
            fee_breakdown,
            total_cost,
            delivery,
            return_policy: resolved.fees.return_policy.clone(),
        })
    }

    /// Prices contiguous chunks of groups on scoped threads.
    ///
    /// Chunks are joined in order, so the output keeps first-seen order and
    /// the first error (in cart order) wins, exactly as in the sequential path.
    fn price_groups_parallel(
        &self,
        groups: &[StoreGroup<'_>],
        destination: &Destination,
        order_date: NaiveDate,
    ) -> ShippingResult<Vec<StoreShipping>> {
        let workers = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
            .clamp(1, groups.len().max(1));
        let chunk_size = groups.len().div_ceil(workers).max(1);

        debug!(groups = groups.len(), workers, "Pricing store groups in parallel");

        let chunks: Vec<Vec<ShippingResult<StoreShipping>>> = thread::scope(|scope| {
            let handles: Vec<_> = groups
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|group| self.price_group(group, destination, order_date))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
                .collect()
        });

        chunks.into_iter().flatten().collect()
    }
}

/// Computes a cart's shipping with default [`EngineOptions`].
pub fn compute_cart_shipping<S>(
    config: &S,
    items: &[CartLineItem],
    destination: &Destination,
    order_date: NaiveDate,
) -> ShippingResult<ShippingBreakdown>
where
    S: ShippingConfigStore + CatalogIndex + Sync + ?Sized,
{
    ShippingEngine::new(config, EngineOptions::default()).compute_cart_shipping(
        items,
        destination,
        order_date,
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
