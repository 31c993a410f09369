//! # Rate Resolver
//!
//! Finds the fee schedule that prices one store's goods for one destination.
//!
//! ## Precedence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  resolve(store, country)                                                │
//! │       │                                                                 │
//! │       ├── CountryOverride(store, country) present? ──► use it           │
//! │       │                                                                 │
//! │       ├── StoreDefault(store) present? ─────────────► use it            │
//! │       │                                                                 │
//! │       └── neither ──► Err(MissingShippingConfig { store, country })     │
//! │                                                                         │
//! │  Never falls back to a zero-cost schedule: an unpriced store blocks    │
//! │  checkout for its items.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Resolution only reads the snapshot, so the same inputs against the same
//! snapshot always resolve to the same schedule.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::error::{ShippingError, ShippingResult};
use crate::ports::ShippingConfigStore;
use crate::types::{CountryId, FeeSchedule, StoreId};

/// Which precedence level produced a resolved schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// The store-wide default schedule.
    Default,
    /// A schedule narrowed to the destination country.
    CountryOverride,
}

/// A schedule together with the level it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRate<'a> {
    pub fees: &'a FeeSchedule,
    pub source: RateSource,
}

/// Resolves fee schedules against a configuration store.
#[derive(Debug)]
pub struct RateResolver<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> RateResolver<'a, S>
where
    S: ShippingConfigStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        RateResolver { store }
    }

    /// Returns the effective fee schedule for (store, country).
    pub fn resolve(&self, store_id: &StoreId, country_id: &CountryId) -> ShippingResult<&'a FeeSchedule> {
        self.resolve_with_source(store_id, country_id)
            .map(|resolved| resolved.fees)
    }

    /// Like [`resolve`](Self::resolve), also reporting which level matched.
    pub fn resolve_with_source(
        &self,
        store_id: &StoreId,
        country_id: &CountryId,
    ) -> ShippingResult<ResolvedRate<'a>> {
        if let Some(fees) = self.store.country_override(store_id, country_id) {
            debug!(store = %store_id, country = %country_id, "Using country override schedule");
            return Ok(ResolvedRate {
                fees,
                source: RateSource::CountryOverride,
            });
        }

        if let Some(fees) = self.store.store_default(store_id) {
            debug!(store = %store_id, country = %country_id, "Using store default schedule");
            return Ok(ResolvedRate {
                fees,
                source: RateSource::Default,
            });
        }

        Err(ShippingError::MissingShippingConfig {
            store_id: store_id.clone(),
            country_id: country_id.clone(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::snapshot::ConfigSnapshot;
    use crate::types::{Country, ShippingSchedule};

    fn schedule(per_item: i64, min: u32, max: u32) -> FeeSchedule {
        FeeSchedule {
            per_item_fee: Money::from_cents(per_item),
            delivery_min_days: min,
            delivery_max_days: max,
            ..FeeSchedule::free()
        }
    }

    fn snapshot() -> ConfigSnapshot {
        ConfigSnapshot::builder()
            .add_country(Country::new("us", "US", "United States"))
            .unwrap()
            .add_country(Country::new("de", "DE", "Germany"))
            .unwrap()
            .add_country(Country::new("jp", "JP", "Japan"))
            .unwrap()
            // acme: default + US override
            .add_schedule(ShippingSchedule::store_default("acme", schedule(500, 2, 5)))
            .unwrap()
            .add_schedule(ShippingSchedule::country_override("acme", "us", schedule(300, 1, 3)))
            .unwrap()
            // globex: overrides only
            .add_schedule(ShippingSchedule::country_override("globex", "de", schedule(700, 4, 9)))
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_override_takes_precedence_over_default() {
        let snapshot = snapshot();
        let resolver = RateResolver::new(&snapshot);

        let resolved = resolver
            .resolve_with_source(&StoreId::from("acme"), &CountryId::from("us"))
            .unwrap();
        assert_eq!(resolved.source, RateSource::CountryOverride);
        assert_eq!(resolved.fees, &schedule(300, 1, 3));
    }

    #[test]
    fn test_falls_back_to_default_for_every_country_without_override() {
        let snapshot = snapshot();
        let resolver = RateResolver::new(&snapshot);
        let acme = StoreId::from("acme");

        for country in ["de", "jp", "not-in-directory"] {
            let resolved = resolver
                .resolve_with_source(&acme, &CountryId::from(country))
                .unwrap();
            assert_eq!(resolved.source, RateSource::Default);
            assert_eq!(resolved.fees, &schedule(500, 2, 5));
        }
    }

    #[test]
    fn test_override_only_store() {
        let snapshot = snapshot();
        let resolver = RateResolver::new(&snapshot);
        let globex = StoreId::from("globex");

        assert_eq!(
            resolver.resolve(&globex, &CountryId::from("de")).unwrap().per_item_fee,
            Money::from_cents(700)
        );

        let err = resolver.resolve(&globex, &CountryId::from("us")).unwrap_err();
        assert_eq!(
            err,
            ShippingError::MissingShippingConfig {
                store_id: globex.clone(),
                country_id: CountryId::from("us"),
            }
        );
    }

    #[test]
    fn test_unknown_store_is_missing_config() {
        let snapshot = snapshot();
        let resolver = RateResolver::new(&snapshot);
        let err = resolver
            .resolve(&StoreId::from("initech"), &CountryId::from("us"))
            .unwrap_err();
        assert!(matches!(err, ShippingError::MissingShippingConfig { .. }));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let snapshot = snapshot();
        let resolver = RateResolver::new(&snapshot);
        let acme = StoreId::from("acme");
        let us = CountryId::from("us");

        let first = resolver.resolve_with_source(&acme, &us).unwrap();
        let second = resolver.resolve_with_source(&acme, &us).unwrap();
        assert_eq!(first, second);
        assert!(std::ptr::eq(first.fees, second.fees));
    }
}
