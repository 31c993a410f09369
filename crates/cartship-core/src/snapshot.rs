//! # Configuration Snapshot
//!
//! In-memory, read-only copy of everything the engine consults for one
//! request: countries, fee schedules, free-shipping policies and the set of
//! known stores/products.
//!
//! ## Build Once, Read Many
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  catalog file / DB rows ──► ConfigSnapshotBuilder ──► ConfigSnapshot    │
//! │                              │                          │               │
//! │                              │ rejects:                 │ implements:   │
//! │                              │ • duplicate default      │ • Country     │
//! │                              │ • duplicate override     │   Directory   │
//! │                              │ • duplicate policy       │ • Shipping    │
//! │                              │ • invalid fee schedule   │   ConfigStore │
//! │                              │ • unknown country refs   │ • Catalog     │
//! │                              │ • duplicate ISO codes    │   Index       │
//! │                              │ • the placeholder        │               │
//! │                              │   destination's id/ISO   │               │
//! │                                                                         │
//! │  Nothing mutates a ConfigSnapshot after build(). Share it by reference │
//! │  (it is Send + Sync) across worker threads.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::error::ValidationError;
use crate::ports::{CatalogIndex, CountryDirectory, ShippingConfigStore};
use crate::types::{
    Country, CountryId, FeeSchedule, FreeShippingPolicy, ProductId, ScheduleScope,
    ShippingSchedule, StoreId,
};
use crate::validation::{validate_fee_schedule, validate_id, validate_iso_code, ValidationResult};
use crate::{UNKNOWN_COUNTRY_ID, UNKNOWN_COUNTRY_ISO};

// =============================================================================
// Snapshot
// =============================================================================

/// Immutable configuration snapshot. Create with [`ConfigSnapshot::builder`].
#[derive(Debug, Clone, Default)]
pub struct ConfigSnapshot {
    countries: BTreeMap<CountryId, Country>,
    iso_index: HashMap<String, CountryId>,
    defaults: HashMap<StoreId, FeeSchedule>,
    overrides: HashMap<StoreId, HashMap<CountryId, FeeSchedule>>,
    policies: HashMap<StoreId, FreeShippingPolicy>,
    products: HashMap<StoreId, HashSet<ProductId>>,
    stores: BTreeSet<StoreId>,
}

impl ConfigSnapshot {
    /// Starts an empty builder.
    pub fn builder() -> ConfigSnapshotBuilder {
        ConfigSnapshotBuilder::default()
    }

    /// All countries, ordered by id.
    pub fn countries(&self) -> impl Iterator<Item = &Country> {
        self.countries.values()
    }

    /// All known stores, ordered by id.
    pub fn stores(&self) -> impl Iterator<Item = &StoreId> {
        self.stores.iter()
    }

    /// Number of override rows across all stores.
    pub fn override_count(&self) -> usize {
        self.overrides.values().map(HashMap::len).sum()
    }
}

impl CountryDirectory for ConfigSnapshot {
    fn country(&self, id: &CountryId) -> Option<&Country> {
        self.countries.get(id)
    }

    fn country_by_iso(&self, iso_code: &str) -> Option<&Country> {
        let iso = iso_code.trim().to_ascii_uppercase();
        self.iso_index
            .get(&iso)
            .and_then(|id| self.countries.get(id))
    }
}

impl ShippingConfigStore for ConfigSnapshot {
    fn country_override(&self, store_id: &StoreId, country_id: &CountryId) -> Option<&FeeSchedule> {
        self.overrides
            .get(store_id)
            .and_then(|by_country| by_country.get(country_id))
    }

    fn store_default(&self, store_id: &StoreId) -> Option<&FeeSchedule> {
        self.defaults.get(store_id)
    }

    fn free_shipping_policy(&self, store_id: &StoreId) -> Option<&FreeShippingPolicy> {
        self.policies.get(store_id)
    }
}

impl CatalogIndex for ConfigSnapshot {
    fn store_exists(&self, store_id: &StoreId) -> bool {
        self.stores.contains(store_id)
    }

    /// Stores that never registered a product list sell anything.
    fn product_exists(&self, store_id: &StoreId, product_id: &ProductId) -> bool {
        match self.products.get(store_id) {
            Some(products) => products.contains(product_id),
            None => self.stores.contains(store_id),
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Collects configuration rows and checks the snapshot invariants.
///
/// ## Usage
/// ```rust
/// use cartship_core::snapshot::ConfigSnapshot;
/// use cartship_core::types::{Country, FeeSchedule, ShippingSchedule};
///
/// let snapshot = ConfigSnapshot::builder()
///     .add_country(Country::new("us", "US", "United States"))?
///     .add_schedule(ShippingSchedule::store_default("acme", FeeSchedule::free()))?
///     .build()?;
/// assert_eq!(snapshot.stores().count(), 1);
/// # Ok::<(), cartship_core::ValidationError>(())
/// ```
#[derive(Debug, Default)]
pub struct ConfigSnapshotBuilder {
    snapshot: ConfigSnapshot,
}

impl ConfigSnapshotBuilder {
    /// Adds a country to the directory.
    ///
    /// The placeholder destination's id and ISO code are reserved, so no
    /// schedule or policy can ever target it by country.
    pub fn add_country(mut self, country: Country) -> ValidationResult<Self> {
        validate_id("country_id", country.id.as_str())?;
        let iso = validate_iso_code(&country.iso_code)?;

        if country.id.as_str() == UNKNOWN_COUNTRY_ID {
            return Err(reserved("country_id", country.id.as_str()));
        }
        if iso == UNKNOWN_COUNTRY_ISO {
            return Err(reserved("iso_code", &iso));
        }

        if self.snapshot.countries.contains_key(&country.id) {
            return Err(ValidationError::Duplicate {
                field: "country_id".to_string(),
                value: country.id.to_string(),
            });
        }
        if self.snapshot.iso_index.contains_key(&iso) {
            return Err(ValidationError::Duplicate {
                field: "iso_code".to_string(),
                value: iso,
            });
        }

        self.snapshot.iso_index.insert(iso.clone(), country.id.clone());
        self.snapshot.countries.insert(
            country.id.clone(),
            Country {
                iso_code: iso,
                ..country
            },
        );
        Ok(self)
    }

    /// Adds a default or country override schedule.
    ///
    /// ## Errors
    /// - `Duplicate` for a second default of the same store
    /// - `Duplicate` for a second override of the same (store, country)
    /// - any fee schedule validation failure
    pub fn add_schedule(mut self, schedule: ShippingSchedule) -> ValidationResult<Self> {
        validate_id("store_id", schedule.store_id.as_str())?;
        validate_fee_schedule(&schedule.fees)?;

        let ShippingSchedule {
            store_id,
            scope,
            fees,
        } = schedule;

        match scope {
            ScheduleScope::Default => {
                if self.snapshot.defaults.contains_key(&store_id) {
                    return Err(ValidationError::Duplicate {
                        field: "default schedule".to_string(),
                        value: store_id.to_string(),
                    });
                }
                self.snapshot.defaults.insert(store_id.clone(), fees);
            }
            ScheduleScope::CountryOverride { country_id } => {
                validate_id("country_id", country_id.as_str())?;
                let by_country = self.snapshot.overrides.entry(store_id.clone()).or_default();
                if by_country.contains_key(&country_id) {
                    return Err(ValidationError::Duplicate {
                        field: "country override".to_string(),
                        value: format!("{store_id}/{country_id}"),
                    });
                }
                by_country.insert(country_id, fees);
            }
        }

        self.snapshot.stores.insert(store_id);
        Ok(self)
    }

    /// Adds a store's free-shipping policy.
    pub fn add_free_shipping_policy(mut self, policy: FreeShippingPolicy) -> ValidationResult<Self> {
        validate_id("store_id", policy.store_id.as_str())?;

        if self.snapshot.policies.contains_key(&policy.store_id) {
            return Err(ValidationError::Duplicate {
                field: "free shipping policy".to_string(),
                value: policy.store_id.to_string(),
            });
        }

        self.snapshot.stores.insert(policy.store_id.clone());
        self.snapshot.policies.insert(policy.store_id.clone(), policy);
        Ok(self)
    }

    /// Registers a product sold by a store.
    ///
    /// Once a store has any registered product, cart lines for that store must
    /// reference one of them.
    pub fn add_product(
        mut self,
        store_id: impl Into<StoreId>,
        product_id: impl Into<ProductId>,
    ) -> ValidationResult<Self> {
        let store_id = store_id.into();
        let product_id = product_id.into();
        validate_id("store_id", store_id.as_str())?;
        validate_id("product_id", product_id.as_str())?;

        self.snapshot
            .products
            .entry(store_id.clone())
            .or_default()
            .insert(product_id);
        self.snapshot.stores.insert(store_id);
        Ok(self)
    }

    /// Checks cross-row references and returns the snapshot.
    ///
    /// ## Errors
    /// `UnknownReference` when an override or a policy names a country that is
    /// not in the directory.
    pub fn build(self) -> ValidationResult<ConfigSnapshot> {
        let snapshot = self.snapshot;

        for (store_id, by_country) in &snapshot.overrides {
            for country_id in by_country.keys() {
                if !snapshot.countries.contains_key(country_id) {
                    return Err(unknown_country("country override", store_id, country_id));
                }
            }
        }

        for (store_id, policy) in &snapshot.policies {
            for country_id in &policy.eligible_countries {
                if !snapshot.countries.contains_key(country_id) {
                    return Err(unknown_country("free shipping policy", store_id, country_id));
                }
            }
        }

        debug!(
            countries = snapshot.countries.len(),
            stores = snapshot.stores.len(),
            defaults = snapshot.defaults.len(),
            overrides = snapshot.override_count(),
            policies = snapshot.policies.len(),
            "Configuration snapshot built"
        );

        Ok(snapshot)
    }
}

fn reserved(field: &str, value: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("'{value}' is reserved for the unknown destination"),
    }
}

fn unknown_country(field: &str, store_id: &StoreId, country_id: &CountryId) -> ValidationError {
    ValidationError::UnknownReference {
        field: format!("{field} of store {store_id}"),
        entity: "country".to_string(),
        value: country_id.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn fees(per_item: i64) -> FeeSchedule {
        FeeSchedule {
            per_item_fee: Money::from_cents(per_item),
            ..FeeSchedule::free()
        }
    }

    fn base() -> ConfigSnapshotBuilder {
        ConfigSnapshot::builder()
            .add_country(Country::new("us", "US", "United States"))
            .unwrap()
            .add_country(Country::new("de", "de", "Germany"))
            .unwrap()
    }

    #[test]
    fn test_lookups() {
        let snapshot = base()
            .add_schedule(ShippingSchedule::store_default("acme", fees(500)))
            .unwrap()
            .add_schedule(ShippingSchedule::country_override("acme", "us", fees(300)))
            .unwrap()
            .build()
            .unwrap();

        let acme = StoreId::from("acme");
        assert_eq!(snapshot.store_default(&acme).unwrap().per_item_fee.cents(), 500);
        assert_eq!(
            snapshot
                .country_override(&acme, &CountryId::from("us"))
                .unwrap()
                .per_item_fee
                .cents(),
            300
        );
        assert!(snapshot.country_override(&acme, &CountryId::from("de")).is_none());
        assert!(snapshot.free_shipping_policy(&acme).is_none());
        assert_eq!(snapshot.override_count(), 1);
    }

    #[test]
    fn test_country_directory() {
        let snapshot = base().build().unwrap();
        assert_eq!(snapshot.country_by_iso("de").unwrap().id, CountryId::from("de"));
        assert_eq!(snapshot.country_by_iso(" US ").unwrap().name, "United States");
        assert!(snapshot.country_by_iso("FR").is_none());
        assert_eq!(snapshot.country(&CountryId::from("de")).unwrap().iso_code, "DE");
        assert_eq!(snapshot.countries().count(), 2);
    }

    #[test]
    fn test_duplicate_override_rejected() {
        let err = base()
            .add_schedule(ShippingSchedule::country_override("acme", "us", fees(1)))
            .unwrap()
            .add_schedule(ShippingSchedule::country_override("acme", "us", fees(2)))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::Duplicate {
                field: "country override".to_string(),
                value: "acme/us".to_string(),
            }
        );
    }

    #[test]
    fn test_same_country_override_for_different_stores_allowed() {
        let snapshot = base()
            .add_schedule(ShippingSchedule::country_override("acme", "us", fees(1)))
            .unwrap()
            .add_schedule(ShippingSchedule::country_override("globex", "us", fees(2)))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(snapshot.override_count(), 2);
    }

    #[test]
    fn test_duplicate_default_and_policy_rejected() {
        let err = base()
            .add_schedule(ShippingSchedule::store_default("acme", fees(1)))
            .unwrap()
            .add_schedule(ShippingSchedule::store_default("acme", fees(2)))
            .unwrap_err();
        assert!(matches!(err, ValidationError::Duplicate { .. }));

        let err = base()
            .add_free_shipping_policy(FreeShippingPolicy::everywhere("acme"))
            .unwrap()
            .add_free_shipping_policy(FreeShippingPolicy::everywhere("acme"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::Duplicate { .. }));
    }

    #[test]
    fn test_duplicate_iso_rejected() {
        let err = base()
            .add_country(Country::new("usa", "us", "Also US"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::Duplicate { ref field, .. } if field == "iso_code"));
    }

    #[test]
    fn test_placeholder_country_reserved() {
        let err = base()
            .add_country(Country::new(UNKNOWN_COUNTRY_ID, "XA", "Nowhere"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { ref field, .. } if field == "country_id"));

        let err = base()
            .add_country(Country::new("zz", "zz", "Nowhere"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { ref field, .. } if field == "iso_code"));

        // "unknown" is an ordinary id and never matches the placeholder
        let snapshot = base()
            .add_country(Country::new("unknown", "XA", "Unknown Land"))
            .unwrap()
            .add_schedule(ShippingSchedule::store_default("acme", fees(1)))
            .unwrap()
            .add_schedule(ShippingSchedule::country_override("acme", "unknown", fees(0)))
            .unwrap()
            .build()
            .unwrap();
        let placeholder = crate::types::Destination::unknown();
        assert!(snapshot
            .country_override(&StoreId::from("acme"), &placeholder.country_id)
            .is_none());
    }

    #[test]
    fn test_invalid_schedule_rejected() {
        let mut bad = fees(1);
        bad.delivery_min_days = 9;
        bad.delivery_max_days = 1;
        let err = base()
            .add_schedule(ShippingSchedule::store_default("acme", bad))
            .unwrap_err();
        assert!(matches!(err, ValidationError::DeliveryWindowInverted { .. }));
    }

    #[test]
    fn test_unknown_country_reference_rejected_at_build() {
        let err = base()
            .add_schedule(ShippingSchedule::country_override("acme", "fr", fees(1)))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnknownReference { ref value, .. } if value == "fr"));

        let err = base()
            .add_free_shipping_policy(FreeShippingPolicy::for_countries("acme", ["fr"]))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnknownReference { .. }));
    }

    #[test]
    fn test_catalog_index() {
        let snapshot = base()
            .add_schedule(ShippingSchedule::store_default("acme", fees(1)))
            .unwrap()
            .add_schedule(ShippingSchedule::store_default("globex", fees(1)))
            .unwrap()
            .add_product("globex", "widget")
            .unwrap()
            .build()
            .unwrap();

        let acme = StoreId::from("acme");
        let globex = StoreId::from("globex");
        assert!(snapshot.store_exists(&acme));
        assert!(!snapshot.store_exists(&StoreId::from("initech")));

        // acme registered no products: anything goes
        assert!(snapshot.product_exists(&acme, &ProductId::from("anything")));
        assert!(snapshot.product_exists(&globex, &ProductId::from("widget")));
        assert!(!snapshot.product_exists(&globex, &ProductId::from("gadget")));
        assert!(!snapshot.product_exists(&StoreId::from("initech"), &ProductId::from("widget")));
    }
}
