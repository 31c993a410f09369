//! # Collaborator Interfaces
//!
//! Read-only views the engine needs from the outside world. The engine never
//! fetches anything itself: the host loads a configuration snapshot once per
//! request and hands it in through these traits.
//!
//! ```text
//! ┌──────────────────────┐   ┌──────────────────────┐   ┌────────────────┐
//! │  CountryDirectory    │   │ ShippingConfigStore  │   │ CatalogIndex   │
//! │  country(id)         │   │ country_override()   │   │ store_exists() │
//! │  country_by_iso(iso) │   │ store_default()      │   │ product_exists │
//! │                      │   │ free_shipping_policy │   │                │
//! └──────────┬───────────┘   └──────────┬───────────┘   └───────┬────────┘
//!            │                          │                       │
//!            ▼                          ▼                       ▼
//!     destination.rs          rates.rs / free_shipping.rs   aggregator.rs
//! ```
//!
//! [`crate::snapshot::ConfigSnapshot`] implements all three.

use crate::types::{Country, CountryId, FeeSchedule, FreeShippingPolicy, ProductId, StoreId};

/// Lookup of destination countries.
pub trait CountryDirectory {
    /// Returns the country with the given directory id.
    fn country(&self, id: &CountryId) -> Option<&Country>;

    /// Returns the country with the given ISO alpha-2 code (case-insensitive).
    fn country_by_iso(&self, iso_code: &str) -> Option<&Country>;
}

/// Persisted shipping configuration for all stores.
///
/// Absence is a normal answer here: every lookup returns `Option`.
pub trait ShippingConfigStore {
    /// The store's override for one destination country.
    fn country_override(&self, store_id: &StoreId, country_id: &CountryId) -> Option<&FeeSchedule>;

    /// The store-wide default schedule.
    fn store_default(&self, store_id: &StoreId) -> Option<&FeeSchedule>;

    /// The store's free-shipping policy.
    fn free_shipping_policy(&self, store_id: &StoreId) -> Option<&FreeShippingPolicy>;
}

/// Existence checks for stores and products referenced by cart lines.
pub trait CatalogIndex {
    /// Checks if the store is known to the snapshot.
    fn store_exists(&self, store_id: &StoreId) -> bool;

    /// Checks if the product may be sold by the store.
    fn product_exists(&self, store_id: &StoreId, product_id: &ProductId) -> bool;
}
