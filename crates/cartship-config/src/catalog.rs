//! # Catalog Files
//!
//! Loads countries, store fee schedules and free-shipping policies from a
//! TOML document into a [`ConfigSnapshot`].
//!
//! ## File Format
//! ```toml
//! [[countries]]
//! iso = "US"
//! name = "United States"          # id defaults to the lowercase ISO code
//!
//! [[stores]]
//! id = "acme"
//! products = ["mug", "teapot"]     # optional; omit to accept any product
//!
//! [stores.default]
//! per_item_fee_cents = 500
//! additional_item_fee_cents = 200
//! per_kg_fee_cents = 100
//! fixed_fee_cents = 300
//! delivery_min_days = 2
//! delivery_max_days = 5
//! return_policy = "30 days"
//!
//! [[stores.overrides]]
//! country = "US"                   # ISO code of a listed country
//! per_item_fee_cents = 300
//! delivery_min_days = 1
//! delivery_max_days = 3
//!
//! [stores.free_shipping]
//! countries = []                   # empty = see EmptyPolicyScope
//! ```
//!
//! Every snapshot invariant is enforced while loading. A catalog that loads
//! is safe to price against.

use std::collections::HashMap;
use std::path::Path;

use cartship_core::validation::validate_iso_code;
use cartship_core::{
    ConfigSnapshot, Country, CountryId, FeeSchedule, FreeShippingPolicy, Money, ShippingSchedule,
    ValidationError,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ConfigResult;

// =============================================================================
// File Shape
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    countries: Vec<CountryEntry>,

    #[serde(default)]
    stores: Vec<StoreEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CountryEntry {
    #[serde(default)]
    id: Option<String>,
    iso: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoreEntry {
    id: String,

    #[serde(default)]
    products: Vec<String>,

    #[serde(default)]
    default: Option<FeeEntry>,

    #[serde(default)]
    overrides: Vec<OverrideEntry>,

    #[serde(default)]
    free_shipping: Option<FreeShippingEntry>,
}

/// Fee schedule as written in the file: whole cents and days.
///
/// Omitted fees are zero. Misspelled keys are rejected, never dropped.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct FeeEntry {
    #[serde(default)]
    per_item_fee_cents: i64,
    #[serde(default)]
    additional_item_fee_cents: i64,
    #[serde(default)]
    per_kg_fee_cents: i64,
    #[serde(default)]
    fixed_fee_cents: i64,
    #[serde(default)]
    delivery_min_days: u32,
    #[serde(default)]
    delivery_max_days: u32,
    #[serde(default)]
    return_policy: Option<String>,
}

impl From<FeeEntry> for FeeSchedule {
    fn from(entry: FeeEntry) -> Self {
        FeeSchedule {
            per_item_fee: Money::from_cents(entry.per_item_fee_cents),
            additional_item_fee: Money::from_cents(entry.additional_item_fee_cents),
            per_kg_fee: Money::from_cents(entry.per_kg_fee_cents),
            fixed_fee: Money::from_cents(entry.fixed_fee_cents),
            delivery_min_days: entry.delivery_min_days,
            delivery_max_days: entry.delivery_max_days,
            return_policy: entry.return_policy,
        }
    }
}

/// One `[[stores.overrides]]` row: a country plus the same keys as
/// [`FeeEntry`]. Spelled out because `flatten` cannot deny unknown keys.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OverrideEntry {
    country: String,
    #[serde(default)]
    per_item_fee_cents: i64,
    #[serde(default)]
    additional_item_fee_cents: i64,
    #[serde(default)]
    per_kg_fee_cents: i64,
    #[serde(default)]
    fixed_fee_cents: i64,
    #[serde(default)]
    delivery_min_days: u32,
    #[serde(default)]
    delivery_max_days: u32,
    #[serde(default)]
    return_policy: Option<String>,
}

impl OverrideEntry {
    fn into_parts(self) -> (String, FeeEntry) {
        let fees = FeeEntry {
            per_item_fee_cents: self.per_item_fee_cents,
            additional_item_fee_cents: self.additional_item_fee_cents,
            per_kg_fee_cents: self.per_kg_fee_cents,
            fixed_fee_cents: self.fixed_fee_cents,
            delivery_min_days: self.delivery_min_days,
            delivery_max_days: self.delivery_max_days,
            return_policy: self.return_policy,
        };
        (self.country, fees)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FreeShippingEntry {
    #[serde(default)]
    countries: Vec<String>,
}

// =============================================================================
// Loading
// =============================================================================

/// Reads and parses a catalog file.
pub fn load_catalog(path: impl AsRef<Path>) -> ConfigResult<ConfigSnapshot> {
    let path = path.as_ref();
    info!(?path, "Loading shipping catalog");
    let contents = std::fs::read_to_string(path)?;
    parse_catalog(&contents)
}

/// Parses a catalog document into a snapshot.
pub fn parse_catalog(contents: &str) -> ConfigResult<ConfigSnapshot> {
    let file: CatalogFile = toml::from_str(contents)?;
    let snapshot = build_snapshot(file)?;

    info!(
        countries = snapshot.countries().count(),
        stores = snapshot.stores().count(),
        "Shipping catalog loaded"
    );
    Ok(snapshot)
}

fn build_snapshot(file: CatalogFile) -> Result<ConfigSnapshot, ValidationError> {
    let mut builder = ConfigSnapshot::builder();
    let mut by_iso: HashMap<String, CountryId> = HashMap::new();

    for entry in file.countries {
        let iso = validate_iso_code(&entry.iso)?;
        let id = entry.id.unwrap_or_else(|| iso.to_ascii_lowercase());
        let country = Country::new(id, &iso, &entry.name);
        by_iso.insert(iso, country.id.clone());
        builder = builder.add_country(country)?;
    }

    let country_for = |iso: &str, store: &str| -> Result<CountryId, ValidationError> {
        let iso = validate_iso_code(iso)?;
        by_iso
            .get(&iso)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownReference {
                field: format!("store {store}"),
                entity: "country".to_string(),
                value: iso,
            })
    };

    for store in file.stores {
        debug!(store = %store.id, overrides = store.overrides.len(), "Loading store shipping");

        if let Some(fees) = store.default {
            builder = builder.add_schedule(ShippingSchedule::store_default(
                store.id.as_str(),
                fees.into(),
            ))?;
        }

        for entry in store.overrides {
            let (country, fees) = entry.into_parts();
            let country_id = country_for(&country, &store.id)?;
            builder = builder.add_schedule(ShippingSchedule::country_override(
                store.id.as_str(),
                country_id,
                fees.into(),
            ))?;
        }

        if let Some(free) = store.free_shipping {
            let countries = free
                .countries
                .iter()
                .map(|iso| country_for(iso, &store.id))
                .collect::<Result<Vec<_>, _>>()?;
            builder = builder.add_free_shipping_policy(FreeShippingPolicy::for_countries(
                store.id.as_str(),
                countries,
            ))?;
        }

        for product in &store.products {
            builder = builder.add_product(store.id.as_str(), product.as_str())?;
        }
    }

    builder.build()
}
