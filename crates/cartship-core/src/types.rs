//! # Domain Types
//!
//! Input types the engine reads: identifiers, reference data, persisted fee
//! configuration and the transient cart snapshot.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Reference data        Persisted configuration      Per request        │
//! │  ──────────────        ───────────────────────      ───────────        │
//! │  ┌─────────────┐       ┌──────────────────────┐     ┌──────────────┐   │
//! │  │  Country    │       │  ShippingSchedule    │     │ CartLineItem │   │
//! │  │  id         │       │  store_id            │     │ store_id     │   │
//! │  │  iso_code   │◄──────│  scope ─┐            │     │ product_id   │   │
//! │  │  name       │       │  fees   │ FeeSchedule│     │ quantity     │   │
//! │  └─────────────┘       └─────────┼────────────┘     │ unit_weight  │   │
//! │                                  ▼                  └──────────────┘   │
//! │                        ScheduleScope                ┌──────────────┐   │
//! │                        Default                      │ Destination  │   │
//! │                        CountryOverride{country_id}  │ country_id   │   │
//! │                                                     │ iso_code     │   │
//! │                        FreeShippingPolicy           └──────────────┘   │
//! │                        store_id, eligible_countries                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Units
//! - Money: integer cents (see [`crate::money`])
//! - Weight: integer grams ([`Weight`])
//! - Lead times: whole calendar days

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::{UNKNOWN_COUNTRY_ID, UNKNOWN_COUNTRY_ISO};

// =============================================================================
// Identifiers
// =============================================================================

/// Defines a string-backed identifier newtype.
///
/// Each identifier is its own type so a `StoreId` can never be passed where a
/// `CountryId` is expected.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
        )]
        #[ts(export)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(
    /// Identifies an independent vendor store.
    StoreId
);
define_id!(
    /// Identifies a destination country in the Country Directory.
    CountryId
);
define_id!(
    /// Identifies a product within a store's catalog.
    ProductId
);
define_id!(
    /// Identifies a product variant (size, colour, ...).
    VariantId
);

// =============================================================================
// Weight
// =============================================================================

/// A non-negative weight in grams.
///
/// ## Why Grams?
/// Same reasoning as integer cents: `unit_weight_kg = 1.5` becomes
/// `1500` grams, and summing a group's weight stays exact.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Weight(#[ts(type = "number")] u64);

impl Weight {
    /// Creates a weight from grams.
    #[inline]
    pub const fn from_grams(grams: u64) -> Self {
        Weight(grams)
    }

    /// Returns the weight in grams.
    #[inline]
    pub const fn grams(&self) -> u64 {
        self.0
    }

    /// Zero weight.
    #[inline]
    pub const fn zero() -> Self {
        Weight(0)
    }

    /// Checks if the weight is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Weight of `quantity` identical units, `None` on overflow.
    #[inline]
    pub const fn checked_times(&self, quantity: u64) -> Option<Self> {
        match self.0.checked_mul(quantity) {
            Some(grams) => Some(Weight(grams)),
            None => None,
        }
    }

    /// Adds two weights, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Weight) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(grams) => Some(Weight(grams)),
            None => None,
        }
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03} kg", self.0 / 1000, self.0 % 1000)
    }
}

// =============================================================================
// Country
// =============================================================================

/// A destination country. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Country {
    /// Directory identifier.
    pub id: CountryId,

    /// ISO 3166-1 alpha-2 code, uppercase (e.g. "US").
    pub iso_code: String,

    /// Display name.
    pub name: String,
}

impl Country {
    pub fn new(id: impl Into<CountryId>, iso_code: &str, name: &str) -> Self {
        Country {
            id: id.into(),
            iso_code: iso_code.to_ascii_uppercase(),
            name: name.to_string(),
        }
    }
}

// =============================================================================
// Fee Schedule
// =============================================================================

/// Monetary and lead-time parameters for shipping one store's goods.
///
/// The same shape serves both the store-wide default and the per-country
/// override; [`ScheduleScope`] tells them apart.
///
/// ## Fee Components
/// ```text
/// per_item_fee         charged once per store group ("first unit")
/// additional_item_fee  charged for every unit after the first
/// per_kg_fee           charged per kilogram of the group's total weight
/// fixed_fee            charged once per store group
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub per_item_fee: Money,
    pub additional_item_fee: Money,
    pub per_kg_fee: Money,
    pub fixed_fee: Money,

    /// Earliest delivery, in calendar days after the order date.
    pub delivery_min_days: u32,

    /// Latest delivery, in calendar days after the order date.
    pub delivery_max_days: u32,

    /// Free-form return policy shown next to the shipping estimate.
    #[serde(default)]
    pub return_policy: Option<String>,
}

impl FeeSchedule {
    /// A schedule with every fee at zero and same-day delivery.
    pub fn free() -> Self {
        FeeSchedule {
            per_item_fee: Money::zero(),
            additional_item_fee: Money::zero(),
            per_kg_fee: Money::zero(),
            fixed_fee: Money::zero(),
            delivery_min_days: 0,
            delivery_max_days: 0,
            return_policy: None,
        }
    }
}

/// Which configuration level a schedule belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleScope {
    /// Store-wide fallback. One per active store.
    Default,

    /// Narrowed to one destination country. At most one per (store, country).
    CountryOverride { country_id: CountryId },
}

impl ScheduleScope {
    /// The country this scope is narrowed to, if any.
    pub fn country(&self) -> Option<&CountryId> {
        match self {
            ScheduleScope::Default => None,
            ScheduleScope::CountryOverride { country_id } => Some(country_id),
        }
    }
}

/// A persisted fee schedule row: owner store, scope and the fees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingSchedule {
    pub store_id: StoreId,
    pub scope: ScheduleScope,
    pub fees: FeeSchedule,
}

impl ShippingSchedule {
    /// Creates the store-wide default schedule.
    pub fn store_default(store_id: impl Into<StoreId>, fees: FeeSchedule) -> Self {
        ShippingSchedule {
            store_id: store_id.into(),
            scope: ScheduleScope::Default,
            fees,
        }
    }

    /// Creates a country override schedule.
    pub fn country_override(
        store_id: impl Into<StoreId>,
        country_id: impl Into<CountryId>,
        fees: FeeSchedule,
    ) -> Self {
        ShippingSchedule {
            store_id: store_id.into(),
            scope: ScheduleScope::CountryOverride {
                country_id: country_id.into(),
            },
            fees,
        }
    }
}

// =============================================================================
// Free Shipping Policy
// =============================================================================

/// Per-store rule waiving shipping cost for some or all destinations.
///
/// An empty `eligible_countries` set is read according to
/// [`crate::free_shipping::EmptyPolicyScope`]; by default it means every country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeShippingPolicy {
    pub store_id: StoreId,

    #[serde(default)]
    pub eligible_countries: BTreeSet<CountryId>,
}

impl FreeShippingPolicy {
    /// A policy with no country restriction recorded.
    pub fn everywhere(store_id: impl Into<StoreId>) -> Self {
        FreeShippingPolicy {
            store_id: store_id.into(),
            eligible_countries: BTreeSet::new(),
        }
    }

    /// A policy limited to the given countries.
    pub fn for_countries<I, C>(store_id: impl Into<StoreId>, countries: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CountryId>,
    {
        FreeShippingPolicy {
            store_id: store_id.into(),
            eligible_countries: countries.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Cart Line Item
// =============================================================================

/// One line of the buyer's cart, frozen at computation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub store_id: StoreId,
    pub product_id: ProductId,

    #[serde(default)]
    pub variant_id: Option<VariantId>,

    /// Units ordered. Must be at least 1.
    pub quantity: i64,

    /// Weight of a single unit.
    #[serde(rename = "unit_weight_grams", default)]
    pub unit_weight: Weight,
}

impl CartLineItem {
    pub fn new(
        store_id: impl Into<StoreId>,
        product_id: impl Into<ProductId>,
        quantity: i64,
        unit_weight: Weight,
    ) -> Self {
        CartLineItem {
            store_id: store_id.into(),
            product_id: product_id.into(),
            variant_id: None,
            quantity,
            unit_weight,
        }
    }

    /// Sets the variant.
    pub fn with_variant(mut self, variant_id: impl Into<VariantId>) -> Self {
        self.variant_id = Some(variant_id.into());
        self
    }

    /// Weight of the whole line (quantity × unit weight).
    ///
    /// `None` if the product overflows. Non-positive quantities weigh
    /// nothing; the aggregator rejects them before any fee is computed.
    pub fn line_weight(&self) -> Option<Weight> {
        let qty = u64::try_from(self.quantity).unwrap_or(0);
        self.unit_weight.checked_times(qty)
    }
}

// =============================================================================
// Destination
// =============================================================================

/// The buyer's resolved destination, fixed for one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Destination {
    pub country_id: CountryId,
    pub iso_code: String,
}

impl Destination {
    pub fn new(country_id: impl Into<CountryId>, iso_code: &str) -> Self {
        Destination {
            country_id: country_id.into(),
            iso_code: iso_code.to_ascii_uppercase(),
        }
    }

    /// Destination for a buyer whose country could not be determined.
    pub fn unknown() -> Self {
        Destination {
            country_id: CountryId::new(UNKNOWN_COUNTRY_ID),
            iso_code: UNKNOWN_COUNTRY_ISO.to_string(),
        }
    }

    /// Checks if this is the placeholder destination.
    pub fn is_unknown(&self) -> bool {
        self.iso_code == UNKNOWN_COUNTRY_ISO
    }
}

impl From<&Country> for Destination {
    fn from(country: &Country) -> Self {
        Destination {
            country_id: country.id.clone(),
            iso_code: country.iso_code.clone(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
