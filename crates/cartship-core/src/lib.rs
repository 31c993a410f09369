//! # cartship-core: Multi-Vendor Cart Shipping Engine
//!
//! Computes per-store shipping cost and delivery windows for a cart that
//! mixes items from independent vendor stores. Everything here is a pure
//! function of the cart, the destination and a configuration snapshot.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cartship Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Host (apps/cartship-quote, web handlers)           │   │
//! │  │    load config ──► build snapshot ──► resolve destination       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ items, destination, order_date         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ cartship-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌──────────────┐  ┌───────────┐  ┌──────────┐ │   │
//! │  │   │   rates   │  │free_shipping │  │ delivery  │  │aggregator│ │   │
//! │  │   │ override  │  │   policy     │  │  window   │  │ groups + │ │   │
//! │  │   │ → default │  │   check      │  │  dates    │  │ formulas │ │   │
//! │  │   └───────────┘  └──────────────┘  └───────────┘  └──────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO SHARED STATE • PURE FUNCTIONS          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ShippingBreakdown                      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          Cart display / checkout (persist total on order)       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Identifiers, countries, fee schedules, cart lines
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Snapshot and cart input rules
//! - [`ports`] - Read-only collaborator traits
//! - [`snapshot`] - In-memory configuration snapshot
//! - [`rates`] - Rate Resolver
//! - [`free_shipping`] - Free Shipping Evaluator
//! - [`delivery`] - Delivery Estimator
//! - [`destination`] - Buyer destination resolution
//! - [`breakdown`] - Output types
//! - [`aggregator`] - Cart Aggregator (the entry point)
//!
//! ## Example Usage
//!
//! ```rust
//! use cartship_core::{compute_cart_shipping, CartLineItem, ConfigSnapshot, Country, Destination};
//! use cartship_core::{FeeSchedule, Money, ShippingSchedule, Weight};
//! use chrono::NaiveDate;
//!
//! let fees = FeeSchedule {
//!     per_item_fee: Money::from_cents(300),
//!     additional_item_fee: Money::from_cents(100),
//!     per_kg_fee: Money::from_cents(50),
//!     fixed_fee: Money::from_cents(200),
//!     delivery_min_days: 1,
//!     delivery_max_days: 3,
//!     return_policy: None,
//! };
//! let snapshot = ConfigSnapshot::builder()
//!     .add_country(Country::new("us", "US", "United States"))?
//!     .add_schedule(ShippingSchedule::store_default("acme", fees))?
//!     .build()?;
//!
//! let items = vec![
//!     CartLineItem::new("acme", "mug", 2, Weight::from_grams(750)),
//!     CartLineItem::new("acme", "pot", 1, Weight::from_grams(1000)),
//! ];
//! let order_date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
//! let breakdown =
//!     compute_cart_shipping(&snapshot, &items, &Destination::new("us", "US"), order_date).unwrap();
//!
//! // $3.00 + 2 × $1.00 + 2.5 kg × $0.50 + $2.00
//! assert_eq!(breakdown.total_shipping_cost.cents(), 825);
//! # Ok::<(), cartship_core::ValidationError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregator;
pub mod breakdown;
pub mod delivery;
pub mod destination;
pub mod error;
pub mod free_shipping;
pub mod money;
pub mod ports;
pub mod rates;
pub mod snapshot;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use cartship_core::Money` instead of
// `use cartship_core::money::Money`

pub use aggregator::{compute_cart_shipping, EngineOptions, ShippingEngine};
pub use breakdown::{FeeBreakdown, ShippingBreakdown, StoreShipping};
pub use delivery::DeliveryWindow;
pub use destination::resolve_destination;
pub use error::{ShippingError, ShippingResult, ValidationError};
pub use free_shipping::EmptyPolicyScope;
pub use money::Money;
pub use ports::{CatalogIndex, CountryDirectory, ShippingConfigStore};
pub use rates::RateSource;
pub use snapshot::{ConfigSnapshot, ConfigSnapshotBuilder};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// ISO code of the placeholder destination used when no known country applies.
///
/// "ZZ" is in the user-assigned ISO 3166 range, so it never collides with a
/// real country.
pub const UNKNOWN_COUNTRY_ISO: &str = "ZZ";

/// Country id of the placeholder destination. Snapshots refuse to register it.
pub const UNKNOWN_COUNTRY_ID: &str = "__unknown__";

/// Maximum line items allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single cart line
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Longest delivery lead time a schedule may declare, in days.
pub const MAX_DELIVERY_DAYS: u32 = 365;

/// Largest single fee a schedule may declare, in cents ($10,000,000).
pub const MAX_FEE_CENTS: i64 = 1_000_000_000;

/// Longest identifier accepted for stores, products and countries.
pub const MAX_ID_LENGTH: usize = 64;
