//! # Error Types
//!
//! Domain-specific error types for cartship-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cartship-core errors (this file)                                       │
//! │  ├── ShippingError    - Why a cart could not be priced                  │
//! │  └── ValidationError  - Bad snapshot or cart input                      │
//! │                                                                         │
//! │  cartship-config errors (separate crate)                                │
//! │  └── ConfigError      - Settings / catalog file failures                │
//! │                                                                         │
//! │  Flow: ValidationError → ShippingError → host → checkout message        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Propagation Policy
//! - "No override exists" is `None`, never an error
//! - A failed store group fails the whole cart: there is no partial breakdown
//! - `UnknownDestination` is recovered by destination resolution and only
//!   ever appears in logs

use thiserror::Error;

use crate::types::{CountryId, ProductId, StoreId};

// =============================================================================
// Shipping Error
// =============================================================================

/// Errors that stop a cart from being priced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShippingError {
    /// Store has neither a country override nor a default schedule.
    ///
    /// ## When This Occurs
    /// - Store was activated without a default schedule
    /// - Default schedule was deleted while overrides remain for other countries
    ///
    /// This is a store misconfiguration. Checkout for the store's items is
    /// blocked instead of pricing them at zero.
    #[error("Store {store_id} has no shipping configuration for country {country_id}")]
    MissingShippingConfig {
        store_id: StoreId,
        country_id: CountryId,
    },

    /// A cart line cannot be priced.
    ///
    /// ## When This Occurs
    /// - Quantity is zero or negative
    /// - Store or product is not present in the configuration snapshot
    /// - Line weight overflows
    #[error("Invalid cart item at line {index} ({store_id}/{product_id}): {reason}")]
    InvalidCartItem {
        index: usize,
        store_id: StoreId,
        product_id: ProductId,
        reason: String,
    },

    /// Destination country is not in the Country Directory.
    ///
    /// Destination resolution substitutes the default country and logs this
    /// error; it is never returned from `compute_cart_shipping`.
    #[error("Unknown destination country: {requested}")]
    UnknownDestination { requested: String },

    /// Delivery date overflowed the calendar.
    #[error("Delivery window for store {store_id} is out of the supported date range")]
    DateOutOfRange { store_id: StoreId },

    /// A store group's fee left the representable money range.
    ///
    /// ## When This Occurs
    /// - Per-kg fee on a very heavy group
    /// - Additional-item fee times a large unit count
    ///
    /// The store is never priced with a wrapped or truncated amount.
    #[error("Shipping fee for store {store_id} is too large to represent")]
    FeeOverflow { store_id: StoreId },

    /// The order total left the representable money range.
    #[error("Order shipping total is too large to represent")]
    TotalOverflow,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl ShippingError {
    /// The store the error is about, if it concerns a single store.
    pub fn store_id(&self) -> Option<&StoreId> {
        match self {
            ShippingError::MissingShippingConfig { store_id, .. }
            | ShippingError::InvalidCartItem { store_id, .. }
            | ShippingError::DateOutOfRange { store_id }
            | ShippingError::FeeOverflow { store_id } => Some(store_id),
            ShippingError::UnknownDestination { .. }
            | ShippingError::TotalOverflow
            | ShippingError::Validation(_) => None,
        }
    }

    /// Returns true if checkout must be blocked for the whole cart.
    pub fn blocks_checkout(&self) -> bool {
        !matches!(self, ShippingError::UnknownDestination { .. })
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised while building a configuration snapshot and while checking cart
/// lines, before any fee is computed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., ISO code that is not two letters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., second override for the same store and country).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Reference to an entity that is not in the snapshot.
    #[error("{field} refers to unknown {entity} '{value}'")]
    UnknownReference {
        field: String,
        entity: String,
        value: String,
    },

    /// Delivery lead time bounds are inverted.
    #[error("delivery_min_days ({min}) must not exceed delivery_max_days ({max})")]
    DeliveryWindowInverted { min: u32, max: u32 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with ShippingError.
pub type ShippingResult<T> = Result<T, ShippingError>;

// =============================================================================
// Unit Tests
// =============================================================================
