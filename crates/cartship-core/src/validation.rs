//! # Validation Module
//!
//! Input validation for configuration snapshots and cart lines.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Store operator forms / cart session (out of scope)           │
//! │  ├── Quantity pickers, fee inputs                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Snapshot build (ConfigSnapshotBuilder, catalog loader)       │
//! │  ├── THIS MODULE: fee schedules, ISO codes, ids                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Aggregation (compute_cart_shipping)                          │
//! │  └── THIS MODULE again: quantity and cart size re-checked              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cartship_core::validation::{validate_iso_code, validate_quantity};
//!
//! assert_eq!(validate_iso_code("us").unwrap(), "US");
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::FeeSchedule;
use crate::{MAX_CART_ITEMS, MAX_DELIVERY_DAYS, MAX_FEE_CENTS, MAX_ID_LENGTH, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an identifier (store, product, country...).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 64 characters
pub fn validate_id(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > MAX_ID_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_LENGTH,
        });
    }

    Ok(())
}

/// Validates an ISO 3166-1 alpha-2 country code.
///
/// ## Returns
/// The code normalised to uppercase.
///
/// ```rust
/// use cartship_core::validation::validate_iso_code;
///
/// assert_eq!(validate_iso_code(" de ").unwrap(), "DE");
/// assert!(validate_iso_code("USA").is_err());
/// assert!(validate_iso_code("").is_err());
/// ```
pub fn validate_iso_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "iso_code".to_string(),
        });
    }

    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidFormat {
            field: "iso_code".to_string(),
            reason: "must be two ASCII letters".to_string(),
        });
    }

    Ok(code.to_ascii_uppercase())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

fn validate_fee(field: &str, fee: Money) -> ValidationResult<()> {
    if fee.is_negative() || fee.cents() > MAX_FEE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_FEE_CENTS,
        });
    }
    Ok(())
}

/// Validates a fee schedule.
///
/// ## Rules
/// - All four fees are within 0..=MAX_FEE_CENTS
/// - `delivery_min_days <= delivery_max_days`
/// - `delivery_max_days <= MAX_DELIVERY_DAYS` (365)
///
/// ```rust
/// use cartship_core::types::FeeSchedule;
/// use cartship_core::validation::validate_fee_schedule;
///
/// let mut fees = FeeSchedule::free();
/// assert!(validate_fee_schedule(&fees).is_ok());
///
/// fees.delivery_min_days = 5;
/// fees.delivery_max_days = 2;
/// assert!(validate_fee_schedule(&fees).is_err());
/// ```
pub fn validate_fee_schedule(fees: &FeeSchedule) -> ValidationResult<()> {
    validate_fee("per_item_fee", fees.per_item_fee)?;
    validate_fee("additional_item_fee", fees.additional_item_fee)?;
    validate_fee("per_kg_fee", fees.per_kg_fee)?;
    validate_fee("fixed_fee", fees.fixed_fee)?;

    if fees.delivery_min_days > fees.delivery_max_days {
        return Err(ValidationError::DeliveryWindowInverted {
            min: fees.delivery_min_days,
            max: fees.delivery_max_days,
        });
    }

    if fees.delivery_max_days > MAX_DELIVERY_DAYS {
        return Err(ValidationError::OutOfRange {
            field: "delivery_max_days".to_string(),
            min: 0,
            max: MAX_DELIVERY_DAYS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size (number of line items).
///
/// ## Rules
/// - Must not exceed MAX_CART_ITEMS (100)
pub fn validate_cart_size(line_items: usize) -> ValidationResult<()> {
    if line_items > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
