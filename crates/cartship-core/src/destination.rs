//! # Destination Resolution
//!
//! Turns the buyer's requested country into a [`Destination`] the engine can
//! price against. Never fails: a cart must always be displayable.
//!
//! ```text
//! requested ISO ──► directory hit? ──yes──► Destination(requested)
//!                        │
//!                        no  (warn: UnknownDestination)
//!                        ▼
//!   fallback ISO ──► directory hit? ──yes──► Destination(fallback)
//!                        │
//!                        no
//!                        ▼
//!                 Destination::unknown()  ("ZZ")
//! ```
//!
//! The placeholder destination matches no override and no eligibility list,
//! so its stores are priced with their defaults (or shipped free under a
//! global policy).

use tracing::{debug, warn};

use crate::error::ShippingError;
use crate::ports::CountryDirectory;
use crate::types::Destination;

/// Resolves the destination for one request.
///
/// `requested_iso` is `None` when the buyer's location is not known (for
/// example an unset client-side preference).
pub fn resolve_destination<D>(
    directory: &D,
    requested_iso: Option<&str>,
    fallback_iso: &str,
) -> Destination
where
    D: CountryDirectory + ?Sized,
{
    if let Some(requested) = requested_iso {
        if let Some(country) = directory.country_by_iso(requested) {
            debug!(iso = %country.iso_code, "Resolved destination country");
            return Destination::from(country);
        }

        let err = ShippingError::UnknownDestination {
            requested: requested.trim().to_string(),
        };
        warn!(error = %err, fallback = %fallback_iso, "Falling back to default destination");
    }

    match directory.country_by_iso(fallback_iso) {
        Some(country) => Destination::from(country),
        None => {
            warn!(fallback = %fallback_iso, "Default destination is not in the country directory");
            Destination::unknown()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
