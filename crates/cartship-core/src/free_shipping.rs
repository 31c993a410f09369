//! # Free Shipping Evaluator
//!
//! Decides whether a store waives shipping for a destination.
//!
//! ```text
//! is_free(store, country)
//!      │
//!      ├── no policy ─────────────────────────► false
//!      │
//!      ├── policy, empty country set ─────────► EmptyPolicyScope
//!      │                                         AllCountries → true
//!      │                                         NoCountries  → false
//!      │
//!      └── policy, non-empty country set ─────► country ∈ set
//! ```
//!
//! Free shipping only zeroes the cost. The delivery window is still computed
//! from the resolved schedule.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ports::ShippingConfigStore;
use crate::types::{CountryId, StoreId};

/// How a policy with an empty eligible-country set is read.
///
/// Stored data records "no restriction" as an empty set, so the default is
/// global free shipping. `NoCountries` treats the empty set as a policy that
/// has not been configured yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPolicyScope {
    /// Empty set means every destination ships free.
    #[default]
    AllCountries,

    /// Empty set means no destination ships free.
    NoCountries,
}

impl std::fmt::Display for EmptyPolicyScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmptyPolicyScope::AllCountries => write!(f, "all_countries"),
            EmptyPolicyScope::NoCountries => write!(f, "no_countries"),
        }
    }
}

impl std::str::FromStr for EmptyPolicyScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all_countries" | "all" | "everywhere" => Ok(EmptyPolicyScope::AllCountries),
            "no_countries" | "none" | "nowhere" => Ok(EmptyPolicyScope::NoCountries),
            other => Err(format!(
                "Unknown empty policy scope: '{}'. Valid options: all_countries, no_countries",
                other
            )),
        }
    }
}

/// Evaluates free-shipping policies against a configuration store.
#[derive(Debug)]
pub struct FreeShippingEvaluator<'a, S: ?Sized> {
    store: &'a S,
    empty_policy: EmptyPolicyScope,
}

impl<'a, S> FreeShippingEvaluator<'a, S>
where
    S: ShippingConfigStore + ?Sized,
{
    pub fn new(store: &'a S, empty_policy: EmptyPolicyScope) -> Self {
        FreeShippingEvaluator {
            store,
            empty_policy,
        }
    }

    /// Returns true if the store ships to the country for free.
    ///
    /// Absence of a policy is the normal case and simply yields `false`.
    pub fn is_free(&self, store_id: &StoreId, country_id: &CountryId) -> bool {
        let Some(policy) = self.store.free_shipping_policy(store_id) else {
            return false;
        };

        let free = if policy.eligible_countries.is_empty() {
            self.empty_policy == EmptyPolicyScope::AllCountries
        } else {
            policy.eligible_countries.contains(country_id)
        };

        debug!(store = %store_id, country = %country_id, free, "Evaluated free shipping policy");
        free
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ConfigSnapshot;
    use crate::types::{Country, FreeShippingPolicy};

    fn snapshot() -> ConfigSnapshot {
        ConfigSnapshot::builder()
            .add_country(Country::new("us", "US", "United States"))
            .unwrap()
            .add_country(Country::new("ca", "CA", "Canada"))
            .unwrap()
            .add_country(Country::new("de", "DE", "Germany"))
            .unwrap()
            .add_free_shipping_policy(FreeShippingPolicy::everywhere("global"))
            .unwrap()
            .add_free_shipping_policy(FreeShippingPolicy::for_countries("northam", ["us", "ca"]))
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_no_policy_is_not_free() {
        let snapshot = snapshot();
        let evaluator = FreeShippingEvaluator::new(&snapshot, EmptyPolicyScope::AllCountries);
        assert!(!evaluator.is_free(&StoreId::from("paid"), &CountryId::from("us")));
    }

    #[test]
    fn test_empty_policy_is_free_everywhere_by_default() {
        let snapshot = snapshot();
        let evaluator = FreeShippingEvaluator::new(&snapshot, EmptyPolicyScope::default());
        let global = StoreId::from("global");
        for country in ["us", "ca", "de", crate::UNKNOWN_COUNTRY_ID] {
            assert!(evaluator.is_free(&global, &CountryId::from(country)));
        }
    }

    #[test]
    fn test_empty_policy_with_no_countries_scope() {
        let snapshot = snapshot();
        let evaluator = FreeShippingEvaluator::new(&snapshot, EmptyPolicyScope::NoCountries);
        assert!(!evaluator.is_free(&StoreId::from("global"), &CountryId::from("us")));
        // explicit lists are unaffected by the scope
        assert!(evaluator.is_free(&StoreId::from("northam"), &CountryId::from("us")));
    }

    #[test]
    fn test_listed_countries_only() {
        let snapshot = snapshot();
        let evaluator = FreeShippingEvaluator::new(&snapshot, EmptyPolicyScope::AllCountries);
        let northam = StoreId::from("northam");
        assert!(evaluator.is_free(&northam, &CountryId::from("us")));
        assert!(evaluator.is_free(&northam, &CountryId::from("ca")));
        assert!(!evaluator.is_free(&northam, &CountryId::from("de")));
    }

    #[test]
    fn test_empty_policy_scope_parsing() {
        assert_eq!(
            "all_countries".parse::<EmptyPolicyScope>().unwrap(),
            EmptyPolicyScope::AllCountries
        );
        assert_eq!(
            "NOWHERE".parse::<EmptyPolicyScope>().unwrap(),
            EmptyPolicyScope::NoCountries
        );
        assert!("sometimes".parse::<EmptyPolicyScope>().is_err());
        assert_eq!(EmptyPolicyScope::NoCountries.to_string(), "no_countries");
    }
}
