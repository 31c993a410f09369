//! # cartship-config: Settings, Catalogs and Logging
//!
//! The I/O side of Cartship. Hosts use this crate to turn files and
//! environment variables into the inputs the pure engine expects.
//!
//! ## Startup Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  EngineConfig::load(path)      cartship.toml + CARTSHIP_* env          │
//! │         │                                                               │
//! │         ├──► logging::init_tracing(&config.logging)                     │
//! │         │                                                               │
//! │         ├──► catalog::load_catalog(config.catalog_path())               │
//! │         │         └──► ConfigSnapshot (all invariants checked)          │
//! │         │                                                               │
//! │         └──► config.engine_options() ──► ShippingEngine::new(...)       │
//! │                                                                         │
//! │  per request: cart::load_cart / parse_cart ──► compute_cart_shipping    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;
pub mod catalog;
pub mod error;
pub mod logging;
pub mod settings;

pub use cart::{load_cart, parse_cart};
pub use catalog::{load_catalog, parse_catalog};
pub use error::{ConfigError, ConfigResult};
pub use logging::init_tracing;
pub use settings::{CatalogSettings, EngineConfig, EngineSettings, LoggingSettings};

/// Log filter used when neither `RUST_LOG` nor the settings give a valid one.
pub const DEFAULT_LOG_FILTER: &str = "info,cartship=debug";

#[cfg(test)]
mod tests {
    use super::*;
    use cartship_core::{resolve_destination, ShippingEngine};
    use chrono::NaiveDate;

    const DEMO_CATALOG: &str = include_str!("../../../demos/catalog.toml");
    const DEMO_CART: &str = include_str!("../../../demos/cart.json");
    const DEMO_SETTINGS: &str = include_str!("../../../demos/cartship.toml");

    fn quote(country: Option<&str>) -> cartship_core::ShippingBreakdown {
        let config = EngineConfig::from_toml(DEMO_SETTINGS).unwrap();
        config.validate().unwrap();
        let snapshot = parse_catalog(DEMO_CATALOG).unwrap();
        let items = parse_cart(DEMO_CART).unwrap();

        let destination = resolve_destination(&snapshot, country, config.default_country_iso());
        let order_date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        ShippingEngine::new(&snapshot, config.engine_options())
            .compute_cart_shipping(&items, &destination, order_date)
            .unwrap()
    }

    #[test]
    fn test_demo_quote_domestic() {
        let breakdown = quote(Some("us"));
        let stores: Vec<_> = breakdown.stores.iter().map(|s| s.store_id.as_str()).collect();
        assert_eq!(stores, vec!["acme-ceramics", "north-knits", "paper-goods"]);

        assert_eq!(breakdown.stores[0].total_cost.cents(), 825);
        assert!(breakdown.stores[1].is_free);
        assert!(breakdown.stores[2].is_free);
        assert_eq!(breakdown.total_shipping_cost.cents(), 825);

        let window = breakdown.delivery_window().unwrap();
        assert_eq!(window.min_date, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(window.max_date, NaiveDate::from_ymd_opt(2026, 10, 28).unwrap());
    }

    #[test]
    fn test_demo_quote_abroad() {
        let breakdown = quote(Some("DE"));
        assert_eq!(breakdown.stores[0].total_cost.cents(), 1450);
        assert_eq!(breakdown.stores[1].total_cost.cents(), 600);
        assert!(breakdown.stores[2].is_free);
        assert_eq!(breakdown.total_shipping_cost.cents(), 2050);
    }

    #[test]
    fn test_demo_quote_unknown_country_uses_default() {
        let breakdown = quote(Some("QQ"));
        assert_eq!(breakdown.destination.iso_code, "US");
        assert_eq!(breakdown.total_shipping_cost.cents(), 825);
    }
}
