//! Cartship quote tool - prices a cart file against a shipping catalog.
//!
//! # Usage
//!
//! ```bash
//! # Price a cart for the default destination, ordered today
//! cartship-quote --cart cart.json --catalog catalog.toml
//!
//! # Price for Germany on a fixed order date
//! cartship-quote --cart cart.json --country DE --order-date 2026-10-18
//!
//! # Use an explicit settings file (catalog path may come from it)
//! cartship-quote --cart cart.json --config ./cartship.toml
//! ```
//!
//! The breakdown is printed as pretty JSON on stdout. Logs go to stderr.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::{Path, PathBuf};

use cartship_config::{load_cart, load_catalog, ConfigResult, EngineConfig};
use cartship_core::{resolve_destination, ShippingEngine};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "cartship-quote")]
#[command(author, version, about = "Multi-vendor cart shipping quotes")]
struct Cli {
    /// Cart JSON file (array of lines or {"items": [...]})
    #[arg(long)]
    cart: PathBuf,

    /// Shipping catalog TOML (overrides [catalog] path from settings)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Settings file (defaults to the per-user cartship.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Destination ISO country code; falls back to the configured default
    #[arg(long)]
    country: Option<String>,

    /// Order date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    order_date: Option<NaiveDate>,
}

fn main() {
    let cli = Cli::parse();

    // config errors are reported once the subscriber exists
    let loaded = load_config(cli.config.as_deref());
    let config = loaded.as_ref().cloned().unwrap_or_default();
    cartship_config::init_tracing(&config.logging);

    if let Err(e) = &loaded {
        if cli.config.is_some() {
            error!("Failed to load engine config: {e}");
            std::process::exit(1);
        }
        warn!("Failed to load engine config: {e}. Using defaults.");
    }

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config);

    if let Err(e) = result {
        error!("Quote failed: {e}");
        std::process::exit(1);
    }
}

/// An explicit `--config` file must exist and be valid. The per-user file
/// is optional.
fn load_config(path: Option<&Path>) -> ConfigResult<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load_file(path),
        None => EngineConfig::load(None),
    }
}

fn run(cli: Cli, config: &EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let request_id = Uuid::new_v4();
    let _span = info_span!("quote", %request_id).entered();

    let catalog_path = cli
        .catalog
        .or_else(|| config.catalog_path().map(PathBuf::from))
        .ok_or("no catalog given: pass --catalog or set [catalog] path")?;

    let snapshot = load_catalog(&catalog_path)?;
    let items = load_cart(&cli.cart)?;

    let destination = resolve_destination(
        &snapshot,
        cli.country.as_deref(),
        config.default_country_iso(),
    );
    let order_date = cli
        .order_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let engine = ShippingEngine::new(&snapshot, config.engine_options());
    let breakdown = engine.compute_cart_shipping(&items, &destination, order_date)?;

    info!(
        destination = %breakdown.destination.iso_code,
        stores = breakdown.stores.len(),
        total = %breakdown.total_shipping_cost,
        "Quote computed"
    );

    println!("{}", serde_json::to_string_pretty(&breakdown)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "cartship-quote",
            "--cart",
            "cart.json",
            "--country",
            "de",
            "--order-date",
            "2026-10-18",
        ])
        .unwrap();

        assert_eq!(cli.cart, PathBuf::from("cart.json"));
        assert_eq!(cli.country.as_deref(), Some("de"));
        assert_eq!(cli.order_date, NaiveDate::from_ymd_opt(2026, 10, 18));
        assert!(cli.catalog.is_none());
    }

    #[test]
    fn test_explicit_config_must_load() {
        let dir = std::env::temp_dir().join(format!("cartship-quote-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let missing = dir.join("missing.toml");
        assert!(load_config(Some(missing.as_path())).unwrap_err().is_not_found());

        let malformed = dir.join("malformed.toml");
        std::fs::write(&malformed, "[engine\nbroken").unwrap();
        assert!(load_config(Some(malformed.as_path())).is_err());

        let invalid = dir.join("invalid.toml");
        std::fs::write(&invalid, "[engine]\ndefault_country_iso = \"USA\"\n").unwrap();
        assert!(load_config(Some(invalid.as_path())).is_err());

        let good = dir.join("good.toml");
        std::fs::write(&good, "[engine]\ndefault_country_iso = \"CA\"\n").unwrap();
        let config = load_config(Some(good.as_path())).unwrap();
        assert_eq!(config.default_country_iso(), "CA");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_cart_is_required() {
        assert!(Cli::try_parse_from(["cartship-quote"]).is_err());
    }

    #[test]
    fn test_bad_order_date_rejected() {
        assert!(Cli::try_parse_from(["cartship-quote", "--cart", "c.json", "--order-date", "18/10/2026"]).is_err());
    }
}
