//! # Engine Settings
//!
//! Configuration management for hosts that run the shipping engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CARTSHIP_DEFAULT_COUNTRY=DE                                        │
//! │     CARTSHIP_EMPTY_POLICY=no_countries                                 │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/cartship/cartship.toml (Linux)                           │
//! │     ~/Library/Application Support/com.cartship.cartship/cartship.toml  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     US fallback, empty policy = all countries, threshold 8             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cartship.toml
//! [engine]
//! default_country_iso = "US"
//! empty_policy = "all_countries"   # all_countries | no_countries
//! parallel_threshold = 8           # 0 disables parallel evaluation
//!
//! [logging]
//! filter = "info,cartship=debug"
//! json = false
//!
//! [catalog]
//! path = "catalog.toml"
//! ```

use std::path::{Path, PathBuf};

use cartship_core::validation::validate_iso_code;
use cartship_core::{EmptyPolicyScope, EngineOptions};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::DEFAULT_LOG_FILTER;

// =============================================================================
// Engine Settings
// =============================================================================

/// How the engine evaluates carts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Destination used when the buyer's country is unknown.
    #[serde(default = "default_country_iso")]
    pub default_country_iso: String,

    /// Reading of free-shipping policies with no listed countries.
    #[serde(default)]
    pub empty_policy: EmptyPolicyScope,

    /// Store groups at or above this count are priced in parallel.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

fn default_country_iso() -> String {
    "US".to_string()
}

fn default_parallel_threshold() -> usize {
    cartship_core::aggregator::DEFAULT_PARALLEL_THRESHOLD
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            default_country_iso: default_country_iso(),
            empty_policy: EmptyPolicyScope::default(),
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

// =============================================================================
// Logging Settings
// =============================================================================

/// Log output settings. `RUST_LOG` still wins over `filter`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// Emit one JSON object per event instead of human-readable lines.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
            json: false,
        }
    }
}

// =============================================================================
// Catalog Settings
// =============================================================================

/// Where the shipping catalog lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

// =============================================================================
// Engine Config
// =============================================================================

/// Complete host configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub engine: EngineSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cartship.toml)
    /// 3. Environment variables
    ///
    /// A missing file at the chosen path means defaults. Use [`Self::load_file`]
    /// when the file must exist.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => Self::load_file(&path),
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::finish(Self::default())
            }
            None => Self::finish(Self::default()),
        }
    }

    /// Loads a config file that must exist, then applies the environment.
    pub fn load_file(path: &Path) -> ConfigResult<Self> {
        info!(?path, "Loading engine config from file");
        let contents = std::fs::read_to_string(path)?;
        Self::finish(Self::from_toml(&contents)?)
    }

    fn finish(mut config: Self) -> ConfigResult<Self> {
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document without touching the environment.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::InvalidConfig("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Engine config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_iso_code(&self.engine.default_country_iso).map_err(|e| {
            ConfigError::InvalidConfig(format!(
                "default_country_iso '{}': {}",
                self.engine.default_country_iso, e
            ))
        })?;

        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "logging filter must not be empty".into(),
            ));
        }

        if let Some(path) = &self.catalog.path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfig(
                    "catalog path must not be empty".into(),
                ));
            }
        }

        Ok(())
    }

    /// Applies `CARTSHIP_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(iso) = lookup("CARTSHIP_DEFAULT_COUNTRY") {
            debug!(iso = %iso, "Overriding default country from environment");
            self.engine.default_country_iso = iso.trim().to_ascii_uppercase();
        }

        if let Some(policy) = lookup("CARTSHIP_EMPTY_POLICY") {
            match policy.parse() {
                Ok(parsed) => {
                    debug!(policy = %policy, "Overriding empty policy scope from environment");
                    self.engine.empty_policy = parsed;
                }
                Err(e) => warn!("{}", e),
            }
        }

        if let Some(threshold) = lookup("CARTSHIP_PARALLEL_THRESHOLD") {
            match threshold.trim().parse::<usize>() {
                Ok(t) => self.engine.parallel_threshold = t,
                Err(_) => warn!(value = %threshold, "Invalid parallel threshold in environment"),
            }
        }

        if let Some(filter) = lookup("CARTSHIP_LOG") {
            self.logging.filter = filter;
        }

        if let Some(json) = lookup("CARTSHIP_LOG_JSON") {
            match json.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => self.logging.json = true,
                "0" | "false" | "no" => self.logging.json = false,
                _ => warn!(value = %json, "Unknown CARTSHIP_LOG_JSON value"),
            }
        }

        if let Some(path) = lookup("CARTSHIP_CATALOG") {
            debug!(path = %path, "Overriding catalog path from environment");
            self.catalog.path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "cartship", "cartship")
            .map(|dirs| dirs.config_dir().join("cartship.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Options handed to the shipping engine.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            empty_policy: self.engine.empty_policy,
            parallel_threshold: self.engine.parallel_threshold,
        }
    }

    /// Fallback destination ISO code.
    pub fn default_country_iso(&self) -> &str {
        &self.engine.default_country_iso
    }

    /// Configured catalog file, if any.
    pub fn catalog_path(&self) -> Option<&Path> {
        self.catalog.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn scratch_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("cartship-test-{}", uuid::Uuid::new_v4()))
            .join("cartship.toml")
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.default_country_iso(), "US");
        assert_eq!(config.engine.empty_policy, EmptyPolicyScope::AllCountries);
        assert_eq!(config.engine.parallel_threshold, 8);
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);
        assert!(config.catalog_path().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml(
            r#"
            [engine]
            empty_policy = "no_countries"

            [catalog]
            path = "shops/catalog.toml"
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.empty_policy, EmptyPolicyScope::NoCountries);
        assert_eq!(config.default_country_iso(), "US");
        assert_eq!(config.engine.parallel_threshold, 8);
        assert_eq!(config.catalog_path(), Some(Path::new("shops/catalog.toml")));
    }

    #[test]
    fn test_unknown_policy_in_toml_rejected() {
        let err = EngineConfig::from_toml("[engine]\nempty_policy = \"sometimes\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = EngineConfig::default();
        config.apply_overrides(lookup(&[
            ("CARTSHIP_DEFAULT_COUNTRY", " de "),
            ("CARTSHIP_EMPTY_POLICY", "nowhere"),
            ("CARTSHIP_PARALLEL_THRESHOLD", "0"),
            ("CARTSHIP_LOG", "warn"),
            ("CARTSHIP_LOG_JSON", "true"),
            ("CARTSHIP_CATALOG", "/etc/cartship/catalog.toml"),
        ]));

        assert_eq!(config.default_country_iso(), "DE");
        assert_eq!(config.engine.empty_policy, EmptyPolicyScope::NoCountries);
        assert_eq!(config.engine.parallel_threshold, 0);
        assert_eq!(config.logging.filter, "warn");
        assert!(config.logging.json);
        assert_eq!(
            config.catalog_path(),
            Some(Path::new("/etc/cartship/catalog.toml"))
        );
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let mut config = EngineConfig::default();
        config.apply_overrides(lookup(&[
            ("CARTSHIP_EMPTY_POLICY", "sometimes"),
            ("CARTSHIP_PARALLEL_THRESHOLD", "many"),
            ("CARTSHIP_LOG_JSON", "maybe"),
        ]));
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();
        assert!(config.validate().is_ok());

        config.engine.default_country_iso = "USA".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidConfig(_))));

        config.engine.default_country_iso = "us".to_string();
        assert!(config.validate().is_ok());

        config.logging.filter = "  ".to_string();
        assert!(config.validate().is_err());

        config.logging.filter = "info".to_string();
        config.catalog.path = Some(PathBuf::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_engine_options_mapping() {
        let mut config = EngineConfig::default();
        config.engine.empty_policy = EmptyPolicyScope::NoCountries;
        config.engine.parallel_threshold = 3;

        let options = config.engine_options();
        assert_eq!(options.empty_policy, EmptyPolicyScope::NoCountries);
        assert_eq!(options.parallel_threshold, 3);
    }

    #[test]
    fn test_save_and_reload() {
        let path = scratch_path();
        let mut config = EngineConfig::default();
        config.engine.default_country_iso = "CA".to_string();
        config.logging.json = true;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[engine]"));
        let reloaded = EngineConfig::from_toml(&contents).unwrap();
        assert_eq!(reloaded, config);

        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).unwrap();
        }
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = EngineConfig::load(Some(scratch_path())).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_file_requires_the_file() {
        let err = EngineConfig::load_file(&scratch_path()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = scratch_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[engine\nbroken").unwrap();

        assert!(matches!(
            EngineConfig::load(Some(path.clone())),
            Err(ConfigError::TomlParse(_))
        ));
        assert!(matches!(
            EngineConfig::load_file(&path),
            Err(ConfigError::TomlParse(_))
        ));

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
