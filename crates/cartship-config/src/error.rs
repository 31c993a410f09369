//! # Config Error Types
//!
//! Error types for settings, catalog and cart file handling.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Config Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   File access   │  │    Parsing      │  │     Semantics           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Io             │  │  TomlParse      │  │  InvalidConfig          │ │
//! │  │                 │  │  TomlSerialize  │  │  Catalog (snapshot      │ │
//! │  │                 │  │  Json           │  │    invariant violated)  │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use cartship_core::ValidationError;
use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failures while loading or saving configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML document is malformed or has the wrong shape.
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Settings could not be written back as TOML.
    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON document (cart file) is malformed.
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings parsed but are not usable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Catalog violates a snapshot invariant (duplicate override, bad fee...).
    #[error("Invalid catalog: {0}")]
    Catalog(#[from] ValidationError),
}

impl ConfigError {
    /// Returns true if the file simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::Io(err) if err.kind() == std::io::ErrorKind::NotFound)
    }
}
