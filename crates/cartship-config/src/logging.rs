//! # Logging Setup
//!
//! Installs the global `tracing` subscriber for a host process. Library code
//! in cartship-core only emits events.
//!
//! ```text
//! RUST_LOG set? ──yes──► EnvFilter from RUST_LOG
//!      │
//!      no
//!      ▼
//! LoggingSettings.filter ──parses?──yes──► EnvFilter from settings
//!                              │
//!                              no ──► DEFAULT_LOG_FILTER
//! ```

use tracing_subscriber::EnvFilter;

use crate::settings::LoggingSettings;
use crate::DEFAULT_LOG_FILTER;

/// Builds the filter for the given settings.
pub fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs the global subscriber, writing to stderr.
///
/// Returns false if a subscriber was already installed (tests, embedding
/// hosts); the existing one is kept.
pub fn init_tracing(settings: &LoggingSettings) -> bool {
    let filter = env_filter(settings);

    let installed = if settings.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    };

    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_filter_falls_back() {
        let settings = LoggingSettings {
            filter: "cartship=loud".to_string(),
            json: false,
        };
        // must not panic
        let _ = env_filter(&settings);
    }

    #[test]
    fn test_second_init_is_harmless() {
        let settings = LoggingSettings::default();
        let _ = init_tracing(&settings);
        assert!(!init_tracing(&settings));
    }
}
