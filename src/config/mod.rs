//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `SOP_PORTAL_` prefix and nested values use underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use sop_portal::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr());
//! ```

mod error;
mod server;
mod sync;

pub use error::{ConfigError, ValidationError};
pub use server::ServerConfig;
pub use sync::SyncConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, log level)
    #[serde(default)]
    pub server: ServerConfig,

    /// Sync core configuration (cache TTL, refresh interval, keep-alive)
    #[serde(default)]
    pub sync: SyncConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored when present. Variables use the
    /// `SOP_PORTAL_` prefix, e.g. `SOP_PORTAL_SERVER_PORT=9090` or
    /// `SOP_PORTAL_SYNC_CACHE_TTL_SECS=120`.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("SOP_PORTAL")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Validate all configuration sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.sync.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }
}
