//! Sync core configuration: cache TTL, background refresh, keep-alive.

use std::time::Duration;

use serde::Deserialize;

use super::error::ValidationError;

/// Configuration for the cache and streaming behavior of the sync core.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Cache entry time-to-live in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Background cache refresh interval in seconds
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Heartbeat interval for streaming responses in milliseconds
    #[serde(default = "default_keep_alive_interval_ms")]
    pub keep_alive_interval_ms: u64,
}

impl SyncConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_millis(self.keep_alive_interval_ms)
    }

    /// Validate sync configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.cache_ttl_secs == 0 {
            return Err(ValidationError::InvalidCacheTtl);
        }
        if self.refresh_interval_secs == 0 {
            return Err(ValidationError::InvalidRefreshInterval);
        }
        if self.keep_alive_interval_ms == 0 || self.keep_alive_interval_ms > 60_000 {
            return Err(ValidationError::InvalidKeepAliveInterval);
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            keep_alive_interval_ms: default_keep_alive_interval_ms(),
        }
    }
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_refresh_interval_secs() -> u64 {
    300
}

fn default_keep_alive_interval_ms() -> u64 {
    15_000
}
