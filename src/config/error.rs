//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Cache TTL must be greater than zero")]
    InvalidCacheTtl,

    #[error("Cache refresh interval must be greater than zero")]
    InvalidRefreshInterval,

    #[error("Keep-alive interval must be between 1 and 60000 milliseconds")]
    InvalidKeepAliveInterval,
}
