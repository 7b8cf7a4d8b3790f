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
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Bot token must look like <id>:<secret>")]
    InvalidBotToken,

    #[error("Invalid API base URL")]
    InvalidApiBaseUrl,

    #[error("Invalid {0} timeout")]
    InvalidTimeout(&'static str),

    #[error("Invalid admin id: {0}")]
    InvalidAdminId(String),

    #[error("Draft TTL must be positive")]
    InvalidDraftTtl,

    #[error("Sweep interval must be positive")]
    InvalidSweepInterval,
}
