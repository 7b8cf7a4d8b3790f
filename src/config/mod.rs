//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `CARBANK` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use carbank_desk::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Reference data in {}", config.storage.data_dir.display());
//! ```

mod bot;
mod error;
mod moderation;
mod runtime;
mod storage;

pub use bot::BotConfig;
pub use error::{ConfigError, ValidationError};
pub use moderation::ModerationConfig;
pub use runtime::{Environment, LogFormat, RuntimeConfig};
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Bot API access
    pub bot: BotConfig,

    /// Moderators, channels and public contact
    #[serde(default)]
    pub moderation: ModerationConfig,

    /// Reference data location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging, environment and draft lifetime
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CARBANK` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CARBANK__BOT__TOKEN=123:abc` -> `bot.token = 123:abc`
    /// - `CARBANK__MODERATION__ADMIN_IDS=1,2` -> `moderation.admin_ids = "1,2"`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CARBANK")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.bot.validate()?;
        self.moderation.validate()?;
        self.runtime.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.runtime.is_production()
    }
}
