//! Bot API configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Bot API configuration
#[derive(Debug, Deserialize)]
pub struct BotConfig {
    /// Bot token issued by the platform
    pub token: Secret<String>,

    /// Base URL of the Bot API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// How long one `getUpdates` call may wait, in seconds
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,

    /// Timeout of ordinary API calls, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl BotConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate bot configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let token = self.token.expose_secret();
        if token.is_empty() {
            return Err(ValidationError::MissingRequired("BOT__TOKEN"));
        }
        match token.split_once(':') {
            Some((id, secret)) if !id.is_empty() && !secret.is_empty() => {}
            _ => return Err(ValidationError::InvalidBotToken),
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidApiBaseUrl);
        }
        if self.poll_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout("poll"));
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout("request"));
        }
        Ok(())
    }
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    15
}
