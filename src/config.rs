//! Runtime configuration
//!
//! Read from the process environment after `.env` has been loaded. The
//! gateway key falls back to the OS keychain.

use crate::ai::credentials::{CredentialManager, GATEWAY_PROVIDER};
use crate::ai::http_client::DEFAULT_TIMEOUT_SECS;
use crate::generation::types::Language;
use thiserror::Error;

pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev";
pub const DEFAULT_MODEL: &str = "google/gemini-3-flash-preview";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} is not set")]
    Missing { var: &'static str },

    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Settings for both generation backends
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Hosted analyze endpoint
    pub endpoint_url: Option<String>,
    pub endpoint_key: Option<String>,
    pub gateway_url: String,
    pub gateway_key: Option<String>,
    pub model: String,
    pub language: Language,
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(
            |var| std::env::var(var).ok(),
            || CredentialManager::get_api_key(GATEWAY_PROVIDER).ok(),
        )
    }

    /// Build from an arbitrary variable source; `keychain` is consulted last for the gateway key
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        keychain: impl FnOnce() -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let language = match get("DECKGEN_LANGUAGE") {
            Some(raw) => raw.parse::<Language>().map_err(|e| ConfigError::Invalid {
                var: "DECKGEN_LANGUAGE",
                message: e.to_string(),
            })?,
            None => Language::default(),
        };

        let timeout_secs = match get("DECKGEN_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "DECKGEN_TIMEOUT_SECS",
                        message: format!("expected a positive number of seconds, got '{}'", raw),
                    })
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let gateway_key = get("AI_GATEWAY_API_KEY")
            .or_else(|| get("LOVABLE_API_KEY"))
            .or_else(keychain);

        Ok(Self {
            endpoint_url: get("DECKGEN_ENDPOINT_URL"),
            endpoint_key: get("DECKGEN_ENDPOINT_KEY"),
            gateway_url: get("AI_GATEWAY_URL").unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string()),
            gateway_key,
            model: get("AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            language,
            timeout_secs,
        })
    }

    pub fn require_endpoint_url(&self) -> Result<&str, ConfigError> {
        self.endpoint_url.as_deref().ok_or(ConfigError::Missing {
            var: "DECKGEN_ENDPOINT_URL",
        })
    }

    pub fn require_gateway_key(&self) -> Result<&str, ConfigError> {
        self.gateway_key.as_deref().ok_or(ConfigError::Missing {
            var: "AI_GATEWAY_API_KEY",
        })
    }
}
