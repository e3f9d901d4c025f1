use std::{env, time::Duration};

use secrecy::SecretString;
use thiserror::Error;
use tracing::{info, warn};

const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for the image generation service
#[derive(Debug)]
pub struct GatewayConfig {
    /// Service credential; edits fail without one
    pub api_key: Option<SecretString>,
    pub model: String,
    pub base_url: String,
    /// Whole-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Config {
    pub gateway: GatewayConfig,
}

impl Config {
    /// Load from process environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from any key/value source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = ["GEMINI_API_KEY", "API_KEY"]
            .into_iter()
            .find_map(|key| lookup(key).filter(|value| !value.trim().is_empty()))
            .map(|value| SecretString::from(value.trim().to_string()));
        if api_key.is_none() {
            warn!("GEMINI_API_KEY not set, AI image editing will fail");
        }

        let model = or_default(&lookup, "GEMINI_MODEL", DEFAULT_MODEL);
        let base_url = or_default(&lookup, "GEMINI_BASE_URL", DEFAULT_BASE_URL);

        let timeout = match lookup("EDIT_TIMEOUT_SECS") {
            Some(value) => Some(parse_timeout(&value)?),
            None => None,
        };

        Ok(Self {
            gateway: GatewayConfig {
                api_key,
                model,
                base_url,
                timeout,
            },
        })
    }
}

fn or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: "EDIT_TIMEOUT_SECS",
        value: value.to_string(),
        reason,
    };

    let seconds: u64 = value.trim().parse().map_err(|e| invalid(format!("{e}")))?;
    if seconds == 0 {
        return Err(invalid("must be greater than zero".to_string()));
    }
    Ok(Duration::from_secs(seconds))
}
