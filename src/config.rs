// Connector configuration, read once at startup and shared read-only

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use reqwest::Url;
use serde::Deserialize;

use crate::error::{GatewayError, GatewayResult};

pub const CONFIG_FILE: &str = "atal-gateway.toml";
pub const ENV_PREFIX: &str = "ATAL_";

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorConfig {
    // Left empty when unset; reported on the first call that needs them.
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default)]
    pub slots: SlotConfig,
}

/// Opening hours used when generating hour slots.
///
/// Hours `first_hour..last_hour` are enumerated, each slot covering
/// `HH:00` to `HH:59`. A requested window may span at most
/// `max_window_days` days after its first one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    pub first_hour: u32,
    pub last_hour: u32,
    pub max_window_days: i64,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            first_hour: 8,
            last_hour: 18,
            max_window_days: 366,
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            listen_addr: default_listen_addr(),
            slots: SlotConfig::default(),
        }
    }
}

impl ConnectorConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Loads `atal-gateway.toml`, overridden by `ATAL_*` environment variables.
    pub fn load() -> GatewayResult<Self> {
        Self::figment()
            .extract()
            .map_err(|e| GatewayError::Configuration(e.to_string()))
    }

    pub fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    // Resolves an ATAL path against the base URL
    pub fn endpoint(&self, path: &str) -> GatewayResult<Url> {
        if self.base_url.trim().is_empty() {
            return Err(GatewayError::Configuration(
                "ATAL base URL is not set".to_string(),
            ));
        }
        let base = Url::parse(&self.base_url).map_err(|e| {
            GatewayError::Configuration(format!("invalid ATAL base URL {}: {}", self.base_url, e))
        })?;
        base.join(path).map_err(|e| {
            GatewayError::Configuration(format!("cannot join {} onto {}: {}", path, base, e))
        })
    }

    pub fn api_key(&self) -> GatewayResult<&str> {
        if self.api_key.trim().is_empty() {
            return Err(GatewayError::Configuration(
                "ATAL API key is not set".to_string(),
            ));
        }
        Ok(&self.api_key)
    }
}
