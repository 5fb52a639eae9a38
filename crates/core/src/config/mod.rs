//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (KIND_*)
//! 2. TOML config file (if KIND_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (KIND_*)
/// 2. TOML config file (if KIND_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Google Maps Platform key for the Geocoding API.
    ///
    /// Set via KIND_GOOGLE_MAPS_API_KEY environment variable.
    /// Required only when an address has to be resolved remotely.
    #[serde(default)]
    pub google_maps_api_key: Option<String>,

    /// Path to the SQLite key-value store.
    ///
    /// Set via KIND_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via KIND_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via KIND_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// How many listings can be compared side by side.
    ///
    /// Set via KIND_COMPARE_MAX environment variable.
    #[serde(default = "default_compare_max")]
    pub compare_max: usize,

    /// Pause between sequential geocoding lookups in milliseconds.
    ///
    /// Set via KIND_GEOCODE_DELAY_MS environment variable.
    #[serde(default = "default_geocode_delay_ms")]
    pub geocode_delay_ms: u64,

    /// Language for geocoding results.
    ///
    /// Set via KIND_GEOCODE_LANGUAGE environment variable.
    #[serde(default = "default_geocode_language")]
    pub geocode_language: String,

    /// Region bias (ccTLD) for geocoding results.
    ///
    /// Set via KIND_GEOCODE_REGION environment variable.
    #[serde(default = "default_geocode_region")]
    pub geocode_region: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./kind-store.sqlite")
}

fn default_user_agent() -> String {
    "kind/0.1".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_compare_max() -> usize {
    crate::compare::DEFAULT_MAX
}

fn default_geocode_delay_ms() -> u64 {
    200
}

fn default_geocode_language() -> String {
    "ko".into()
}

fn default_geocode_region() -> String {
    "kr".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            google_maps_api_key: None,
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            compare_max: default_compare_max(),
            geocode_delay_ms: default_geocode_delay_ms(),
            geocode_language: default_geocode_language(),
            geocode_region: default_geocode_region(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Batch geocoding delay as Duration.
    pub fn geocode_delay(&self) -> Duration {
        Duration::from_millis(self.geocode_delay_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `KIND_`
    /// 2. TOML file from `KIND_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("KIND_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("KIND_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check if the Google Maps key is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set.
    pub fn require_google_maps_api_key(&self) -> Result<&str, ConfigError> {
        self.google_maps_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "google_maps_api_key".into(),
                hint: "Set KIND_GOOGLE_MAPS_API_KEY environment variable".into(),
            })
    }
}
