//! Google Geocoding API client.
//!
//! ### Specification
//!
//! - **Endpoint**: `https://maps.googleapis.com/maps/api/geocode/json`
//! - **Authentication**: `key` query parameter.
//! - **Bias**: `language=ko` and `region=kr` unless configured otherwise.
//! - **Statuses**: `OK` yields candidates, `ZERO_RESULTS` an empty list,
//!   `OVER_QUERY_LIMIT` and `REQUEST_DENIED` map to dedicated errors.
//!
//! Pacing between lookups is the caller's job; the batch resolver in core
//! sleeps after every attempt.

pub mod error;
pub mod request;
pub mod response;

pub use error::GeocodeError;
pub use request::GeocodeRequest;
pub use response::GoogleApiResponse;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use kind_core::{AppConfig, Coordinates, Geocoder};
use reqwest::header;
use url::Url;

/// Default base URL for the Maps web services.
const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "kind/0.1";

/// Google geocoder configuration.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub api_key: String,
    /// Base URL (default: https://maps.googleapis.com/maps/api).
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub language: String,
    pub region: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            language: "ko".to_string(),
            region: "kr".to_string(),
        }
    }
}

impl GoogleConfig {
    /// Build from the application config. Fails if no API key is configured.
    pub fn from_app(config: &AppConfig) -> Result<Self, GeocodeError> {
        let api_key = config
            .require_google_maps_api_key()
            .map_err(|_| GeocodeError::MissingApiKey)?;

        Ok(Self {
            api_key: api_key.to_string(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
            language: config.geocode_language.clone(),
            region: config.geocode_region.clone(),
            ..Default::default()
        })
    }

    /// `{base_url}/geocode/json`, tolerant of a trailing slash on the base.
    pub fn endpoint(&self) -> Result<Url, GeocodeError> {
        let base = format!("{}/", self.base_url.trim_end_matches('/'));
        Url::parse(&base)
            .and_then(|url| url.join("geocode/json"))
            .map_err(|e| GeocodeError::InvalidUrl(format!("{}: {e}", self.base_url)))
    }
}

/// Google Geocoding API client.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    http: reqwest::Client,
    config: GoogleConfig,
    endpoint: Url,
}

impl GoogleGeocoder {
    pub fn new(config: GoogleConfig) -> Result<Self, GeocodeError> {
        if config.api_key.trim().is_empty() {
            return Err(GeocodeError::MissingApiKey);
        }

        let endpoint = config.endpoint()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GeocodeError::Network(Arc::new(e)))?;

        Ok(Self { http, config, endpoint })
    }

    pub fn from_app(config: &AppConfig) -> Result<Self, GeocodeError> {
        Self::new(GoogleConfig::from_app(config)?)
    }

    /// Resolve one address to its ranked candidates.
    pub async fn lookup(&self, address: &str) -> Result<Vec<Coordinates>, GeocodeError> {
        let req = GeocodeRequest {
            address,
            key: &self.config.api_key,
            language: &self.config.language,
            region: &self.config.region,
        };
        req.validate()?;

        let start = Instant::now();
        tracing::debug!(address, "geocoding via Google");

        let http_response = self
            .http
            .get(self.endpoint.clone())
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.config.user_agent)
            .query(&req)
            .send()
            .await?;

        let status = http_response.status();
        if status == 401 || status == 403 {
            return Err(GeocodeError::AuthError(format!("HTTP {}", status.as_u16())));
        }

        if status == 429 {
            return Err(GeocodeError::RateLimited(format!("HTTP {}", status.as_u16())));
        }

        if status.is_client_error() || status.is_server_error() {
            return Err(GeocodeError::HttpError { status: status.as_u16() });
        }

        let bytes = http_response.bytes().await?;
        let api_response: GoogleApiResponse =
            serde_json::from_slice(&bytes).map_err(|e| GeocodeError::Parse(e.to_string()))?;

        tracing::debug!(status = %api_response.status, elapsed = ?start.elapsed(), "geocode response");

        api_response.into_candidates()
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<Vec<Coordinates>, kind_core::Error> {
        self.lookup(address).await.map_err(Into::into)
    }
}
