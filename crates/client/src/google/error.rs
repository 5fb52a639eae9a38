//! Google Geocoding client error types.

use std::sync::Arc;

/// Errors from the Google Geocoding API client.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// Missing KIND_GOOGLE_MAPS_API_KEY.
    #[error("missing API key: KIND_GOOGLE_MAPS_API_KEY not set")]
    MissingApiKey,

    /// Blank or oversized address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Base URL could not be parsed.
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    /// Key rejected (`REQUEST_DENIED`).
    #[error("authentication failed: {0}")]
    AuthError(String),

    /// Quota exceeded (`OVER_QUERY_LIMIT` or HTTP 429).
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Any other non-OK API status.
    #[error("geocoding failed: {status}")]
    ApiStatus { status: String, message: Option<String> },

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { GeocodeError::Timeout } else { GeocodeError::Network(Arc::new(err)) }
    }
}

impl From<GeocodeError> for kind_core::Error {
    fn from(err: GeocodeError) -> Self {
        use kind_core::Error;

        match err {
            GeocodeError::MissingApiKey | GeocodeError::AuthError(_) => Error::GeocodeAuthError(err.to_string()),
            GeocodeError::RateLimited(_) => Error::GeocodeRateLimited(err.to_string()),
            GeocodeError::InvalidAddress(msg) => Error::InvalidInput(msg),
            GeocodeError::HttpError { .. } | GeocodeError::Timeout | GeocodeError::Network(_) => {
                Error::HttpError(err.to_string())
            }
            GeocodeError::InvalidUrl(_) | GeocodeError::ApiStatus { .. } | GeocodeError::Parse(_) => {
                Error::GeocodeFailed(err.to_string())
            }
        }
    }
}
