//! Unified error types for kind.
//!
//! Every variant carries a stable code prefix so tool callers can branch on
//! the message without parsing free text.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the kind stores and tools.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., an empty address list).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The comparison selection is full.
    #[error("COMPARE_MAX: at most {max} items can be compared")]
    CapacityReached { max: usize },

    /// Database operation failed.
    #[error("STORAGE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORAGE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A value could not be encoded or decoded as JSON.
    #[error("STORAGE_ERROR: serialization failed: {0}")]
    Serialization(String),

    /// The storage backend is unavailable or over quota.
    #[error("STORAGE_UNAVAILABLE: {0}")]
    StorageUnavailable(String),

    /// The geocoding service rejected or failed the lookup.
    #[error("GEOCODE_FAILED: {0}")]
    GeocodeFailed(String),

    /// Geocoding API authentication error.
    #[error("GEOCODE_AUTH_ERROR: {0}")]
    GeocodeAuthError(String),

    /// Geocoding API rate limited.
    #[error("GEOCODE_RATE_LIMITED: {0}")]
    GeocodeRateLimited(String),

    /// HTTP error response.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::CapacityReached { .. } => (-32001, err.to_string()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::Serialization(msg) => (-32002, msg.clone()),
            Error::StorageUnavailable(msg) => (-32002, msg.clone()),
            Error::GeocodeFailed(msg) => (-32004, msg.clone()),
            Error::GeocodeAuthError(msg) => (-32005, msg.clone()),
            Error::GeocodeRateLimited(msg) => (-32006, msg.clone()),
            Error::HttpError(msg) => (-32008, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
