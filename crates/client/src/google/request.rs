//! Geocoding API request parameters and validation.

use serde::Serialize;

use super::GeocodeError;

/// Longest address accepted, in characters.
pub const MAX_ADDRESS_CHARS: usize = 512;

/// Query parameters for `GET /geocode/json`.
///
/// https://developers.google.com/maps/documentation/geocoding/requests-geocoding
#[derive(Debug, Clone, Serialize)]
pub struct GeocodeRequest<'a> {
    /// Street address or place text, as the user typed it.
    pub address: &'a str,

    /// API key.
    pub key: &'a str,

    /// Result language (e.g., "ko").
    #[serde(skip_serializing_if = "is_unset")]
    pub language: &'a str,

    /// Region bias as a ccTLD (e.g., "kr").
    #[serde(skip_serializing_if = "is_unset")]
    pub region: &'a str,
}

fn is_unset(value: &&str) -> bool {
    value.is_empty()
}

impl GeocodeRequest<'_> {
    pub fn validate(&self) -> Result<(), GeocodeError> {
        if self.address.trim().is_empty() {
            return Err(GeocodeError::InvalidAddress("address cannot be empty".to_string()));
        }

        let chars = self.address.chars().count();
        if chars > MAX_ADDRESS_CHARS {
            return Err(GeocodeError::InvalidAddress(format!(
                "address too long: {chars} chars (max {MAX_ADDRESS_CHARS})"
            )));
        }

        if self.key.is_empty() {
            return Err(GeocodeError::MissingApiKey);
        }

        Ok(())
    }
}
