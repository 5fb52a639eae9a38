//! Geocoding API response types and status handling.

use kind_core::Coordinates;
use serde::Deserialize;

use super::GeocodeError;

/// Raw response from `GET /geocode/json`.
#[derive(Debug, Deserialize)]
pub struct GoogleApiResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: String,
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for Coordinates {
    fn from(loc: LatLng) -> Self {
        Coordinates { lat: loc.lat, lng: loc.lng }
    }
}

impl GoogleApiResponse {
    /// Candidate coordinates in the order the API ranked them.
    ///
    /// `ZERO_RESULTS` is a successful lookup with no candidates.
    pub fn into_candidates(self) -> Result<Vec<Coordinates>, GeocodeError> {
        let message = || self.error_message.clone().unwrap_or_else(|| self.status.clone());

        match self.status.as_str() {
            "OK" => Ok(self.results.into_iter().map(|r| r.geometry.location.into()).collect()),
            "ZERO_RESULTS" => Ok(Vec::new()),
            "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => Err(GeocodeError::RateLimited(message())),
            "REQUEST_DENIED" => Err(GeocodeError::AuthError(message())),
            _ => Err(GeocodeError::ApiStatus { status: self.status.clone(), message: self.error_message.clone() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GoogleApiResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_ok_response() {
        let raw = parse(
            r#"{
                "results": [
                    {
                        "formatted_address": "대한민국 서울특별시 중구 세종대로 110",
                        "geometry": {
                            "location": { "lat": 37.5662952, "lng": 126.9779451 },
                            "location_type": "ROOFTOP"
                        },
                        "place_id": "ChIJzWXFYYuifDUR64Pq5LTtioU"
                    },
                    {
                        "formatted_address": "대한민국 서울특별시",
                        "geometry": { "location": { "lat": 37.5665, "lng": 126.978 } }
                    }
                ],
                "status": "OK"
            }"#,
        );

        let candidates = raw.into_candidates().unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0], Coordinates { lat: 37.5662952, lng: 126.9779451 });
    }

    #[test]
    fn test_zero_results() {
        let raw = parse(r#"{ "results": [], "status": "ZERO_RESULTS" }"#);
        assert!(raw.into_candidates().unwrap().is_empty());
    }

    #[test]
    fn test_request_denied() {
        let raw = parse(
            r#"{ "error_message": "The provided API key is invalid.", "results": [], "status": "REQUEST_DENIED" }"#,
        );
        match raw.into_candidates() {
            Err(GeocodeError::AuthError(msg)) => assert!(msg.contains("invalid")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_over_query_limit() {
        let raw = parse(r#"{ "results": [], "status": "OVER_QUERY_LIMIT" }"#);
        match raw.into_candidates() {
            Err(GeocodeError::RateLimited(msg)) => assert_eq!(msg, "OVER_QUERY_LIMIT"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_status() {
        let raw = parse(r#"{ "status": "INVALID_REQUEST" }"#);
        assert!(matches!(
            raw.into_candidates(),
            Err(GeocodeError::ApiStatus { ref status, .. }) if status == "INVALID_REQUEST"
        ));
    }
}
