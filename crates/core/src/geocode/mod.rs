//! Address geocoding with a local 30-day cache.
//!
//! Resolutions are stored in a single map keyed by the exact address text:
//!
//! ```json
//! { "서울 강남구 ...": { "lat": 37.5, "lng": 127.0, "timestamp": 1700000000000 } }
//! ```
//!
//! An entry is trusted while `now - timestamp <= 30 days`. Older entries
//! read as misses and stay in place until a fresh resolution overwrites them
//! or [`GeocodeCache::purge_expired`] runs. The map is loaded and saved as a
//! unit on every access (last writer wins).
//!
//! Lookups never fail: geocoder errors, empty candidate lists and storage
//! trouble all degrade to "no coordinates".

pub mod batch;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Duration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Storage};

pub use batch::{DEFAULT_BATCH_DELAY, DEFAULT_LOCATE_LIMIT, MapMarker, UNKNOWN_ADDRESS};

/// Storage key for the address map.
pub const CACHE_KEY: &str = "geocode_cache";

/// How long a cached resolution is trusted.
pub const CACHE_EXPIRY_DAYS: i64 = 30;

/// Fallback map center (Seoul City Hall).
pub const DEFAULT_CENTER: Coordinates = Coordinates { lat: 37.5665, lng: 126.9780 };

pub const DEFAULT_ZOOM: u8 = 11;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A cached resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub lat: f64,
    pub lng: f64,
    /// Epoch milliseconds of the resolution.
    pub timestamp: i64,
}

impl CacheEntry {
    fn coordinates(&self) -> Coordinates {
        Coordinates { lat: self.lat, lng: self.lng }
    }

    fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms.checked_sub(self.timestamp).is_some_and(|age| age <= expiry_ms())
    }

    /// Decode one stored entry; anything malformed reads as absent.
    fn decode(raw: &Value) -> Option<Self> {
        serde_json::from_value(raw.clone()).ok()
    }
}

/// Stored map with entries kept undecoded, so one malformed entry never
/// costs its siblings.
type CacheMap = HashMap<String, Value>;

fn expiry_ms() -> i64 {
    Duration::days(CACHE_EXPIRY_DAYS).num_milliseconds()
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// External address resolver.
///
/// Returns zero or more candidates; only the first one is used.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Vec<Coordinates>, Error>;
}

/// Cache-first address resolver.
#[derive(Debug, Clone)]
pub struct GeocodeCache {
    storage: Storage,
}

impl GeocodeCache {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Fresh cached coordinates for `address`, if any.
    pub async fn cached(&self, address: &str) -> Option<Coordinates> {
        let cache = self.load().await;
        let entry = CacheEntry::decode(cache.get(address)?)?;
        entry.is_fresh(now_ms()).then(|| entry.coordinates())
    }

    /// Resolve one address, consulting the cache first.
    ///
    /// On a miss the geocoder is called with the raw address and the first
    /// candidate is cached under that same text. Returns `None` when the
    /// geocoder fails or finds nothing; nothing is cached in that case.
    pub async fn resolve_one(&self, address: &str, geocoder: &dyn Geocoder) -> Option<Coordinates> {
        self.resolve_traced(address, geocoder).await.0
    }

    /// Like [`resolve_one`](Self::resolve_one), also reporting whether the
    /// answer came from the cache.
    pub(crate) async fn resolve_traced(&self, address: &str, geocoder: &dyn Geocoder) -> (Option<Coordinates>, bool) {
        if let Some(coords) = self.cached(address).await {
            tracing::debug!(address, "geocode cache hit");
            return (Some(coords), true);
        }

        let candidates = match geocoder.geocode(address).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(address, error = %e, "geocode failed");
                return (None, false);
            }
        };

        let Some(coords) = candidates.first().copied() else {
            tracing::debug!(address, "geocode returned no candidates");
            return (None, false);
        };

        self.store(address, coords).await;
        tracing::debug!(address, lat = coords.lat, lng = coords.lng, "geocode resolved");
        (Some(coords), false)
    }

    /// Delete entries older than the expiry window.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_expired(&self) -> Result<u64, Error> {
        let mut cache = self.load().await;
        let before = cache.len();
        let now = now_ms();
        // undecodable entries have no known age and stay
        cache.retain(|_, raw| CacheEntry::decode(raw).is_none_or(|entry| entry.is_fresh(now)));

        let deleted = (before - cache.len()) as u64;
        if deleted > 0 {
            self.storage.write(CACHE_KEY, &cache).await?;
        }
        Ok(deleted)
    }

    /// Drop every cached resolution.
    pub async fn clear(&self) -> Result<(), Error> {
        self.storage.remove(CACHE_KEY).await
    }

    async fn load(&self) -> CacheMap {
        self.storage.read(CACHE_KEY, CacheMap::new()).await
    }

    async fn store(&self, address: &str, coords: Coordinates) {
        let mut cache = self.load().await;
        let entry = CacheEntry { lat: coords.lat, lng: coords.lng, timestamp: now_ms() };
        match serde_json::to_value(entry) {
            Ok(raw) => {
                cache.insert(address.to_string(), raw);
                self.storage.write_best_effort(CACHE_KEY, &cache).await;
            }
            Err(e) => tracing::warn!(address, error = %e, "failed to encode geocode entry"),
        }
    }
}
