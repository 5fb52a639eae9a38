//! Sequential batch resolution.
//!
//! Addresses are resolved one at a time with a fixed pause after every
//! attempt, cache hits included, so a batch never bursts past the external
//! service's quota. A failed address is skipped and the batch continues.

use std::collections::HashMap;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Coordinates, GeocodeCache, Geocoder};
use crate::listing::{ServiceItem, ServiceType};

/// Pause between lookups when the caller has no preference.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(200);

/// How many listings are placed on the map per pass.
pub const DEFAULT_LOCATE_LIMIT: usize = 20;

/// Placeholder the public-data feeds use for a missing address.
pub const UNKNOWN_ADDRESS: &str = "주소 미상";

/// How one batch entry was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum BatchItemStatus {
    /// Answered from the local cache.
    Cached,
    /// Resolved by the geocoder and cached.
    Resolved,
    /// No coordinates available.
    Failed,
}

/// Result for one input address, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BatchItem {
    pub address: String,
    pub status: BatchItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// A listing placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MapMarker {
    pub id: String,
    pub position: Coordinates,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ServiceType,
    pub description: String,
}

impl MapMarker {
    fn for_item(item: &ServiceItem, position: Coordinates) -> Self {
        Self {
            id: item.id.clone(),
            position,
            title: item.title.clone(),
            kind: item.service_type.unwrap_or_default(),
            description: item.location.clone(),
        }
    }
}

impl GeocodeCache {
    /// Resolve every address in order, pausing `delay` after each attempt.
    ///
    /// The result maps each resolved address to its coordinates; addresses
    /// that could not be resolved are absent.
    pub async fn resolve_batch<S: AsRef<str>>(
        &self, addresses: &[S], geocoder: &dyn Geocoder, delay: Duration,
    ) -> HashMap<String, Coordinates> {
        self.resolve_batch_detailed(addresses, geocoder, delay)
            .await
            .into_iter()
            .filter_map(|item| item.coordinates.map(|coords| (item.address, coords)))
            .collect()
    }

    /// Same traversal as [`resolve_batch`](Self::resolve_batch), reporting
    /// one entry per input address.
    pub async fn resolve_batch_detailed<S: AsRef<str>>(
        &self, addresses: &[S], geocoder: &dyn Geocoder, delay: Duration,
    ) -> Vec<BatchItem> {
        let mut items = Vec::with_capacity(addresses.len());

        for address in addresses {
            let address = address.as_ref();
            let (coordinates, from_cache) = self.resolve_traced(address, geocoder).await;
            let status = match (coordinates, from_cache) {
                (Some(_), true) => BatchItemStatus::Cached,
                (Some(_), false) => BatchItemStatus::Resolved,
                (None, _) => BatchItemStatus::Failed,
            };
            items.push(BatchItem { address: address.to_string(), status, coordinates });

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        tracing::debug!(
            total = items.len(),
            failed = items.iter().filter(|i| i.status == BatchItemStatus::Failed).count(),
            "batch geocode finished"
        );
        items
    }

    /// Place up to `limit` listings on the map.
    ///
    /// Listings that already carry coordinates are used as-is. Others are
    /// geocoded by their location unless it is blank or [`UNKNOWN_ADDRESS`].
    /// Markers keep the listing order; unresolvable listings are left out.
    pub async fn locate_listings(
        &self, items: &[ServiceItem], geocoder: &dyn Geocoder, limit: usize, delay: Duration,
    ) -> Vec<MapMarker> {
        let mut markers = Vec::new();

        for item in items.iter().take(limit) {
            if let Some(position) = item.coordinates {
                markers.push(MapMarker::for_item(item, position));
                continue;
            }

            let location = item.location.trim();
            if !location.is_empty()
                && location != UNKNOWN_ADDRESS
                && let Some(position) = self.resolve_one(&item.location, geocoder).await
            {
                markers.push(MapMarker::for_item(item, position));
            }

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        markers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Storage;
    use crate::geocode::testing::FakeGeocoder;

    fn geocoder() -> FakeGeocoder {
        FakeGeocoder::default()
            .with("A", 1.0, 1.0)
            .failing_on("B")
            .with("C", 3.0, 3.0)
    }

    #[tokio::test]
    async fn test_batch_keeps_only_successes() {
        let cache = GeocodeCache::new(Storage::in_memory());
        let geocoder = geocoder();

        let results = cache.resolve_batch(&["A", "B", "C"], &geocoder, Duration::ZERO).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results["A"], Coordinates { lat: 1.0, lng: 1.0 });
        assert_eq!(results["C"], Coordinates { lat: 3.0, lng: 3.0 });
        assert!(!results.contains_key("B"));
        assert_eq!(geocoder.calls(), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_batch_duplicates_hit_cache() {
        let cache = GeocodeCache::new(Storage::in_memory());
        let geocoder = geocoder();

        let items = cache
            .resolve_batch_detailed(&["A", "A", "B"], &geocoder, Duration::ZERO)
            .await;

        let statuses: Vec<_> = items.iter().map(|i| i.status).collect();
        assert_eq!(statuses, vec![BatchItemStatus::Resolved, BatchItemStatus::Cached, BatchItemStatus::Failed]);
        assert_eq!(geocoder.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_delays_after_every_attempt() {
        let cache = GeocodeCache::new(Storage::in_memory());
        let geocoder = geocoder();
        cache.resolve_one("A", &geocoder).await;

        let start = tokio::time::Instant::now();
        cache
            .resolve_batch(&["A", "B", "C"], &geocoder, Duration::from_millis(200))
            .await;

        assert!(start.elapsed() >= Duration::from_millis(600));
    }

    #[tokio::test]
    async fn test_batch_empty_input() {
        let cache = GeocodeCache::new(Storage::in_memory());
        let empty: [&str; 0] = [];
        assert!(cache.resolve_batch(&empty, &geocoder(), Duration::ZERO).await.is_empty());
    }

    #[tokio::test]
    async fn test_locate_listings() {
        let cache = GeocodeCache::new(Storage::in_memory());
        let geocoder = FakeGeocoder::default().with("서울 강남구", 37.51, 127.04);

        let mut known = ServiceItem::new("1", "known").with_location("부산");
        known.coordinates = Some(Coordinates { lat: 35.1, lng: 129.0 });
        known.service_type = Some(ServiceType::Cremation);

        let items = vec![
            known,
            ServiceItem::new("2", "gangnam").with_location("서울 강남구"),
            ServiceItem::new("3", "unknown").with_location(UNKNOWN_ADDRESS),
            ServiceItem::new("4", "blank"),
            ServiceItem::new("5", "unresolvable").with_location("어딘가"),
        ];

        let markers = cache.locate_listings(&items, &geocoder, DEFAULT_LOCATE_LIMIT, Duration::ZERO).await;

        let ids: Vec<_> = markers.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(markers[0].kind, ServiceType::Cremation);
        assert_eq!(markers[1].kind, ServiceType::Funeral);
        assert_eq!(markers[1].description, "서울 강남구");
        assert_eq!(geocoder.calls(), vec!["서울 강남구", "어딘가"]);
    }

    #[tokio::test]
    async fn test_locate_listings_respects_limit() {
        let cache = GeocodeCache::new(Storage::in_memory());
        let geocoder = FakeGeocoder::default().with("A", 1.0, 1.0).with("B", 2.0, 2.0);
        let items = vec![
            ServiceItem::new("1", "a").with_location("A"),
            ServiceItem::new("2", "b").with_location("B"),
        ];

        let markers = cache.locate_listings(&items, &geocoder, 1, Duration::ZERO).await;
        assert_eq!(markers.len(), 1);
        assert_eq!(geocoder.call_count(), 1);
    }

    #[test]
    fn test_marker_wire_format() {
        let marker = MapMarker {
            id: "1".into(),
            position: Coordinates { lat: 1.0, lng: 2.0 },
            title: "X".into(),
            kind: ServiceType::Sangjo,
            description: "서울".into(),
        };
        let json = serde_json::to_value(&marker).unwrap();
        assert_eq!(json["type"], "sangjo");
        assert_eq!(json["position"]["lng"], 2.0);
    }
}
