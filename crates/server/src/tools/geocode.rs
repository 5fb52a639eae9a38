//! geocode_* and map_markers tool implementations.
//!
//! Addresses are resolved one after another through the local cache with a
//! pause after each attempt. Failed addresses are reported, never fatal.

use std::time::Duration;

use kind_core::geocode::batch::{BatchItem, BatchItemStatus};
use kind_core::geocode::{DEFAULT_CENTER, DEFAULT_LOCATE_LIMIT, DEFAULT_ZOOM, MapMarker};
use kind_core::{AppConfig, Coordinates, Error, GeocodeCache, Geocoder, ServiceItem};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Most addresses accepted in one call.
const MAX_BATCH_ADDRESSES: usize = 100;

/// Parameters for the geocode_batch tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GeocodeBatchParams {
    /// Addresses to resolve, in order.
    pub addresses: Vec<String>,

    /// Pause after each lookup in milliseconds (default: configured delay).
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

/// Batch summary statistics.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GeocodeSummary {
    pub total: u32,
    pub resolved: u32,
    pub cached: u32,
    pub failed: u32,
}

/// Output from the geocode_batch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GeocodeBatchOutput {
    /// One entry per input address (in input order).
    pub results: Vec<BatchItem>,
    pub summary: GeocodeSummary,
}

/// Parameters for the geocode_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GeocodePurgeParams {
    /// Drop every entry, not just expired ones.
    #[serde(default)]
    pub all: bool,
}

/// Output from the geocode_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GeocodePurgeOutput {
    /// Number of entries deleted; absent when the whole cache was dropped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<u64>,
    pub cleared: bool,
}

/// Parameters for the map_markers tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MapMarkersParams {
    /// Listings to place, in display order.
    pub items: Vec<ServiceItem>,

    /// Maximum listings to place (default: 20).
    #[serde(default)]
    pub limit: Option<usize>,

    /// Pause after each lookup in milliseconds (default: configured delay).
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

/// Output from the map_markers tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MapMarkersOutput {
    pub markers: Vec<MapMarker>,
    /// Initial map center: the first marker, or Seoul City Hall.
    pub center: Coordinates,
    pub zoom: u8,
}

fn delay_for(config: &AppConfig, delay_ms: Option<u64>) -> Duration {
    delay_ms.map(Duration::from_millis).unwrap_or_else(|| config.geocode_delay())
}

/// Implementation of the geocode_batch tool.
pub async fn batch_impl(
    cache: &GeocodeCache, geocoder: &dyn Geocoder, config: &AppConfig, params: GeocodeBatchParams,
) -> Result<CallToolResult, McpError> {
    if params.addresses.is_empty() {
        return Err(Error::InvalidInput("addresses cannot be empty".into()).into());
    }
    if params.addresses.len() > MAX_BATCH_ADDRESSES {
        return Err(Error::InvalidInput(format!(
            "too many addresses: {} (max {MAX_BATCH_ADDRESSES})",
            params.addresses.len()
        ))
        .into());
    }

    let delay = delay_for(config, params.delay_ms);
    let results = cache
        .resolve_batch_detailed(&params.addresses, geocoder, delay)
        .await;

    let count = |status: BatchItemStatus| results.iter().filter(|i| i.status == status).count() as u32;
    let summary = GeocodeSummary {
        total: results.len() as u32,
        resolved: count(BatchItemStatus::Resolved),
        cached: count(BatchItemStatus::Cached),
        failed: count(BatchItemStatus::Failed),
    };

    json_result(&GeocodeBatchOutput { results, summary })
}

/// Implementation of the geocode_purge tool.
pub async fn purge_impl(cache: &GeocodeCache, params: GeocodePurgeParams) -> Result<CallToolResult, McpError> {
    let output = if params.all {
        cache.clear().await?;
        GeocodePurgeOutput { deleted: None, cleared: true }
    } else {
        let deleted = cache.purge_expired().await?;
        GeocodePurgeOutput { deleted: Some(deleted), cleared: false }
    };

    json_result(&output)
}

/// Implementation of the map_markers tool.
pub async fn markers_impl(
    cache: &GeocodeCache, geocoder: &dyn Geocoder, config: &AppConfig, params: MapMarkersParams,
) -> Result<CallToolResult, McpError> {
    let limit = params.limit.unwrap_or(DEFAULT_LOCATE_LIMIT);
    let delay = delay_for(config, params.delay_ms);

    let markers = cache.locate_listings(&params.items, geocoder, limit, delay).await;
    let center = markers.first().map(|m| m.position).unwrap_or(DEFAULT_CENTER);

    json_result(&MapMarkersOutput { markers, center, zoom: DEFAULT_ZOOM })
}
