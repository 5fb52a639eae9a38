//! Shared server state.
//!
//! One instance per process. Stores that mutate in memory sit behind a
//! `tokio::sync::Mutex` so tool calls touching them run one at a time.

use std::sync::Arc;

use async_trait::async_trait;
use kind_client::GoogleGeocoder;
use kind_core::{
    AppConfig, CompareCache, CompareStore, Coordinates, Error, GeocodeCache, Geocoder, PreferencesStore, ServiceItem, Storage,
    StoreDb,
};
use tokio::sync::Mutex;

pub struct AppState {
    pub config: AppConfig,
    pub compare: Mutex<CompareStore<ServiceItem>>,
    pub compare_cache: CompareCache,
    pub prefs: Mutex<PreferencesStore>,
    pub geocode: GeocodeCache,
    geocoder: Arc<dyn Geocoder>,
}

/// Stand-in when no API key is configured: every remote lookup fails, so
/// only cached addresses and listings with coordinates resolve.
struct UnconfiguredGeocoder;

#[async_trait]
impl Geocoder for UnconfiguredGeocoder {
    async fn geocode(&self, _address: &str) -> Result<Vec<Coordinates>, Error> {
        Err(Error::GeocodeAuthError("geocoder not configured: set KIND_GOOGLE_MAPS_API_KEY".into()))
    }
}

impl AppState {
    /// Open the SQLite store named by the config and restore every store from it.
    pub async fn open(config: AppConfig) -> Result<Self, Error> {
        let db = StoreDb::open(&config.db_path).await?;
        tracing::info!(path = %config.db_path.display(), "opened key-value store");

        let geocoder: Option<Arc<dyn Geocoder>> = match GoogleGeocoder::from_app(&config) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!(error = %e, "geocoding disabled; only cached addresses will resolve");
                None
            }
        };

        Self::with_storage(config, Storage::new(db), geocoder).await
    }

    pub async fn with_storage(
        config: AppConfig, storage: Storage, geocoder: Option<Arc<dyn Geocoder>>,
    ) -> Result<Self, Error> {
        let compare = CompareStore::load(storage.clone(), config.compare_max).await?;
        let prefs = PreferencesStore::load(storage.clone()).await;

        Ok(Self {
            compare: Mutex::new(compare),
            compare_cache: CompareCache::new(storage.clone()),
            prefs: Mutex::new(prefs),
            geocode: GeocodeCache::new(storage),
            geocoder: geocoder.unwrap_or_else(|| Arc::new(UnconfiguredGeocoder)),
            config,
        })
    }

    pub fn geocoder(&self) -> &dyn Geocoder {
        self.geocoder.as_ref()
    }
}
