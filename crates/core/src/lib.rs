//! Core state and shared functionality for the kind service.
//!
//! This crate provides:
//! - Key-value persistence with SQLite and in-memory backends
//! - The compare selection and its detail payload cache
//! - Address geocoding with a local 30-day cache
//! - Onboarding preferences and standard price estimates
//! - Unified error types and layered configuration

pub mod compare;
pub mod config;
pub mod error;
pub mod geocode;
pub mod listing;
pub mod prefs;
pub mod pricing;
pub mod storage;

pub use compare::{CompareCache, CompareStore, Selectable, SelectionError, ToggleOutcome};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use geocode::{Coordinates, GeocodeCache, Geocoder};
pub use listing::{ServiceItem, ServiceType, TrustType};
pub use prefs::{PreferencesStore, PrefsPatch, UserPrefs};
pub use pricing::{PriceRange, estimate_price};
pub use storage::{KeyValueStore, MemoryStore, Storage, StoreDb};
