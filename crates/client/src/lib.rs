//! Client code for kind.
//!
//! This crate provides the Google Geocoding API client behind the core
//! [`kind_core::Geocoder`] trait.

pub mod google;

pub use google::{GeocodeError, GoogleConfig, GoogleGeocoder};
