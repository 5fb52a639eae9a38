//! Directory listing record.
//!
//! A listing is one funeral hall, cremation facility or prepaid funeral
//! service company as shown in search results and the comparison table.
//! Persisted in camelCase so stored selections stay readable by the web client.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::compare::Selectable;
use crate::geocode::Coordinates;

/// Where a listing's data comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TrustType {
    /// Published public data.
    Public,
    /// Provided by a partner company.
    Partner,
    /// Submitted by users.
    Report,
    /// Derived from standard price tables.
    #[default]
    Estimate,
}

/// Kind of service a listing offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    #[default]
    Funeral,
    Cremation,
    Sangjo,
}

/// A single directory listing.
///
/// Prices are in units of 10,000 KRW.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub price_min: u32,
    #[serde(default)]
    pub price_max: u32,
    #[serde(default)]
    pub trust_type: TrustType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,
}

impl ServiceItem {
    /// Minimal listing with only the fields the comparison store inspects.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            location: String::new(),
            distance: None,
            tags: Vec::new(),
            price_min: 0,
            price_max: 0,
            trust_type: TrustType::default(),
            thumbnail: None,
            description: None,
            rating: None,
            review_count: None,
            coordinates: None,
            service_type: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }
}

impl Selectable for ServiceItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }
}
