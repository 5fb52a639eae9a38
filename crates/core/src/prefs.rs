//! Onboarding preferences.
//!
//! Region and funeral type are the "core" preferences; onboarding only
//! counts as completed while both are set. Budget is in units of 10,000 KRW.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Storage;

/// Storage key for the preferences document.
pub const STORAGE_KEY: &str = "kind:prefs";

pub const MIN_BUDGET: f64 = 0.0;
pub const MAX_BUDGET: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FuneralType {
    /// Small family-only ceremony.
    Family,
    /// Regular three-day funeral.
    General,
    /// Direct cremation without a funeral hall.
    Nohall,
}

impl FuneralType {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "family" => Some(FuneralType::Family),
            "general" => Some(FuneralType::General),
            "nohall" => Some(FuneralType::Nohall),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPrefs {
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funeral_type: Option<FuneralType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<u32>,
}

impl UserPrefs {
    /// Region and funeral type are both set.
    pub fn has_core_prefs(&self) -> bool {
        self.region.is_some() && self.funeral_type.is_some()
    }
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrefsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funeral_type: Option<FuneralType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Build valid preferences from an arbitrary stored value.
pub fn normalize_prefs(input: &Value) -> UserPrefs {
    let Some(raw) = input.as_object() else {
        return UserPrefs::default();
    };

    let region = raw
        .get("region")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string);

    let funeral_type = raw.get("funeralType").and_then(Value::as_str).and_then(FuneralType::parse);

    let budget = raw
        .get("budget")
        .and_then(Value::as_f64)
        .filter(|b| b.is_finite())
        .map(|b| b.clamp(MIN_BUDGET, MAX_BUDGET).round() as u32);

    let mut completed = raw.get("completed").and_then(Value::as_bool) == Some(true);
    if completed && (region.is_none() || funeral_type.is_none()) {
        completed = false;
    }

    UserPrefs { completed, region, funeral_type, budget }
}

/// Persisted preferences.
#[derive(Debug)]
pub struct PreferencesStore {
    prefs: UserPrefs,
    storage: Storage,
}

impl PreferencesStore {
    pub async fn load(storage: Storage) -> Self {
        let raw: Value = storage.read(STORAGE_KEY, Value::Null).await;
        let store = Self { prefs: normalize_prefs(&raw), storage };
        store.persist().await;
        store
    }

    pub fn prefs(&self) -> &UserPrefs {
        &self.prefs
    }

    pub fn has_core_prefs(&self) -> bool {
        self.prefs.has_core_prefs()
    }

    /// Merge `patch` over the current preferences and re-validate.
    pub async fn set_prefs(&mut self, patch: PrefsPatch) -> &UserPrefs {
        let mut merged = self.as_object();
        if let Some(region) = patch.region {
            merged.insert("region".into(), Value::String(region));
        }
        if let Some(funeral_type) = patch.funeral_type {
            merged.insert("funeralType".into(), serde_json::json!(funeral_type));
        }
        if let Some(budget) = patch.budget
            && let Some(number) = serde_json::Number::from_f64(budget)
        {
            merged.insert("budget".into(), Value::Number(number));
        }
        if let Some(completed) = patch.completed {
            merged.insert("completed".into(), Value::Bool(completed));
        }
        self.replace(Value::Object(merged)).await
    }

    /// Mark onboarding done; only sticks when the core preferences are set.
    pub async fn complete(&mut self) -> &UserPrefs {
        self.set_prefs(PrefsPatch { completed: Some(true), ..Default::default() }).await
    }

    /// Leave onboarding without completing it.
    pub async fn skip(&mut self) -> &UserPrefs {
        self.set_prefs(PrefsPatch { completed: Some(false), ..Default::default() }).await
    }

    pub async fn reset(&mut self) -> &UserPrefs {
        self.prefs = UserPrefs::default();
        self.persist().await;
        &self.prefs
    }

    fn as_object(&self) -> Map<String, Value> {
        match serde_json::to_value(&self.prefs) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    async fn replace(&mut self, raw: Value) -> &UserPrefs {
        self.prefs = normalize_prefs(&raw);
        self.persist().await;
        &self.prefs
    }

    async fn persist(&self) {
        self.storage.write_best_effort(STORAGE_KEY, &self.prefs).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_non_object() {
        assert_eq!(normalize_prefs(&json!(null)), UserPrefs::default());
        assert_eq!(normalize_prefs(&json!([1, 2])), UserPrefs::default());
        assert_eq!(normalize_prefs(&json!("prefs")), UserPrefs::default());
    }

    #[test]
    fn test_normalize_trims_and_validates() {
        let prefs = normalize_prefs(&json!({
            "completed": true,
            "region": "  서울 ",
            "funeralType": "general",
            "budget": 512.6
        }));

        assert_eq!(prefs.region.as_deref(), Some("서울"));
        assert_eq!(prefs.funeral_type, Some(FuneralType::General));
        assert_eq!(prefs.budget, Some(513));
        assert!(prefs.completed);
    }

    #[test]
    fn test_normalize_clamps_budget() {
        assert_eq!(normalize_prefs(&json!({"budget": -20})).budget, Some(0));
        assert_eq!(normalize_prefs(&json!({"budget": 99_999})).budget, Some(10_000));
        assert_eq!(normalize_prefs(&json!({"budget": "300"})).budget, None);
    }

    #[test]
    fn test_completed_requires_core_prefs() {
        let prefs = normalize_prefs(&json!({"completed": true, "region": "경기"}));
        assert!(!prefs.completed);

        let prefs = normalize_prefs(&json!({"completed": true, "region": "   ", "funeralType": "family"}));
        assert!(!prefs.completed);
        assert!(prefs.region.is_none());

        let prefs = normalize_prefs(&json!({"completed": "yes", "region": "경기", "funeralType": "family"}));
        assert!(!prefs.completed);
    }

    #[test]
    fn test_unknown_funeral_type_dropped() {
        let prefs = normalize_prefs(&json!({"funeralType": "viking"}));
        assert!(prefs.funeral_type.is_none());
    }

    #[tokio::test]
    async fn test_store_flow() {
        let storage = Storage::in_memory();
        let mut store = PreferencesStore::load(storage.clone()).await;
        assert!(!store.prefs().completed);

        store.complete().await;
        assert!(!store.prefs().completed);

        store
            .set_prefs(PrefsPatch {
                region: Some("부산".into()),
                funeral_type: Some(FuneralType::Nohall),
                budget: Some(250.0),
                ..Default::default()
            })
            .await;
        assert!(store.has_core_prefs());

        assert!(store.complete().await.completed);
        assert!(!store.skip().await.completed);
        assert_eq!(store.prefs().region.as_deref(), Some("부산"));

        let reloaded = PreferencesStore::load(storage.clone()).await;
        assert_eq!(reloaded.prefs().budget, Some(250));
        assert_eq!(reloaded.prefs().funeral_type, Some(FuneralType::Nohall));

        store.reset().await;
        let stored: Value = storage.read(STORAGE_KEY, Value::Null).await;
        assert_eq!(stored, json!({"completed": false}));
    }

    #[tokio::test]
    async fn test_blank_region_patch_clears_region() {
        let mut store = PreferencesStore::load(Storage::in_memory()).await;
        store
            .set_prefs(PrefsPatch {
                region: Some("서울".into()),
                funeral_type: Some(FuneralType::Family),
                completed: Some(true),
                ..Default::default()
            })
            .await;
        assert!(store.prefs().completed);

        let prefs = store.set_prefs(PrefsPatch { region: Some(" ".into()), ..Default::default() }).await;
        assert!(prefs.region.is_none());
        assert!(!prefs.completed);
    }

    #[tokio::test]
    async fn test_load_sanitizes_stored_value() {
        let storage = Storage::in_memory();
        storage
            .write(STORAGE_KEY, &json!({"completed": true, "funeralType": "general", "budget": 1e9}))
            .await
            .unwrap();

        let store = PreferencesStore::load(storage).await;
        assert!(!store.prefs().completed);
        assert_eq!(store.prefs().budget, Some(10_000));
    }
}
