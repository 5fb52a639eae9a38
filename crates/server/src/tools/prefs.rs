//! prefs_* tool implementations.

use kind_core::prefs::FuneralType;
use kind_core::{PreferencesStore, PrefsPatch, UserPrefs};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Onboarding step to apply after the field updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OnboardingAction {
    /// Mark onboarding done (needs region and funeral type).
    Complete,
    /// Leave onboarding without completing it.
    Skip,
}

/// Parameters for the prefs_update tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PrefsUpdateParams {
    /// Preferred region (e.g., "서울"). Blank clears it.
    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub funeral_type: Option<FuneralType>,

    /// Budget in units of 10,000 KRW, clamped to 0..=10000.
    #[serde(default)]
    pub budget: Option<f64>,

    #[serde(default)]
    pub action: Option<OnboardingAction>,
}

/// Output from every prefs tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PrefsOutput {
    pub prefs: UserPrefs,
    pub has_core_prefs: bool,
}

fn output(store: &PreferencesStore) -> Result<CallToolResult, McpError> {
    json_result(&PrefsOutput { prefs: store.prefs().clone(), has_core_prefs: store.has_core_prefs() })
}

/// Implementation of the prefs_get tool.
pub async fn get_impl(store: &PreferencesStore) -> Result<CallToolResult, McpError> {
    output(store)
}

/// Implementation of the prefs_update tool.
pub async fn update_impl(store: &mut PreferencesStore, params: PrefsUpdateParams) -> Result<CallToolResult, McpError> {
    let completed = params.action.map(|action| action == OnboardingAction::Complete);
    let patch = PrefsPatch { region: params.region, funeral_type: params.funeral_type, budget: params.budget, completed };
    store.set_prefs(patch).await;

    if params.action == Some(OnboardingAction::Complete) && !store.prefs().completed {
        tracing::debug!("onboarding completion refused: region and funeral type required");
    }

    output(store)
}

/// Implementation of the prefs_reset tool.
pub async fn reset_impl(store: &mut PreferencesStore) -> Result<CallToolResult, McpError> {
    store.reset().await;
    output(store)
}
