//! compare_* tool implementations.
//!
//! The selection lives in [`CompareStore`]; detail payloads for selected
//! listings live in [`CompareCache`] and follow the selection (removed when
//! the listing leaves it).

use std::collections::BTreeMap;

use kind_core::compare::{CompareCacheEntry, CompareCacheType};
use kind_core::{CompareCache, CompareStore, ServiceItem, ToggleOutcome};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::json_result;

/// Parameters for the compare_toggle tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CompareToggleParams {
    /// The listing to add or remove.
    pub item: ServiceItem,

    /// Registry the detail payload came from.
    #[serde(default)]
    pub source: Option<CompareCacheType>,

    /// Full registry record to keep alongside the selection.
    #[serde(default)]
    pub payload: Option<Value>,
}

/// Parameters for the compare_remove tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CompareRemoveParams {
    /// Id of the listing to remove.
    pub id: String,
}

/// Selection snapshot returned by every compare tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CompareListOutput {
    pub items: Vec<ServiceItem>,
    pub max: usize,
    pub is_full: bool,
    /// Cached detail payloads keyed by listing id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, CompareCacheEntry>,
}

/// Output from the compare_toggle tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CompareToggleOutput {
    /// False when the selection was full.
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ToggleOutcome>,
    /// Machine-readable refusal reason ("max").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub selection: CompareListOutput,
}

/// Output from the compare_remove tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CompareRemoveOutput {
    pub removed: bool,
    pub selection: CompareListOutput,
}

async fn snapshot(store: &CompareStore<ServiceItem>, cache: &CompareCache, with_details: bool) -> CompareListOutput {
    let mut details = BTreeMap::new();
    if with_details {
        let mut all = cache.read_all().await;
        for item in store.items() {
            if let Some(entry) = all.remove(&item.id) {
                details.insert(item.id.clone(), entry);
            }
        }
    }

    CompareListOutput { items: store.items().to_vec(), max: store.max(), is_full: store.is_full(), details }
}

/// Implementation of the compare_toggle tool.
pub async fn toggle_impl(
    store: &mut CompareStore<ServiceItem>, cache: &CompareCache, params: CompareToggleParams,
) -> Result<CallToolResult, McpError> {
    let mut item = params.item;
    item.id = item.id.trim().to_string();
    let id = item.id.clone();
    let title = item.title.clone();

    let output = match store.toggle(item).await {
        Ok(outcome) => {
            match (outcome, params.payload) {
                (ToggleOutcome::Added, Some(payload)) => {
                    let kind = params.source.unwrap_or(CompareCacheType::Mohw);
                    if let Err(e) = cache.upsert(&id, CompareCacheEntry::now(kind, title, payload)).await {
                        tracing::warn!(id = %id, error = %e, "failed to cache compare payload");
                    }
                }
                (ToggleOutcome::Removed, _) => {
                    if let Err(e) = cache.remove(&id).await {
                        tracing::warn!(id = %id, error = %e, "failed to drop compare payload");
                    }
                }
                _ => {}
            }

            CompareToggleOutput {
                ok: true,
                outcome: Some(outcome),
                reason: None,
                message: None,
                selection: snapshot(store, cache, false).await,
            }
        }
        Err(refused) => CompareToggleOutput {
            ok: false,
            outcome: None,
            reason: Some(refused.reason().to_string()),
            message: Some(refused.to_string()),
            selection: snapshot(store, cache, false).await,
        },
    };

    json_result(&output)
}

/// Implementation of the compare_remove tool.
pub async fn remove_impl(
    store: &mut CompareStore<ServiceItem>, cache: &CompareCache, params: CompareRemoveParams,
) -> Result<CallToolResult, McpError> {
    let removed = store.remove(&params.id).await;
    if removed {
        cache.remove(params.id.trim()).await?;
    }

    json_result(&CompareRemoveOutput { removed, selection: snapshot(store, cache, false).await })
}

/// Implementation of the compare_clear tool.
pub async fn clear_impl(store: &mut CompareStore<ServiceItem>, cache: &CompareCache) -> Result<CallToolResult, McpError> {
    store.clear().await;
    cache.clear().await?;

    json_result(&snapshot(store, cache, false).await)
}

/// Implementation of the compare_list tool.
pub async fn list_impl(store: &CompareStore<ServiceItem>, cache: &CompareCache) -> Result<CallToolResult, McpError> {
    json_result(&snapshot(store, cache, true).await)
}
