//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::state::AppState;
use crate::tools::compare::{self, CompareRemoveParams, CompareToggleParams};
use crate::tools::geocode::{self, GeocodeBatchParams, GeocodePurgeParams, MapMarkersParams};
use crate::tools::prefs::{self, PrefsUpdateParams};
use crate::tools::price::{self, PriceEstimateParams};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for kind.
#[derive(Clone)]
pub struct KindServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl KindServer {
    /// Create a new server handler.
    pub fn new(state: AppState) -> Self {
        Self { state: Arc::new(state), tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Add a listing to the comparison selection, or remove it if already selected. Returns ok=false with reason \"max\" when the selection is full."
    )]
    async fn compare_toggle(&self, params: Parameters<CompareToggleParams>) -> Result<CallToolResult, McpError> {
        let mut store = self.state.compare.lock().await;
        compare::toggle_impl(&mut store, &self.state.compare_cache, params.0).await
    }

    #[tool(description = "Remove a listing from the comparison selection by id.")]
    async fn compare_remove(&self, params: Parameters<CompareRemoveParams>) -> Result<CallToolResult, McpError> {
        let mut store = self.state.compare.lock().await;
        compare::remove_impl(&mut store, &self.state.compare_cache, params.0).await
    }

    #[tool(description = "Empty the comparison selection and drop cached detail payloads.")]
    async fn compare_clear(&self) -> Result<CallToolResult, McpError> {
        let mut store = self.state.compare.lock().await;
        compare::clear_impl(&mut store, &self.state.compare_cache).await
    }

    #[tool(description = "List the comparison selection in order, with cached detail payloads.")]
    async fn compare_list(&self) -> Result<CallToolResult, McpError> {
        let store = self.state.compare.lock().await;
        compare::list_impl(&store, &self.state.compare_cache).await
    }

    /// Resolve addresses sequentially through the 30-day cache.
    #[tool(
        description = "Geocode addresses one at a time through a 30-day local cache, pausing between lookups. Unresolvable addresses are reported as failed."
    )]
    async fn geocode_batch(&self, params: Parameters<GeocodeBatchParams>) -> Result<CallToolResult, McpError> {
        geocode::batch_impl(&self.state.geocode, self.state.geocoder(), &self.state.config, params.0).await
    }

    #[tool(description = "Delete expired geocode cache entries, or every entry when all=true.")]
    async fn geocode_purge(&self, params: Parameters<GeocodePurgeParams>) -> Result<CallToolResult, McpError> {
        geocode::purge_impl(&self.state.geocode, params.0).await
    }

    #[tool(description = "Place listings on a map. Uses listing coordinates when present, otherwise geocodes the address.")]
    async fn map_markers(&self, params: Parameters<MapMarkersParams>) -> Result<CallToolResult, McpError> {
        geocode::markers_impl(&self.state.geocode, self.state.geocoder(), &self.state.config, params.0).await
    }

    #[tool(description = "Get onboarding preferences (region, funeral type, budget).")]
    async fn prefs_get(&self) -> Result<CallToolResult, McpError> {
        let store = self.state.prefs.lock().await;
        prefs::get_impl(&store).await
    }

    #[tool(
        description = "Update onboarding preferences. action=complete only sticks when region and funeral type are set."
    )]
    async fn prefs_update(&self, params: Parameters<PrefsUpdateParams>) -> Result<CallToolResult, McpError> {
        let mut store = self.state.prefs.lock().await;
        prefs::update_impl(&mut store, params.0).await
    }

    #[tool(description = "Reset onboarding preferences to defaults.")]
    async fn prefs_reset(&self) -> Result<CallToolResult, McpError> {
        let mut store = self.state.prefs.lock().await;
        prefs::reset_impl(&mut store).await
    }

    #[tool(description = "Estimate a funeral facility price range (만원) from its address and facility type.")]
    async fn price_estimate(&self, params: Parameters<PriceEstimateParams>) -> Result<CallToolResult, McpError> {
        price::estimate_impl(params.0).await
    }
}

impl ServerHandler for KindServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "kind".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
