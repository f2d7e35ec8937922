//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the worker's event handlers.
use std::sync::Arc;

use crate::tools::cache::{CacheGetParams, CachePurgeParams, generations_impl, get_impl, purge_impl};
use crate::tools::clients::{ClientCloseParams, close_impl};
use crate::tools::events::{WorkerPushParams, WorkerSyncParams, push_impl, sync_impl};
use crate::tools::lifecycle::{activate_impl, install_impl, status_impl};
use crate::tools::worker_fetch::{WorkerFetchParams, fetch_impl};

use offline_client::{Network, Worker};
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

/// The main MCP server handler for offline-worker.
#[derive(Clone)]
pub struct OfflineWorkerServer {
    tool_router: ToolRouter<Self>,
    worker: Arc<Worker>,
    network: Arc<dyn Network>,
}

/// Tool router implementation using the #[tool_router] macro.
#[tool_router]
impl OfflineWorkerServer {
    /// Create a handler around a worker and the network it passes requests through to.
    pub fn new(worker: Arc<Worker>, network: Arc<dyn Network>) -> Self {
        Self { tool_router: Self::tool_router(), worker, network }
    }

    #[tool(description = "Install the worker: fetch every core asset and seed the current cache generation.")]
    async fn worker_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.worker).await
    }

    #[tool(description = "Activate the worker: delete stale cache generations and claim open client sessions.")]
    async fn worker_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.worker).await
    }

    #[tool(description = "Report worker state, scope, generation, open clients and pending background refreshes.")]
    async fn worker_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.worker).await
    }

    /// Dispatch one request through the worker.
    ///
    /// Navigations are network-first with an offline fallback to the entry
    /// point. Same-origin assets are cache-first with a background refresh.
    #[tool(
        description = "Intercept a request as the worker would. Returns the response and whether it came from cache or network. Navigations with a client_id open that client session."
    )]
    async fn worker_fetch(&self, params: Parameters<WorkerFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, self.network.as_ref(), params.0).await
    }

    #[tool(description = "Deliver a background sync event with the given tag.")]
    async fn worker_sync(&self, params: Parameters<WorkerSyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.worker, params.0).await
    }

    #[tool(description = "Deliver a push message. Returns the notification to display, if any.")]
    async fn worker_push(&self, params: Parameters<WorkerPushParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.worker, params.0).await
    }

    #[tool(description = "Close a client session opened by a navigation through worker_fetch.")]
    async fn client_close(&self, params: Parameters<ClientCloseParams>) -> Result<CallToolResult, McpError> {
        close_impl(&self.worker, params.0).await
    }

    #[tool(description = "List cache generations with entry counts.")]
    async fn cache_generations(&self) -> Result<CallToolResult, McpError> {
        generations_impl(&self.worker).await
    }

    #[tool(description = "Read a stored response by URL, from a named generation or any generation.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.worker, params.0).await
    }

    #[tool(description = "Delete a stale cache generation. The current generation cannot be purged.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.worker, params.0).await
    }
}

impl ServerHandler for OfflineWorkerServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "offline-worker".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(format!(
                "Offline caching worker for {} (generation {}). Call worker_install, then worker_activate.",
                self.worker.scope(),
                self.worker.generation()
            )),
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
