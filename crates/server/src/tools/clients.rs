//! client_close tool implementation.
//!
//! Sessions are opened by navigations through worker_fetch.

use offline_client::Worker;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ToolError, json_result};

/// Parameters for the client_close tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClientCloseParams {
    pub client_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClientCloseOutput {
    pub client_id: String,
    /// False when no such session was open.
    pub closed: bool,
}

pub async fn close_impl(worker: &Worker, params: ClientCloseParams) -> Result<CallToolResult, McpError> {
    if params.client_id.trim().is_empty() {
        return Err(ToolError::InvalidInput("client_id cannot be empty".into()).into());
    }

    let closed = worker.close_client(&params.client_id).await;
    json_result(&ClientCloseOutput { client_id: params.client_id, closed })
}
