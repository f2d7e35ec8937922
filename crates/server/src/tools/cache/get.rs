//! cache_get tool implementation.
//!
//! Reads one stored response by URL.

use offline_client::Worker;
use offline_core::{EntryInfo, ResponseType};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ToolError, json_result};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL, or a path relative to the worker scope.
    pub url: String,

    /// Generation to read. Defaults to searching every generation, current first.
    #[serde(default)]
    pub generation: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub key: String,
    /// Set when a generation was requested explicitly.
    pub entry: Option<EntryInfo>,
    pub status: u16,
    pub response_type: ResponseType,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(worker: &Worker, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(ToolError::InvalidInput("url cannot be empty".into()).into());
    }
    let key = worker.scope().resolve(&params.url)?;
    let db = worker.store();

    let (response, entry) = match params.generation {
        Some(name) => {
            if !db.list_generations().await?.contains(&name) {
                return Err(ToolError::NotFound(format!("generation {name}")).into());
            }
            let store = db.open_generation(&name).await?;
            let response = store.try_lookup(&key).await?;
            let entry = store.entries().await?.into_iter().find(|e| e.key == key.as_str());
            (response, entry)
        }
        None => (db.lookup_any(&key, worker.generation()).await, None),
    };

    let response = response.ok_or_else(|| ToolError::NotFound(key.to_string()))?;
    let output = CacheGetOutput {
        key: key.to_string(),
        entry,
        status: response.status,
        response_type: response.response_type,
        headers: response.headers,
        body: String::from_utf8_lossy(&response.body).to_string(),
    };

    json_result(&output)
}
