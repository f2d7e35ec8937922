//! cache_purge tool implementation.
//!
//! Deletes one named generation. The current generation is never purged;
//! stale ones are normally removed by activation.

use offline_client::Worker;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ToolError, json_result};

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Generation to delete.
    pub generation: String,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    pub generation: String,
    /// False when no such generation existed.
    pub deleted: bool,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(worker: &Worker, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    let name = params.generation.trim();
    if name.is_empty() {
        return Err(ToolError::InvalidInput("generation cannot be empty".into()).into());
    }
    if name == worker.generation() {
        return Err(ToolError::InvalidInput(format!("{name} is the current generation")).into());
    }

    let deleted = worker.store().delete_generation(name).await?;
    tracing::info!(generation = name, deleted, "cache purge");

    json_result(&CachePurgeOutput { generation: name.to_string(), deleted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::*;

    #[tokio::test]
    async fn test_purge_stale() {
        let (worker, _network) = fresh_worker().await;
        worker.store().open_generation("v1").await.unwrap();

        let params = CachePurgeParams { generation: "v1".into() };
        let output: CachePurgeOutput = parse_output(&purge_impl(&worker, params).await.unwrap());
        assert!(output.deleted);
        assert!(worker.store().list_generations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_purge_missing() {
        let (worker, _network) = fresh_worker().await;
        let params = CachePurgeParams { generation: "v0".into() };

        let output: CachePurgeOutput = parse_output(&purge_impl(&worker, params).await.unwrap());
        assert!(!output.deleted);
    }

    #[tokio::test]
    async fn test_purge_current_refused() {
        let (worker, _network) = active_worker().await;
        let params = CachePurgeParams { generation: "v2".into() };

        let err = purge_impl(&worker, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
        assert!(worker.store().list_generations().await.unwrap().contains("v2"));
    }

    #[tokio::test]
    async fn test_purge_empty_name() {
        let (worker, _network) = fresh_worker().await;
        let params = CachePurgeParams { generation: " ".into() };
        assert!(purge_impl(&worker, params).await.is_err());
    }
}
