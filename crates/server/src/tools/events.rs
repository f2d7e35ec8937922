//! worker_sync and worker_push tools.

use offline_client::{Notification, SyncOutcome, Worker};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::json_result;

/// Parameters for the worker_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerSyncParams {
    /// Sync tag registered by the page, e.g. "background-sync".
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerSyncOutput {
    pub tag: String,
    pub outcome: SyncOutcome,
}

/// Parameters for the worker_push tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerPushParams {
    /// Text payload of the push message. Omit for an empty push.
    #[serde(default)]
    pub payload: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerPushOutput {
    /// Notification to display, if the push carried a payload.
    pub notification: Option<Notification>,
}

pub async fn sync_impl(worker: &Worker, params: WorkerSyncParams) -> Result<CallToolResult, McpError> {
    let outcome = worker.handle_sync(&params.tag).await;
    json_result(&WorkerSyncOutput { tag: params.tag, outcome })
}

pub async fn push_impl(worker: &Worker, params: WorkerPushParams) -> Result<CallToolResult, McpError> {
    let notification = worker.handle_push(params.payload.as_deref())?;
    json_result(&WorkerPushOutput { notification })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::*;

    #[tokio::test]
    async fn test_sync() {
        let (worker, _network) = fresh_worker().await;
        let result = sync_impl(&worker, WorkerSyncParams { tag: "background-sync".into() })
            .await
            .unwrap();
        let output: WorkerSyncOutput = parse_output(&result);
        assert_eq!(output.outcome, SyncOutcome::Handled);
    }

    #[tokio::test]
    async fn test_push() {
        let (worker, _network) = fresh_worker().await;
        let result = push_impl(&worker, WorkerPushParams { payload: Some("Quote accepted".into()) })
            .await
            .unwrap();
        let output: WorkerPushOutput = parse_output(&result);
        let notification = output.notification.unwrap();
        assert_eq!(notification.body, "Quote accepted");
        assert_eq!(notification.actions.len(), 2);
    }

    #[tokio::test]
    async fn test_push_empty() {
        let (worker, _network) = fresh_worker().await;
        let result = push_impl(&worker, WorkerPushParams { payload: None }).await.unwrap();
        let output: WorkerPushOutput = parse_output(&result);
        assert!(output.notification.is_none());
    }
}
