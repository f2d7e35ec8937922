//! worker_install, worker_activate and worker_status tools.

use offline_client::Worker;
use rmcp::{ErrorData as McpError, model::CallToolResult};

use crate::error::json_result;

/// Seed the current generation with the core assets.
pub async fn install_impl(worker: &Worker) -> Result<CallToolResult, McpError> {
    let report = worker.install().await?;
    json_result(&report)
}

/// Purge stale generations and claim open sessions.
pub async fn activate_impl(worker: &Worker) -> Result<CallToolResult, McpError> {
    let report = worker.activate().await?;
    json_result(&report)
}

pub async fn status_impl(worker: &Worker) -> Result<CallToolResult, McpError> {
    json_result(&worker.status().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::*;
    use offline_client::{ActivateReport, WorkerState, WorkerStatus};

    #[tokio::test]
    async fn test_install_then_activate() {
        let (worker, _network) = fresh_worker().await;
        worker.store().open_generation("v1").await.unwrap();

        install_impl(&worker).await.unwrap();
        let result = activate_impl(&worker).await.unwrap();
        let report: ActivateReport = parse_output(&result);
        assert_eq!(report.generation, "v2");
        assert_eq!(report.deleted, vec!["v1".to_string()]);

        let status: WorkerStatus = parse_output(&status_impl(&worker).await.unwrap());
        assert_eq!(status.state, WorkerState::Activated);
    }

    #[tokio::test]
    async fn test_install_offline_fails() {
        let (worker, network) = fresh_worker().await;
        network.set_offline(true);

        let err = install_impl(&worker).await.unwrap_err();
        assert_eq!(err.code.0, -32020);
    }

    #[tokio::test]
    async fn test_activate_before_install_fails() {
        let (worker, _network) = fresh_worker().await;
        let err = activate_impl(&worker).await.unwrap_err();
        assert_eq!(err.code.0, -32021);
    }
}
