//! Install and activate handlers.

use futures_util::future::join_all;
use offline_core::{Error, InterceptedRequest, RequestMode};
use serde::{Deserialize, Serialize};

use super::{Worker, WorkerState};

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct InstallReport {
    pub generation: String,
    /// Absolute locators stored during seeding.
    pub seeded: Vec<String>,
}

/// Result of a completed activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ActivateReport {
    pub generation: String,
    /// Stale generations removed.
    pub deleted: Vec<String>,
    /// Stale generations whose deletion failed; retried on the next activation.
    pub failed: Vec<String>,
    /// Sessions that switched controller.
    pub claimed: usize,
}

impl Worker {
    /// Seed the current generation with the core assets.
    ///
    /// Any transport failure or non-2xx status fails the install and marks
    /// this instance redundant. Entries stored before the failure are kept;
    /// the next install attempt overwrites them.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        {
            let mut state = self.state.write().await;
            match *state {
                WorkerState::Parsed | WorkerState::Redundant => *state = WorkerState::Installing,
                other => return Err(Error::InvalidState(format!("cannot install while {other}"))),
            }
        }

        match self.seed().await {
            Ok(report) => {
                self.set_state(WorkerState::Installed).await;
                if self.config.skip_waiting {
                    self.skip_waiting();
                }
                tracing::info!(generation = %report.generation, assets = report.seeded.len(), "worker installed");
                Ok(report)
            }
            Err(e) => {
                self.set_state(WorkerState::Redundant).await;
                tracing::error!(generation = %self.config.generation, error = %e, "worker install failed");
                Err(e)
            }
        }
    }

    async fn seed(&self) -> Result<InstallReport, Error> {
        let store = self
            .store
            .open_generation(&self.config.generation)
            .await
            .map_err(|e| Error::InstallFailed(e.to_string()))?;

        let requests = self
            .config
            .core_assets
            .iter()
            .map(|asset| InterceptedRequest::for_locator(&self.scope, asset, RequestMode::SameOrigin))
            .collect::<Result<Vec<_>, _>>()?;

        let responses = join_all(requests.iter().map(|request| self.network.fetch(request))).await;

        let mut seeded = Vec::with_capacity(requests.len());
        for (request, response) in requests.iter().zip(responses) {
            let response = response.map_err(|e| Error::InstallFailed(format!("{}: {e}", request.url)))?;
            if !response.ok() {
                return Err(Error::InstallFailed(format!("{}: status {}", request.url, response.status)));
            }
            store
                .try_put(&request.url, &response)
                .await
                .map_err(|e| Error::InstallFailed(format!("{}: {e}", request.url)))?;
            seeded.push(request.url.to_string());
        }

        Ok(InstallReport { generation: store.name().to_string(), seeded })
    }

    /// Delete every stale generation, then claim all open sessions.
    ///
    /// Deletions run independently; a failure for one name is logged and
    /// reported without blocking the others. Without skip-waiting, activation
    /// is refused while an older generation still controls a session.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        {
            let mut state = self.state.write().await;
            match *state {
                WorkerState::Installed => {
                    if !self.is_skip_waiting() && self.clients.has_other_controller(&self.config.generation).await {
                        return Err(Error::InvalidState(format!(
                            "{} is waiting for sessions controlled by an older generation",
                            self.config.generation
                        )));
                    }
                    *state = WorkerState::Activating;
                }
                other => return Err(Error::InvalidState(format!("cannot activate while {other}"))),
            }
        }

        let generation = self.config.generation.clone();
        let names = match self.store.list_generations().await {
            Ok(names) => names,
            Err(e) => {
                self.set_state(WorkerState::Installed).await;
                return Err(e);
            }
        };

        let stale: Vec<String> = names.into_iter().filter(|name| *name != generation).collect();
        let results = join_all(stale.iter().map(|name| self.store.delete_generation(name))).await;

        let mut deleted = Vec::new();
        let mut failed = Vec::new();
        for (name, result) in stale.into_iter().zip(results) {
            match result {
                Ok(_) => deleted.push(name),
                Err(e) => {
                    tracing::warn!(generation = %name, error = %e, "failed to delete stale generation");
                    failed.push(name);
                }
            }
        }

        let claimed = self.clients.claim(&generation).await;
        self.set_state(WorkerState::Activated).await;

        tracing::info!(generation = %generation, deleted = deleted.len(), claimed, "worker activated");

        Ok(ActivateReport { generation, deleted, failed, claimed })
    }
}
