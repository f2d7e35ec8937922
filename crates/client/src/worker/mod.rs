//! The request-interception worker.
//!
//! A [`Worker`] owns one cache generation and handles the host's events:
//!
//! - `install`: seed the generation with the core assets
//! - `activate`: purge stale generations and claim open sessions
//! - `fetch`: classify the request and run a caching strategy
//! - `sync` / `push`: placeholder collaborators
//!
//! Every handler is an async fn; the host keeps an event alive by awaiting
//! the returned future. Background cache refreshes are detached tasks tracked
//! in a `JoinSet` so the host can extend their life with
//! [`Worker::settle_background`]. If the host exits first they are dropped.

mod clients;
mod events;
mod lifecycle;
mod strategy;

#[cfg(test)]
pub(crate) mod testing;

pub use clients::ClientSessions;
pub use events::{BACKGROUND_SYNC_TAG, Notification, NotificationAction, NotificationData, SyncOutcome};
pub use lifecycle::{ActivateReport, InstallReport};
pub use strategy::{FetchDecision, ResponseSource};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use offline_core::{AppConfig, CacheDb, Error, Scope, StoreHandle};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinSet;
use url::Url;

use crate::Network;

/// Lifecycle state of a worker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Constructed, install not yet attempted.
    Parsed,
    Installing,
    /// Seeded and waiting to activate.
    Installed,
    Activating,
    /// Controlling sessions and intercepting fetches.
    Activated,
    /// Install failed; this instance never becomes current.
    Redundant,
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(s)
    }
}

/// Worker settings derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Current cache generation name.
    pub generation: String,
    /// Offline fallback document for navigations.
    pub entry_point: String,
    /// Locators seeded on install, relative to the scope.
    pub core_assets: Vec<String>,
    pub notification_title: String,
    /// Activate without waiting for older controllers to release their sessions.
    pub skip_waiting: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        let app = AppConfig::default();
        Self::from(&app)
    }
}

impl From<&AppConfig> for WorkerConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            generation: config.generation.clone(),
            entry_point: config.entry_point.clone(),
            core_assets: config.core_assets.clone(),
            notification_title: config.notification_title.clone(),
            skip_waiting: config.skip_waiting,
        }
    }
}

/// Snapshot of a worker for hosts and diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct WorkerStatus {
    pub state: WorkerState,
    pub scope: String,
    pub generation: String,
    pub skip_waiting: bool,
    pub open_clients: usize,
    pub pending_background: usize,
}

/// One worker instance bound to a scope, a store and a network.
pub struct Worker {
    scope: Scope,
    config: WorkerConfig,
    entry_key: Url,
    store: CacheDb,
    network: Arc<dyn Network>,
    state: RwLock<WorkerState>,
    skip_waiting: AtomicBool,
    clients: ClientSessions,
    background: Mutex<JoinSet<()>>,
}

impl Worker {
    /// Create a worker. Fails if the entry point does not resolve under `scope`.
    pub fn new(scope: Scope, config: WorkerConfig, store: CacheDb, network: Arc<dyn Network>) -> Result<Self, Error> {
        if config.generation.trim().is_empty() {
            return Err(Error::InvalidInput("generation name cannot be empty".into()));
        }
        let entry_key = scope.resolve(&config.entry_point)?;

        Ok(Self {
            scope,
            config,
            entry_key,
            store,
            network,
            state: RwLock::new(WorkerState::Parsed),
            skip_waiting: AtomicBool::new(false),
            clients: ClientSessions::new(),
            background: Mutex::new(JoinSet::new()),
        })
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn generation(&self) -> &str {
        &self.config.generation
    }

    /// Cache key of the offline fallback document.
    pub fn entry_key(&self) -> &Url {
        &self.entry_key
    }

    pub fn store(&self) -> &CacheDb {
        &self.store
    }

    pub fn clients(&self) -> &ClientSessions {
        &self.clients
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    async fn set_state(&self, next: WorkerState) {
        let mut state = self.state.write().await;
        tracing::debug!(generation = %self.config.generation, from = %*state, to = %next, "worker state");
        *state = next;
    }

    /// Allow activation while an older instance still controls sessions.
    pub fn skip_waiting(&self) {
        self.skip_waiting.store(true, Ordering::SeqCst);
    }

    pub fn is_skip_waiting(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Open the current generation. Failures are logged and yield `None`.
    async fn current_store(&self) -> Option<StoreHandle> {
        open_store(&self.store, &self.config.generation).await
    }

    /// Number of background refreshes not yet reaped.
    pub async fn pending_background(&self) -> usize {
        let mut set = self.background.lock().await;
        while set.try_join_next().is_some() {}
        set.len()
    }

    /// Wait for every detached background refresh to finish.
    ///
    /// The lock is only held to swap the pending set out, so cache hits keep
    /// spawning refreshes while this waits. Those are picked up by the next
    /// round of the loop.
    pub async fn settle_background(&self) {
        loop {
            let mut set = {
                let mut guard = self.background.lock().await;
                if guard.is_empty() {
                    break;
                }
                std::mem::take(&mut *guard)
            };

            while let Some(result) = set.join_next().await {
                if let Err(e) = result {
                    tracing::debug!(error = %e, "background refresh task aborted");
                }
            }
        }
    }

    /// Register a session opened by a navigation.
    ///
    /// The session is controlled by this worker's generation if the worker is
    /// already active, otherwise it stays uncontrolled until `activate` claims it.
    pub async fn open_client(&self, id: &str) {
        let controller = match self.state().await {
            WorkerState::Activated => Some(self.config.generation.as_str()),
            _ => None,
        };
        self.clients.open(id, controller).await;
        tracing::debug!(client = id, controlled = controller.is_some(), "client opened");
    }

    pub async fn close_client(&self, id: &str) -> bool {
        self.clients.close(id).await
    }

    pub async fn status(&self) -> WorkerStatus {
        WorkerStatus {
            state: self.state().await,
            scope: self.scope.to_string(),
            generation: self.config.generation.clone(),
            skip_waiting: self.is_skip_waiting(),
            open_clients: self.clients.len().await,
            pending_background: self.pending_background().await,
        }
    }
}

async fn open_store(db: &CacheDb, generation: &str) -> Option<StoreHandle> {
    match db.open_generation(generation).await {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(generation, error = %e, "failed to open cache generation");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[tokio::test]
    async fn test_new_worker_is_parsed() {
        let (network, db) = seeded_network().await;
        let worker = worker_with(network, db, "v1");
        assert_eq!(worker.state().await, WorkerState::Parsed);
        assert_eq!(worker.entry_key().as_str(), "https://user.github.io/repo/index.html");
        assert!(!worker.is_skip_waiting());
    }

    #[tokio::test]
    async fn test_new_worker_rejects_empty_generation() {
        let (network, db) = seeded_network().await;
        let result = Worker::new(Scope::parse(SCOPE).unwrap(), config(" "), db, network);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_status() {
        let (worker, _network, _db) = active_worker("v2").await;
        worker.clients().open("tab-1", None).await;

        let status = worker.status().await;
        assert_eq!(status.state, WorkerState::Activated);
        assert_eq!(status.generation, "v2");
        assert_eq!(status.scope, SCOPE);
        assert_eq!(status.open_clients, 1);
        assert_eq!(status.pending_background, 0);
    }

    #[test]
    fn test_worker_config_from_app() {
        let app = AppConfig { generation: "site-v9".into(), ..Default::default() };
        let config = WorkerConfig::from(&app);
        assert_eq!(config.generation, "site-v9");
        assert_eq!(config.entry_point, "index.html");
        assert_eq!(config.core_assets.len(), 3);
    }
}
