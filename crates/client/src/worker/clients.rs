//! Open client sessions and which generation controls each.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Registry of open client sessions (pages) in the governed scope.
///
/// A session with no controller was loaded before any worker was active.
/// `claim` puts every open session under the claiming generation without a
/// reload.
#[derive(Clone, Default, Debug)]
pub struct ClientSessions {
    sessions: Arc<RwLock<HashMap<String, Option<String>>>>,
}

impl ClientSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an open session, optionally already controlled by `controller`.
    pub async fn open(&self, id: &str, controller: Option<&str>) {
        self.sessions
            .write()
            .await
            .insert(id.to_string(), controller.map(str::to_string));
    }

    pub async fn close(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn controller(&self, id: &str) -> Option<String> {
        self.sessions.read().await.get(id).cloned().flatten()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether any open session is controlled by a generation other than `generation`.
    pub async fn has_other_controller(&self, generation: &str) -> bool {
        self.sessions
            .read()
            .await
            .values()
            .any(|controller| controller.as_deref().is_some_and(|c| c != generation))
    }

    /// Take control of every open session. Returns how many changed controller.
    pub async fn claim(&self, generation: &str) -> usize {
        let mut sessions = self.sessions.write().await;
        let mut changed = 0;
        for controller in sessions.values_mut() {
            if controller.as_deref() != Some(generation) {
                *controller = Some(generation.to_string());
                changed += 1;
            }
        }
        changed
    }
}
