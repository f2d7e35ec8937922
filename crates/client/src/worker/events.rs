//! Background sync and push handlers.
//!
//! Both are placeholders for host integrations: sync resolves immediately,
//! push turns a text payload into a notification description that the host
//! displays. Notification action clicks are not handled here.

use offline_core::Error;
use serde::{Deserialize, Serialize};

use super::Worker;

/// Tag the host uses when connectivity returns.
pub const BACKGROUND_SYNC_TAG: &str = "background-sync";

const ICON: &str = "icons/icon-192x192.png";
const BADGE: &str = "icons/icon-72x72.png";
const VIEW_ICON: &str = "icons/checkmark.png";
const CLOSE_ICON: &str = "icons/xmark.png";
const VIBRATE: [u32; 3] = [100, 50, 100];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Recognized tag; nothing to flush yet.
    Handled,
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NotificationData {
    /// Milliseconds since the Unix epoch.
    pub date_of_arrival: i64,
    pub primary_key: u32,
}

/// A user-visible notification for the host to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

impl Worker {
    pub async fn handle_sync(&self, tag: &str) -> SyncOutcome {
        if tag == BACKGROUND_SYNC_TAG {
            tracing::debug!(tag, "background sync");
            SyncOutcome::Handled
        } else {
            tracing::trace!(tag, "ignoring sync tag");
            SyncOutcome::Ignored
        }
    }

    /// Build the notification for a push payload. No payload, no notification.
    pub fn handle_push(&self, payload: Option<&str>) -> Result<Option<Notification>, Error> {
        let Some(body) = payload else {
            return Ok(None);
        };

        let locate = |path: &str| self.scope.resolve(path).map(String::from);

        let notification = Notification {
            title: self.config.notification_title.clone(),
            body: body.to_string(),
            icon: locate(ICON)?,
            badge: locate(BADGE)?,
            vibrate: VIBRATE.to_vec(),
            data: NotificationData { date_of_arrival: chrono::Utc::now().timestamp_millis(), primary_key: 1 },
            actions: vec![
                NotificationAction { action: "view".into(), title: "View".into(), icon: locate(VIEW_ICON)? },
                NotificationAction { action: "close".into(), title: "Close".into(), icon: locate(CLOSE_ICON)? },
            ],
        };

        tracing::info!(title = %notification.title, "push notification");
        Ok(Some(notification))
    }
}
