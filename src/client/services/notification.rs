//! In-app notifications.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::request::{with_fallback, RequestError, RequestService, Sourced};
use crate::client::services::demo;
use crate::procedure;

const LIST_TIMEOUT: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRef {
    pub notification_id: Uuid,
}

procedure!(ListNotifications, "notification", "list", () => Vec<Notification>);
procedure!(MarkRead, "notification", "markRead", NotificationRef => ());

#[derive(Debug, Clone)]
pub struct NotificationService {
    base: RequestService,
}

impl NotificationService {
    pub fn new(base: RequestService) -> Self {
        Self { base }
    }

    pub async fn list(&self) -> Sourced<Vec<Notification>> {
        let base = self.base.clone();
        with_fallback(
            async move { base.call::<ListNotifications>(&()).await },
            LIST_TIMEOUT,
            demo::notifications,
        )
        .await
    }

    pub async fn unread_count(&self) -> Sourced<usize> {
        self.list()
            .await
            .map(|notifications| notifications.iter().filter(|n| !n.read).count())
    }

    pub async fn mark_read(&self, notification_id: Uuid) -> Result<(), RequestError> {
        self.base
            .call::<MarkRead>(&NotificationRef { notification_id })
            .await
    }
}
