//! Notification event payloads.

use serde::{Deserialize, Serialize};

/// Payload for `notification_new` events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationNewPayload {
    /// Notification ID.
    pub notification_id: String,
    /// Short title shown in the notification list.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Category (e.g. `"reminder"`, `"reward"`, `"system"`).
    pub category: String,
    /// Deep link into the app, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}
