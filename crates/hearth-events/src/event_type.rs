//! The [`EventType`] enum — all push event type discriminators.
//!
//! Every variant has an exact `#[serde(rename)]` matching the string the
//! web and mobile clients switch on (e.g., `"task_created"`). The same
//! string is written into the `event:` field of each delivered frame, so
//! these renames are wire-format compatibility, not style.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// All push event types.
///
/// Each variant serializes to the exact snake_case string that connected
/// clients expect in the `event:` field of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    // -- Tasks --
    /// A task was created in the household.
    #[serde(rename = "task_created")]
    TaskCreated,
    /// A task's fields changed.
    #[serde(rename = "task_updated")]
    TaskUpdated,
    /// A task was marked complete.
    #[serde(rename = "task_completed")]
    TaskCompleted,
    /// A task was deleted.
    #[serde(rename = "task_deleted")]
    TaskDeleted,

    // -- Notifications --
    /// A new in-app notification was raised for a user.
    #[serde(rename = "notification_new")]
    NotificationNew,

    // -- Rewards --
    /// A user's allowance balance changed.
    #[serde(rename = "balance_updated")]
    BalanceUpdated,
    /// A user's completion streak changed.
    #[serde(rename = "streak_updated")]
    StreakUpdated,
}

/// All event type variants in definition order.
///
/// Useful for iteration in tests.
pub const ALL_EVENT_TYPES: [EventType; 7] = [
    EventType::TaskCreated,
    EventType::TaskUpdated,
    EventType::TaskCompleted,
    EventType::TaskDeleted,
    EventType::NotificationNew,
    EventType::BalanceUpdated,
    EventType::StreakUpdated,
];

impl EventType {
    /// Return the canonical string representation (e.g., `"task_created"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TaskCreated => "task_created",
            Self::TaskUpdated => "task_updated",
            Self::TaskCompleted => "task_completed",
            Self::TaskDeleted => "task_deleted",
            Self::NotificationNew => "notification_new",
            Self::BalanceUpdated => "balance_updated",
            Self::StreakUpdated => "streak_updated",
        }
    }

    /// Whether this is a task CRUD event (`task_*`).
    #[must_use]
    pub fn is_task_type(self) -> bool {
        matches!(
            self,
            Self::TaskCreated | Self::TaskUpdated | Self::TaskCompleted | Self::TaskDeleted
        )
    }

    /// Whether this event concerns a single user rather than the whole
    /// household (producers scope these with a user id).
    #[must_use]
    pub fn is_user_scoped_type(self) -> bool {
        matches!(
            self,
            Self::NotificationNew | Self::BalanceUpdated | Self::StreakUpdated
        )
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        // Use serde to parse — the `#[serde(rename)]` attributes are the source of truth.
        serde_json::from_value(serde_json::Value::String(s.to_owned()))
            .map_err(|_| format!("unknown event type: {s}"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
