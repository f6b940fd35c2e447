//! Task CRUD event payloads.

use serde::{Deserialize, Serialize};

/// Payload for `task_created` events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreatedPayload {
    /// Task ID.
    pub task_id: String,
    /// Task title.
    pub title: String,
    /// User the task is assigned to, if any.
    pub assignee_id: Option<String>,
    /// Due date (ISO-8601 date), if any.
    pub due_date: Option<String>,
    /// Reward points for completing the task.
    pub points: i64,
}

/// Payload for `task_updated` events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdatedPayload {
    /// Task ID.
    pub task_id: String,
    /// Task title.
    pub title: String,
    /// Which fields changed.
    pub changed_fields: Vec<String>,
}

/// Payload for `task_completed` events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCompletedPayload {
    /// Task ID.
    pub task_id: String,
    /// User who completed the task.
    pub completed_by: String,
    /// Completion timestamp.
    pub completed_at: String,
    /// Points awarded.
    pub points_awarded: i64,
}

/// Payload for `task_deleted` events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDeletedPayload {
    /// Task ID.
    pub task_id: String,
    /// Task title.
    pub title: String,
}
