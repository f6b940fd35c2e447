//! Balance and streak event payloads.

use serde::{Deserialize, Serialize};

/// Payload for `balance_updated` events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceUpdatedPayload {
    /// User whose balance changed.
    pub user_id: String,
    /// New balance in points.
    pub balance: i64,
    /// Signed change applied.
    pub delta: i64,
    /// What caused the change (e.g. `"task_completed"`, `"redemption"`).
    pub reason: String,
}

/// Payload for `streak_updated` events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakUpdatedPayload {
    /// User whose streak changed.
    pub user_id: String,
    /// Current streak length in days.
    pub streak_days: i64,
    /// Whether the streak was broken (reset to zero) by this update.
    pub broken: bool,
}
