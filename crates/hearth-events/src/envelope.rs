//! The [`PushEvent`] envelope handed to the fan-out layer.

use chrono::{SecondsFormat, Utc};
use hearth_core::{EventId, HouseholdId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event_type::EventType;

/// A server-side domain event destined for connected clients.
///
/// Producers construct one of these whenever business logic raises an event
/// (task mutation handlers, balance/streak calculators, notification
/// schedulers) and hand it to the realtime layer. The envelope carries
/// routing scope only; payload shape is the producer's contract with the
/// clients and is not validated here.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushEvent {
    /// Event type discriminator.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// The household whose connections this event targets.
    pub household_id: HouseholdId,
    /// Narrower target: when present, only this user's connections receive
    /// the event (balances, streaks, personal notifications).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// ISO-8601 timestamp with millisecond precision.
    pub timestamp: String,
    /// Event payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Delivery id for client-side deduplication. Stamped by the
    /// broadcaster at send time if the producer did not set one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
}

impl PushEvent {
    /// Create a household-scoped event with the current UTC timestamp.
    pub fn new(
        event_type: EventType,
        household_id: impl Into<HouseholdId>,
        payload: Option<Value>,
    ) -> Self {
        Self {
            event_type,
            household_id: household_id.into(),
            user_id: None,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            payload,
            event_id: None,
        }
    }

    /// Narrow the event to a single user's connections.
    #[must_use]
    pub fn for_user(mut self, user_id: impl Into<UserId>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Attach a pre-assigned delivery id.
    #[must_use]
    pub fn with_event_id(mut self, event_id: EventId) -> Self {
        self.event_id = Some(event_id);
        self
    }
}
