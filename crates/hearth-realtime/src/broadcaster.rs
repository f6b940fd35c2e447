//! Event fan-out to connected clients.

use std::sync::Arc;

use hearth_core::{ConnectionId, EventId, HouseholdId, UserId};
use hearth_events::PushEvent;
use metrics::counter;
use serde_json::Value;
use tracing::{debug, warn};

use crate::connection::Connection;
use crate::frame;
use crate::metrics::{SSE_BROADCAST_DROPS_TOTAL, SSE_EVENTS_SENT_TOTAL, SSE_EVICTIONS_TOTAL};
use crate::registry::ConnectionRegistry;
use crate::sink::SinkError;

/// Resolves a target set through the registry and delivers one frame to
/// each target independently.
///
/// Framing and payload serialization happen here, once per call; the
/// registry knows nothing about event content. A failing connection never
/// aborts delivery to the rest of the target set, and producers only ever
/// see aggregate success counts.
pub struct EventBroadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl EventBroadcaster {
    /// Create a broadcaster over a registry.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver an event to every connection of a household.
    ///
    /// Returns the number of connections that received the frame. An
    /// unknown household performs zero sends and returns 0.
    pub async fn broadcast_to_household(
        &self,
        household_id: &HouseholdId,
        event: &PushEvent,
    ) -> usize {
        let targets = self.registry.household_connections(household_id).await;
        if targets.is_empty() {
            return 0;
        }
        let Some(block) = encode(event) else { return 0 };
        debug!(
            event_type = %event.event_type,
            household_id = %household_id,
            recipients = targets.len(),
            "broadcast event to household"
        );
        self.deliver(&targets, &block).await
    }

    /// Deliver an event to every connection of a user.
    ///
    /// Never delivers to another user's connections, household-mates
    /// included.
    pub async fn broadcast_to_user(&self, user_id: &UserId, event: &PushEvent) -> usize {
        let targets = self.registry.user_connections(user_id).await;
        if targets.is_empty() {
            return 0;
        }
        let Some(block) = encode(event) else { return 0 };
        debug!(
            event_type = %event.event_type,
            user_id = %user_id,
            recipients = targets.len(),
            "broadcast event to user"
        );
        self.deliver(&targets, &block).await
    }

    /// Deliver an event to one connection.
    ///
    /// Returns `false` (not an error) when the id is unknown or the write
    /// fails.
    pub async fn send_to_connection(&self, id: &ConnectionId, event: &PushEvent) -> bool {
        let Some(connection) = self.registry.get(id).await else {
            return false;
        };
        let Some(block) = encode(event) else { return false };
        self.deliver(&[connection], &block).await == 1
    }

    /// Write one frame to each target, isolating failures.
    async fn deliver(&self, targets: &[Arc<Connection>], block: &Arc<String>) -> usize {
        let mut sent = 0;
        for connection in targets {
            match connection.send(block.clone()) {
                Ok(()) => {
                    sent += 1;
                    counter!(SSE_EVENTS_SENT_TOTAL).increment(1);
                }
                Err(SinkError::Closed) => {
                    warn!(connection_id = %connection.id, "sink closed during delivery, evicting");
                    let _ = self.registry.remove(&connection.id).await;
                    counter!(SSE_EVICTIONS_TOTAL).increment(1);
                }
                Err(SinkError::Full) => {
                    warn!(
                        connection_id = %connection.id,
                        dropped = connection.drop_count(),
                        "send queue full, frame dropped"
                    );
                    counter!(SSE_BROADCAST_DROPS_TOTAL).increment(1);
                }
            }
        }
        sent
    }
}

/// Serialize an event into its wire block, stamping a delivery id if the
/// producer did not set one.
fn encode(event: &PushEvent) -> Option<Arc<String>> {
    let event_id = event.event_id.clone().unwrap_or_else(EventId::new);
    let payload = event.payload.as_ref().unwrap_or(&Value::Null);
    match serde_json::to_string(payload) {
        Ok(json) => Some(Arc::new(frame::encode_event(
            event.event_type.as_str(),
            event_id.as_str(),
            &json,
        ))),
        Err(e) => {
            warn!(event_type = %event.event_type, error = %e, "failed to serialize event payload");
            None
        }
    }
}
