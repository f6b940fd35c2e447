//! Event bridge — routes producer events into the fan-out layer.
//!
//! Business logic emits by sending a [`PushEvent`] on a
//! `tokio::sync::broadcast` channel; the bridge owns a receiver and picks
//! the delivery scope: events carrying a user id go only to that user's
//! connections, everything else goes to the whole household.

use std::sync::Arc;

use hearth_events::PushEvent;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::broadcaster::EventBroadcaster;

/// Bridges domain events from producers to connected clients.
pub struct EventBridge {
    rx: broadcast::Receiver<PushEvent>,
    broadcaster: Arc<EventBroadcaster>,
}

impl EventBridge {
    /// Create a new bridge.
    #[must_use]
    pub fn new(rx: broadcast::Receiver<PushEvent>, broadcaster: Arc<EventBroadcaster>) -> Self {
        Self { rx, broadcaster }
    }

    /// Run the bridge loop. Exits when the producer sender is dropped.
    #[tracing::instrument(skip_all, name = "event_bridge")]
    pub async fn run(mut self) {
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    debug!(
                        event_type = %event.event_type,
                        household_id = %event.household_id,
                        "bridging event to clients"
                    );
                    if let Some(user_id) = event.user_id.clone() {
                        let _ = self.broadcaster.broadcast_to_user(&user_id, &event).await;
                    } else {
                        let _ = self
                            .broadcaster
                            .broadcast_to_household(&event.household_id, &event)
                            .await;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(lagged = n, "event bridge lagged, events skipped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("event bridge: producer channel closed, exiting");
                    break;
                }
            }
        }
    }
}
