//! Per-connection state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use hearth_core::{ConnectionId, HouseholdId, UserId};
use parking_lot::Mutex;

use crate::sink::{EventSink, SinkError};

/// One open push channel to a client.
///
/// Identity is immutable for the connection's lifetime; the sink is owned
/// exclusively by this record and nothing else writes to it.
pub struct Connection {
    /// Unique connection ID, allocated at registration.
    pub id: ConnectionId,
    /// Owning user.
    pub user_id: UserId,
    /// Owning household.
    pub household_id: HouseholdId,
    /// Exclusive write capability to the client.
    sink: Box<dyn EventSink>,
    /// When the last frame was successfully enqueued (including pings).
    last_activity: Mutex<Instant>,
    /// Frames dropped because the send queue was full.
    dropped_frames: AtomicU64,
}

impl Connection {
    /// Create a connection record around a sink.
    #[must_use]
    pub fn new(
        id: ConnectionId,
        user_id: UserId,
        household_id: HouseholdId,
        sink: Box<dyn EventSink>,
    ) -> Self {
        Self {
            id,
            user_id,
            household_id,
            sink,
            last_activity: Mutex::new(Instant::now()),
            dropped_frames: AtomicU64::new(0),
        }
    }

    /// Write a frame to the client.
    ///
    /// Refreshes the activity timestamp on success. A full queue counts a
    /// dropped frame; the activity timestamp is deliberately not refreshed
    /// on failure, so a persistently full connection goes stale.
    pub fn send(&self, frame: Arc<String>) -> Result<(), SinkError> {
        match self.sink.try_send(frame) {
            Ok(()) => {
                *self.last_activity.lock() = Instant::now();
                Ok(())
            }
            Err(SinkError::Full) => {
                let _ = self.dropped_frames.fetch_add(1, Ordering::Relaxed);
                Err(SinkError::Full)
            }
            Err(e) => Err(e),
        }
    }

    /// Time since the last successful send.
    pub fn idle_for(&self) -> Duration {
        self.last_activity.lock().elapsed()
    }

    /// Total frames dropped for this connection.
    pub fn drop_count(&self) -> u64 {
        self.dropped_frames.load(Ordering::Relaxed)
    }

    /// Close the underlying sink.
    pub fn close(&self) {
        self.sink.close();
    }
}
