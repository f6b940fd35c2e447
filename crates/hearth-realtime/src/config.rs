//! Realtime layer configuration.
//!
//! Owned by the embedding server and injected here. The fan-out core
//! ships defaults but no hardcoded policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the realtime fan-out layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Keepalive ping interval in seconds.
    pub ping_interval_secs: u64,
    /// Evict connections with no successful send for this many seconds.
    pub stale_after_secs: u64,
    /// Per-connection send queue capacity in frames.
    pub send_queue_capacity: usize,
}

impl RealtimeConfig {
    /// Ping interval as a [`Duration`].
    #[must_use]
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    /// Stale threshold as a [`Duration`].
    #[must_use]
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            ping_interval_secs: 30,
            stale_after_secs: 90,
            send_queue_capacity: 256,
        }
    }
}
