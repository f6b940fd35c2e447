//! Keepalive pings and stale-connection reclamation.
//!
//! Pings keep intermediary proxies from idling out quiet streams and
//! refresh each connection's activity timestamp. The sweep is the only
//! mechanism that reclaims connections whose client disappeared without a
//! clean disconnect (network partition, crashed tab); everything else
//! relies on the accepting layer calling `remove`.

use std::sync::Arc;
use std::time::Duration;

use hearth_core::ConnectionId;
use metrics::counter;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::RealtimeConfig;
use crate::frame::KEEPALIVE_FRAME;
use crate::metrics::{SSE_EVICTIONS_TOTAL, SSE_PINGS_TOTAL, SSE_STALE_EVICTIONS_TOTAL};
use crate::registry::ConnectionRegistry;
use crate::sink::SinkError;

/// Sends keepalive frames and evicts connections presumed dead.
pub struct KeepAliveManager {
    registry: Arc<ConnectionRegistry>,
    ping_frame: Arc<String>,
}

impl KeepAliveManager {
    /// Create a manager over a registry.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            registry,
            ping_frame: Arc::new(KEEPALIVE_FRAME.to_owned()),
        }
    }

    /// Ping one connection, refreshing its activity timestamp on success.
    ///
    /// Returns `false` for unknown ids and write failures; a closed sink
    /// evicts the connection on the spot.
    pub async fn send_ping(&self, id: &ConnectionId) -> bool {
        let Some(connection) = self.registry.get(id).await else {
            return false;
        };
        match connection.send(self.ping_frame.clone()) {
            Ok(()) => {
                counter!(SSE_PINGS_TOTAL).increment(1);
                true
            }
            Err(SinkError::Closed) => {
                warn!(connection_id = %id, "sink closed during ping, evicting");
                let _ = self.registry.remove(id).await;
                counter!(SSE_EVICTIONS_TOTAL).increment(1);
                false
            }
            Err(SinkError::Full) => false,
        }
    }

    /// Ping every open connection; returns how many pings were delivered.
    pub async fn ping_all(&self) -> usize {
        let connections = self.registry.all_connections().await;
        let mut delivered = 0;
        for connection in connections {
            if self.send_ping(&connection.id).await {
                delivered += 1;
            }
        }
        delivered
    }

    /// Evict every connection idle longer than `max_idle`.
    ///
    /// Eviction goes through the same path as an explicit `remove`, so the
    /// indices stay consistent and the sink is closed. Returns the number
    /// of connections evicted.
    pub async fn cleanup_stale_connections(&self, max_idle: Duration) -> usize {
        let stale: Vec<_> = self
            .registry
            .all_connections()
            .await
            .into_iter()
            .filter(|connection| connection.idle_for() > max_idle)
            .collect();

        let mut evicted = 0;
        for connection in stale {
            if self.registry.remove(&connection.id).await {
                evicted += 1;
                counter!(SSE_STALE_EVICTIONS_TOTAL).increment(1);
                debug!(
                    connection_id = %connection.id,
                    idle = ?connection.idle_for(),
                    "evicted stale connection"
                );
            }
        }
        if evicted > 0 {
            info!(evicted, "stale connection sweep");
        }
        evicted
    }

    /// Self-scheduling driver: ping all connections and sweep once per
    /// configured interval until cancelled. Callers with their own
    /// scheduler can instead invoke [`Self::ping_all`] and
    /// [`Self::cleanup_stale_connections`] directly.
    #[tracing::instrument(skip_all, name = "keepalive")]
    pub async fn run(&self, config: &RealtimeConfig, cancel: CancellationToken) {
        let mut tick = tokio::time::interval(config.ping_interval());
        // Skip the immediate first tick
        let _ = tick.tick().await;
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let _ = self.ping_all().await;
                    let _ = self.cleanup_stale_connections(config.stale_after()).await;
                }
                () = cancel.cancelled() => break,
            }
        }
    }
}
