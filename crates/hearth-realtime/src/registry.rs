//! The authoritative store of open push connections.
//!
//! One primary table keyed by connection id, plus secondary index sets by
//! household and by user. All three structures live behind a single
//! `RwLock` and every mutation updates them in one critical section, so a
//! connection id appears in an index set if and only if the primary table
//! holds a record with that scope.
//!
//! The registry is constructed explicitly and shared via `Arc`. There is
//! no process-global instance; each test constructs a fresh one.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use hearth_core::{ConnectionId, HouseholdId, UserId};
use metrics::{counter, gauge};
use tokio::sync::RwLock;
use tracing::debug;

use crate::connection::Connection;
use crate::metrics::{SSE_CONNECTIONS_ACTIVE, SSE_CONNECTIONS_TOTAL, SSE_DISCONNECTIONS_TOTAL};
use crate::sink::EventSink;

#[derive(Default)]
struct RegistryInner {
    connections: HashMap<ConnectionId, Arc<Connection>>,
    by_household: HashMap<HouseholdId, HashSet<ConnectionId>>,
    by_user: HashMap<UserId, HashSet<ConnectionId>>,
}

/// Store of open connections, indexed by household and by user.
///
/// Knows nothing about event content; delivery lives in
/// [`EventBroadcaster`](crate::broadcaster::EventBroadcaster).
pub struct ConnectionRegistry {
    inner: RwLock<RegistryInner>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    /// Register a new connection and make it immediately eligible for
    /// broadcasts. Always succeeds; identity values are taken as given
    /// (the accepting layer has already authenticated them).
    pub async fn register(
        &self,
        user_id: UserId,
        household_id: HouseholdId,
        sink: Box<dyn EventSink>,
    ) -> ConnectionId {
        let id = ConnectionId::new();
        let connection = Arc::new(Connection::new(
            id.clone(),
            user_id.clone(),
            household_id.clone(),
            sink,
        ));
        {
            let mut inner = self.inner.write().await;
            let _ = inner.connections.insert(id.clone(), connection);
            let _ = inner
                .by_household
                .entry(household_id.clone())
                .or_default()
                .insert(id.clone());
            let _ = inner.by_user.entry(user_id.clone()).or_default().insert(id.clone());
        }
        counter!(SSE_CONNECTIONS_TOTAL).increment(1);
        gauge!(SSE_CONNECTIONS_ACTIVE).increment(1.0);
        debug!(
            connection_id = %id,
            user_id = %user_id,
            household_id = %household_id,
            "connection registered"
        );
        id
    }

    /// Remove a connection and close its sink.
    ///
    /// Idempotent: removing an unknown or already-removed id is a silent
    /// no-op returning `false`. Index sets that become empty are dropped.
    pub async fn remove(&self, id: &ConnectionId) -> bool {
        let connection = {
            let mut inner = self.inner.write().await;
            let Some(connection) = inner.connections.remove(id) else {
                return false;
            };
            if let Some(set) = inner.by_household.get_mut(&connection.household_id) {
                let _ = set.remove(id);
                if set.is_empty() {
                    let _ = inner.by_household.remove(&connection.household_id);
                }
            }
            if let Some(set) = inner.by_user.get_mut(&connection.user_id) {
                let _ = set.remove(id);
                if set.is_empty() {
                    let _ = inner.by_user.remove(&connection.user_id);
                }
            }
            connection
        };
        connection.close();
        counter!(SSE_DISCONNECTIONS_TOTAL).increment(1);
        gauge!(SSE_CONNECTIONS_ACTIVE).decrement(1.0);
        debug!(connection_id = %id, "connection removed");
        true
    }

    /// Look up a connection by id.
    pub async fn get(&self, id: &ConnectionId) -> Option<Arc<Connection>> {
        self.inner.read().await.connections.get(id).cloned()
    }

    /// Number of open connections for a household (0 if unknown).
    pub async fn connection_count(&self, household_id: &HouseholdId) -> usize {
        self.inner
            .read()
            .await
            .by_household
            .get(household_id)
            .map_or(0, HashSet::len)
    }

    /// Connection ids open for a user (empty if unknown).
    pub async fn connections_for_user(&self, user_id: &UserId) -> Vec<ConnectionId> {
        self.inner
            .read()
            .await
            .by_user
            .get(user_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot the connections of a household for fan-out. The lock is
    /// released before any sink I/O happens.
    pub async fn household_connections(&self, household_id: &HouseholdId) -> Vec<Arc<Connection>> {
        let inner = self.inner.read().await;
        inner
            .by_household
            .get(household_id)
            .map(|set| {
                set.iter()
                    .filter_map(|id| inner.connections.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Snapshot the connections of a user for fan-out.
    pub async fn user_connections(&self, user_id: &UserId) -> Vec<Arc<Connection>> {
        let inner = self.inner.read().await;
        inner
            .by_user
            .get(user_id)
            .map(|set| {
                set.iter()
                    .filter_map(|id| inner.connections.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Snapshot every open connection (used by the stale sweep).
    pub async fn all_connections(&self) -> Vec<Arc<Connection>> {
        self.inner.read().await.connections.values().cloned().collect()
    }

    /// Total number of open connections.
    pub async fn total_connections(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    /// Per-household connection counts, taken in one lock acquisition so
    /// the numbers are mutually consistent.
    pub async fn household_counts(&self) -> HashMap<HouseholdId, usize> {
        self.inner
            .read()
            .await
            .by_household
            .iter()
            .map(|(household, set)| (household.clone(), set.len()))
            .collect()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
