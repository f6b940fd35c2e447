//! Read-only registry aggregation for observability.

use std::collections::HashMap;
use std::sync::Arc;

use hearth_core::HouseholdId;
use serde::Serialize;

use crate::registry::ConnectionRegistry;

/// Snapshot of registry occupancy, for a health/metrics endpoint.
///
/// Operational data only; business logic must not branch on this.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStats {
    /// Size of the primary connection table.
    pub total_connections: usize,
    /// Number of households with at least one open connection.
    pub households_active: usize,
    /// Open connection count per active household.
    pub connections_by_household: HashMap<HouseholdId, usize>,
}

/// Read-only view over a registry.
pub struct StatsReporter {
    registry: Arc<ConnectionRegistry>,
}

impl StatsReporter {
    /// Create a reporter over a registry.
    #[must_use]
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Take a mutually-consistent snapshot of registry occupancy.
    pub async fn stats(&self) -> RegistryStats {
        // One lock acquisition: totals are derived from the same counts
        // they are reported beside.
        let connections_by_household = self.registry.household_counts().await;
        RegistryStats {
            total_connections: connections_by_household.values().sum(),
            households_active: connections_by_household.len(),
            connections_by_household,
        }
    }
}
