//! Prometheus metrics recorder and metric name constants.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the `PrometheusHandle` used to render the metrics endpoint.
/// Must be called once at server startup before any metrics are recorded.
pub fn install_recorder() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install metrics recorder");
    info!("prometheus metrics recorder installed");
    handle
}

/// Render Prometheus text format from the installed recorder.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

// Metric name constants to avoid typos across call sites.

/// Push connections opened total (counter).
pub const SSE_CONNECTIONS_TOTAL: &str = "sse_connections_total";
/// Push connections removed total (counter).
pub const SSE_DISCONNECTIONS_TOTAL: &str = "sse_disconnections_total";
/// Open push connections (gauge).
pub const SSE_CONNECTIONS_ACTIVE: &str = "sse_connections_active";
/// Event frames delivered total (counter).
pub const SSE_EVENTS_SENT_TOTAL: &str = "sse_events_sent_total";
/// Frames dropped on full send queues total (counter).
pub const SSE_BROADCAST_DROPS_TOTAL: &str = "sse_broadcast_drops_total";
/// Connections evicted on closed sinks total (counter).
pub const SSE_EVICTIONS_TOTAL: &str = "sse_evictions_total";
/// Keepalive pings delivered total (counter).
pub const SSE_PINGS_TOTAL: &str = "sse_pings_total";
/// Connections evicted by the stale sweep total (counter).
pub const SSE_STALE_EVICTIONS_TOTAL: &str = "sse_stale_evictions_total";
