//! # hearth-realtime
//!
//! Connection registry and event fan-out for Hearth push streams.
//!
//! - Connection registry: authoritative store of open push connections,
//!   indexed by household and by user, behind one lock
//! - Event broadcaster: household/user/single-connection fan-out with
//!   isolated per-connection failures and success counting
//! - Frame encoding: the `event:`/`id:`/`data:` text block format and the
//!   keepalive comment frame
//! - Keepalive: per-connection pings plus a stale-connection sweep,
//!   cancellable via `CancellationToken`
//! - Event bridge: routes producer events from a `tokio::sync::broadcast`
//!   channel into the right fan-out scope
//! - Stats: read-only registry snapshot for health/metrics endpoints
//!
//! The HTTP layer that authenticates clients and owns the transport, the
//! business logic that raises events, and persistence all live elsewhere;
//! this crate only stores connection state and delivers frames.

#![deny(unsafe_code)]

pub mod bridge;
pub mod broadcaster;
pub mod config;
pub mod connection;
pub mod frame;
pub mod keepalive;
pub mod metrics;
pub mod registry;
pub mod sink;
pub mod stats;

pub use bridge::EventBridge;
pub use broadcaster::EventBroadcaster;
pub use config::RealtimeConfig;
pub use connection::Connection;
pub use frame::{parse_event, FrameError, ParsedFrame, KEEPALIVE_FRAME};
pub use keepalive::KeepAliveManager;
pub use registry::ConnectionRegistry;
pub use sink::{ChannelSink, EventSink, SinkError};
pub use stats::{RegistryStats, StatsReporter};
