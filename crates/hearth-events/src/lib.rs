//! # hearth-events
//!
//! Domain event vocabulary for Hearth realtime delivery.
//!
//! - [`EventType`]: the fixed set of push event discriminators, each with an
//!   exact `#[serde(rename)]` matching the wire string clients switch on
//! - [`PushEvent`]: the envelope handed to the fan-out layer (household
//!   scope, optional user scope, JSON payload, timestamp, event id)
//! - `payloads`: typed payload structs for each event type
//!
//! The fan-out layer does not validate payload shape; these structs are the
//! contract between the business-logic producers and the clients.

#![deny(unsafe_code)]

pub mod envelope;
pub mod event_type;
pub mod payloads;

pub use envelope::PushEvent;
pub use event_type::{EventType, ALL_EVENT_TYPES};
