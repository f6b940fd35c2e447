//! # hearth-core
//!
//! Foundation types for the Hearth realtime services.
//!
//! This crate provides the shared vocabulary the realtime crates depend on:
//!
//! - **Branded IDs**: `ConnectionId`, `UserId`, `HouseholdId`, `EventId` as
//!   newtypes for type safety

#![deny(unsafe_code)]

pub mod ids;

pub use ids::{ConnectionId, EventId, HouseholdId, UserId};
