//! Record types and directory traits for the tmpc container service.
//!
//! This crate contains the serde-serializable shapes of container and tab
//! records as the host's directories deliver them, plus the async traits
//! (`ContainerDirectory`, `TabDirectory`) a host implements to expose those
//! directories. These types represent the "directory layer" - pure data and
//! the seam between the service and its host.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond serialization/deserialization
//! * 1:1 with the host's records: Unrecognized host fields are ignored
//! * Stable: Changes only when the host-facing contract changes
//!
//! The lifecycle logic built on top of these types lives in `tmpc`.

pub mod client;
pub mod event;
pub mod types;

pub use client::*;
pub use event::*;
pub use types::*;
