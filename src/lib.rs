//! Meshsense firmware library.
//!
//! The sensor abstraction and inter-task data pipeline of a mesh sensor
//! node: a fixed-capacity registry of pluggable drivers and the scheduler
//! task that turns on-demand commands and idle-time polling into a
//! stream of readings for the mesh uplink.
//!
//! The whole library builds and tests on host; the few ESP-IDF-specific
//! pieces are guarded by `#[cfg(target_os = "espidf")]` within their
//! modules.

#![deny(unused_must_use)]

pub mod config;
pub mod drivers;
pub mod error;
pub mod sensorif;
pub mod uplink;

mod esp_link_shims;
