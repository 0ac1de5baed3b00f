//! binsense firmware library.
//!
//! Exposes the sensor core, the application service and the adapters for
//! integration testing. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod events;

pub mod error;
pub mod pins;

pub mod adapters;
pub mod drivers;
pub mod sensors;
