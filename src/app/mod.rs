//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the rules that sit on top of the sensor monitors:
//! status-byte aggregation, session orchestration and LED commands.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod status;
