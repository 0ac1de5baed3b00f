//! System configuration parameters
//!
//! All tunable parameters for the sensor node.
//! Values can be overridden via NVS (non-volatile storage).

use serde::{Deserialize, Serialize};

use crate::adapters::utils::is_printable_ascii;

/// Advertised BLE local name when nothing else is configured.
pub const DEFAULT_DEVICE_NAME: &str = "Physics BLE";

/// Upper bound for the per-iteration pacing delay.
pub const MAX_POLL_INTERVAL_MS: u32 = 1000;
/// Range for the wait between connection checks while no central is present.
pub const IDLE_WAIT_RANGE_MS: core::ops::RangeInclusive<u32> = 10..=5000;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- BLE ---
    /// Advertised local name
    pub device_name: heapless::String<24>,

    // --- Timing ---
    /// Delay between polling iterations while connected (milliseconds, 0 = none)
    pub poll_interval_ms: u32,
    /// Delay between connection checks while advertising (milliseconds)
    pub idle_wait_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut device_name = heapless::String::new();
        // Fits: the default name is shorter than the 24-byte capacity.
        let _ = device_name.push_str(DEFAULT_DEVICE_NAME);
        Self {
            device_name,
            poll_interval_ms: 10, // ~100 Hz
            idle_wait_ms: 100,
        }
    }
}

impl SystemConfig {
    /// Range-check every field. Returns the name of the first bad field.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.device_name.is_empty() || !is_printable_ascii(&self.device_name) {
            return Err("device_name must be 1-24 printable ASCII bytes");
        }
        if self.poll_interval_ms > MAX_POLL_INTERVAL_MS {
            return Err("poll_interval_ms must be <= 1000");
        }
        if !IDLE_WAIT_RANGE_MS.contains(&self.idle_wait_ms) {
            return Err("idle_wait_ms must be in 10..=5000");
        }
        Ok(())
    }
}
