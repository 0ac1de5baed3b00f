//! Port traits — the hexagonal boundary between the sensor core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! The BLE adapter implements the link, status and command ports; the
//! hardware adapter implements the indicator port. The
//! [`AppService`](super::service::AppService) consumes them via generics.

use crate::config::SystemConfig;

// ───────────────────────────────────────────────────────────────
// BLE link (driven adapter: radio → domain)
// ───────────────────────────────────────────────────────────────

/// 48-bit Bluetooth device address, most significant byte first.
pub type PeerAddress = [u8; 6];

/// Connection state of the wireless link.
pub trait LinkPort {
    /// `true` while a central is connected. Polling runs only while this holds.
    fn is_connected(&self) -> bool;

    /// Address of the connected central, if any.
    fn peer(&self) -> Option<PeerAddress>;
}

/// Write-side of the sensor status characteristic.
pub trait StatusPort {
    /// Store `bits` as the characteristic value and notify subscribed centrals.
    fn publish_status(&mut self, bits: u8);
}

/// Read-side of the LED command characteristic.
pub trait CommandPort {
    /// Take the most recent byte written by the central, if one is pending.
    fn take_command(&mut self) -> Option<u8>;
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → LEDs)
// ───────────────────────────────────────────────────────────────

pub trait IndicatorPort {
    /// Light exactly the requested RGB channels; the others go dark.
    fn set_rgb(&mut self, red: bool, green: bool, blue: bool);

    /// Built-in LED showing whether a central is connected.
    fn set_link(&mut self, on: bool);

    /// Everything dark.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations must validate before persisting and return
/// [`ConfigError::ValidationFailed`] instead of clamping.
pub trait ConfigPort {
    /// Load configuration. Returns [`SystemConfig::default()`] if nothing
    /// is stored yet.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
