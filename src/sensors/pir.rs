//! PIR motion sensor.
//!
//! The PIR module drives its output HIGH for as long as it is re-triggered
//! by motion and lets it fall back LOW after its own hold time. The line
//! uses a pull-down so an unplugged module reads as "no presence".

use core::fmt;

use super::monitor::{BinaryState, Level, Pull, SensorKind, SensorMonitor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceState {
    NotDetected,
    Detected,
}

impl BinaryState for PresenceState {
    fn is_active(self) -> bool {
        self == Self::Detected
    }

    fn label(self) -> &'static str {
        match self {
            Self::NotDetected => "Presence cleared",
            Self::Detected => "Presence detected",
        }
    }
}

impl fmt::Display for PresenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub struct Pir;

impl SensorKind for Pir {
    type State = PresenceState;
    const NAME: &'static str = "pir";
    const ACTIVE_LEVEL: Level = Level::High;
    const PULL: Pull = Pull::Down;
    const INACTIVE: PresenceState = PresenceState::NotDetected;
    const ACTIVE: PresenceState = PresenceState::Detected;
}

pub type PirMonitor<P> = SensorMonitor<Pir, P>;
