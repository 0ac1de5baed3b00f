//! Smoke detector alarm output.
//!
//! Open-drain alarm contact: the detector pulls the line LOW while it is in
//! alarm. Pull-up input.

use core::fmt;

use super::monitor::{BinaryState, Level, Pull, SensorKind, SensorMonitor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmokeState {
    NotDetected,
    Detected,
}

impl BinaryState for SmokeState {
    fn is_active(self) -> bool {
        self == Self::Detected
    }

    fn label(self) -> &'static str {
        match self {
            Self::NotDetected => "Smoke cleared",
            Self::Detected => "Smoke detected",
        }
    }
}

impl fmt::Display for SmokeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub struct Smoke;

impl SensorKind for Smoke {
    type State = SmokeState;
    const NAME: &'static str = "smoke";
    const ACTIVE_LEVEL: Level = Level::Low;
    const PULL: Pull = Pull::Up;
    const INACTIVE: SmokeState = SmokeState::NotDetected;
    const ACTIVE: SmokeState = SmokeState::Detected;
}

pub type SmokeMonitor<P> = SensorMonitor<Smoke, P>;
