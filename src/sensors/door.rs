//! Reed-switch door sensor.
//!
//! Pull-up input. With the door shut the magnet keeps the line HIGH;
//! opening the door lets it fall LOW.
//!
//! | Edge      | State    |
//! |-----------|----------|
//! | LOW→HIGH  | `Closed` |
//! | HIGH→LOW  | `Opened` |

use core::fmt;

use super::monitor::{BinaryState, Level, Pull, SensorKind, SensorMonitor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorState {
    Closed,
    Opened,
}

impl BinaryState for DoorState {
    fn is_active(self) -> bool {
        self == Self::Opened
    }

    fn label(self) -> &'static str {
        match self {
            Self::Closed => "Door closed",
            Self::Opened => "Door open",
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub struct Door;

impl SensorKind for Door {
    type State = DoorState;
    const NAME: &'static str = "door";
    const ACTIVE_LEVEL: Level = Level::Low;
    const PULL: Pull = Pull::Up;
    const INACTIVE: DoorState = DoorState::Closed;
    const ACTIVE: DoorState = DoorState::Opened;
}

pub type DoorMonitor<P> = SensorMonitor<Door, P>;
