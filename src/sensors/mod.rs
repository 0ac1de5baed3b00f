//! Sensor subsystem — the three binary monitors and the [`SensorHub`]
//! that polls them in a fixed order.
//!
//! Each monitor is an independent instance of the generic
//! [`SensorMonitor`](monitor::SensorMonitor); there is no cross-sensor
//! logic here.

pub mod door;
pub mod monitor;
pub mod pir;
pub mod smoke;

use core::fmt;

use door::DoorMonitor;
use monitor::{BinaryState, SensorInput};
use pir::PirMonitor;
use smoke::SmokeMonitor;

/// Identifies one of the three sensors on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorId {
    Pir,
    Door,
    Smoke,
}

impl SensorId {
    /// Order in which the hub polls the sensors every iteration.
    pub const POLL_ORDER: [SensorId; 3] = [SensorId::Pir, SensorId::Door, SensorId::Smoke];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Pir => "pir",
            Self::Door => "door",
            Self::Smoke => "smoke",
        }
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One detected edge, reduced to "which sensor" and "alerting or not".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorEvent {
    pub sensor: SensorId,
    pub active: bool,
    /// Human-readable new state ("Door open", "Smoke cleared", ...).
    pub label: &'static str,
}

impl SensorEvent {
    fn from_state<S: BinaryState>(sensor: SensorId, state: S) -> Self {
        Self {
            sensor,
            active: state.is_active(),
            label: state.label(),
        }
    }
}

/// Owns the three monitors.
pub struct SensorHub<D, P, S>
where
    D: SensorInput,
    P: SensorInput,
    S: SensorInput,
{
    pub door: DoorMonitor<D>,
    pub pir: PirMonitor<P>,
    pub smoke: SmokeMonitor<S>,
}

impl<D, P, S> SensorHub<D, P, S>
where
    D: SensorInput,
    P: SensorInput,
    S: SensorInput,
{
    pub fn new(door: DoorMonitor<D>, pir: PirMonitor<P>, smoke: SmokeMonitor<S>) -> Self {
        Self { door, pir, smoke }
    }

    /// Poll a single sensor.
    pub fn poll(&mut self, sensor: SensorId) -> Option<SensorEvent> {
        match sensor {
            SensorId::Pir => self.pir.poll().map(|s| SensorEvent::from_state(sensor, s)),
            SensorId::Door => self.door.poll().map(|s| SensorEvent::from_state(sensor, s)),
            SensorId::Smoke => self.smoke.poll().map(|s| SensorEvent::from_state(sensor, s)),
        }
    }

    /// Poll every sensor in [`SensorId::POLL_ORDER`], handing each edge to
    /// `on_event` before the next sensor is sampled.
    pub fn poll_all(&mut self, mut on_event: impl FnMut(SensorEvent)) -> usize {
        let mut edges = 0;
        for sensor in SensorId::POLL_ORDER {
            if let Some(event) = self.poll(sensor) {
                edges += 1;
                on_event(event);
            }
        }
        edges
    }

    /// Whether `sensor` is currently in its alerting state.
    pub fn is_active(&self, sensor: SensorId) -> bool {
        match sensor {
            SensorId::Pir => self.pir.status().is_active(),
            SensorId::Door => self.door.status().is_active(),
            SensorId::Smoke => self.smoke.status().is_active(),
        }
    }
}
