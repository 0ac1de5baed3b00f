//! Combined status byte published on the sensor characteristic.
//!
//! | Bit | Sensor | Set when           |
//! |-----|--------|--------------------|
//! | 0   | Door   | door opened        |
//! | 1   | Smoke  | smoke detected     |
//! | 2   | PIR    | presence detected  |
//!
//! [`StatusRegister`] is the shared cell the per-sensor subscribers write
//! into. Everything runs on the polling thread, so a `Cell` is enough.

use core::cell::Cell;
use std::rc::Rc;

use crate::sensors::SensorId;
use crate::sensors::monitor::BinaryState;

/// Bitfield of currently-active sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorStatus(u8);

impl SensorStatus {
    pub const EMPTY: Self = Self(0);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL_BITS)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    const ALL_BITS: u8 = 0b0000_0111;

    /// Bit mask for `sensor`.
    pub const fn mask(sensor: SensorId) -> u8 {
        match sensor {
            SensorId::Door => 0b0000_0001,
            SensorId::Smoke => 0b0000_0010,
            SensorId::Pir => 0b0000_0100,
        }
    }

    /// Copy of `self` with `sensor`'s bit set or cleared.
    pub const fn with(self, sensor: SensorId, active: bool) -> Self {
        if active {
            Self(self.0 | Self::mask(sensor))
        } else {
            Self(self.0 & !Self::mask(sensor))
        }
    }

    pub const fn is_set(self, sensor: SensorId) -> bool {
        self.0 & Self::mask(sensor) != 0
    }
}

/// Shared, single-threaded holder of the current [`SensorStatus`].
#[derive(Debug, Clone, Default)]
pub struct StatusRegister(Rc<Cell<SensorStatus>>);

impl StatusRegister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> SensorStatus {
        self.0.get()
    }

    pub fn update(&self, sensor: SensorId, active: bool) -> SensorStatus {
        let next = self.0.get().with(sensor, active);
        self.0.set(next);
        next
    }

    /// Subscriber that mirrors `sensor`'s state into this register.
    pub fn subscriber<S: BinaryState>(&self, sensor: SensorId) -> impl FnMut(S) + use<S> {
        let register = self.clone();
        move |state: S| {
            register.update(sensor, state.is_active());
        }
    }
}
