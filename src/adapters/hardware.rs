//! Hardware adapter — bridges the indicator LEDs to the domain port trait.
//!
//! Owns the [`IndicatorLeds`] and exposes them through [`IndicatorPort`].
//! Sensor inputs are not here: they are owned by the monitors inside the
//! `SensorHub`. On non-espidf targets the GPIO writes land in the
//! simulated pin levels.

use embedded_hal::digital::OutputPin;

use crate::app::ports::IndicatorPort;
use crate::drivers::hw_init::GpioOutput;
use crate::drivers::indicator::IndicatorLeds;
use crate::pins;

/// Concrete adapter that puts the LEDs behind [`IndicatorPort`].
pub struct HardwareAdapter<O: OutputPin = GpioOutput> {
    leds: IndicatorLeds<O>,
}

impl HardwareAdapter<GpioOutput> {
    /// Wire the board's LED pins from [`pins`].
    pub fn from_board() -> Self {
        Self::new(IndicatorLeds::new(
            GpioOutput::new(pins::LED_R_GPIO),
            GpioOutput::new(pins::LED_G_GPIO),
            GpioOutput::new(pins::LED_B_GPIO),
            GpioOutput::new(pins::LED_LINK_GPIO),
        ))
    }
}

impl<O: OutputPin> HardwareAdapter<O> {
    pub fn new(leds: IndicatorLeds<O>) -> Self {
        Self { leds }
    }

    pub fn leds(&self) -> &IndicatorLeds<O> {
        &self.leds
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl<O: OutputPin> IndicatorPort for HardwareAdapter<O> {
    fn set_rgb(&mut self, red: bool, green: bool, blue: bool) {
        self.leds.set_colour(red, green, blue);
    }

    fn set_link(&mut self, on: bool) {
        self.leds.set_link(on);
    }

    fn all_off(&mut self) {
        self.leds.off();
    }
}
