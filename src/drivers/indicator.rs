//! Indicator LED driver.
//!
//! Three discrete R/G/B LEDs wired common-anode (a channel lights when
//! driven LOW) plus the on-board link LED (lit when driven HIGH).
//!
//! ## Dual-target design
//!
//! Generic over `embedded_hal::digital::OutputPin`: on ESP-IDF the pins
//! are [`GpioOutput`](super::hw_init::GpioOutput)s, on host they write the
//! simulated levels or a test double.

use embedded_hal::digital::{Error as _, OutputPin};
use log::warn;

pub struct IndicatorLeds<O: OutputPin> {
    red: O,
    green: O,
    blue: O,
    link: O,
    current: (bool, bool, bool),
    link_on: bool,
}

impl<O: OutputPin> IndicatorLeds<O> {
    /// Take ownership of the pins and switch everything off.
    pub fn new(red: O, green: O, blue: O, link: O) -> Self {
        let mut leds = Self {
            red,
            green,
            blue,
            link,
            current: (false, false, false),
            link_on: false,
        };
        leds.off();
        leds
    }

    /// Light exactly the requested channels.
    pub fn set_colour(&mut self, r: bool, g: bool, b: bool) {
        drive(&mut self.red, !r, "red");
        drive(&mut self.green, !g, "green");
        drive(&mut self.blue, !b, "blue");
        self.current = (r, g, b);
    }

    pub fn set_link(&mut self, on: bool) {
        drive(&mut self.link, on, "link");
        self.link_on = on;
    }

    pub fn off(&mut self) {
        self.set_colour(false, false, false);
        self.set_link(false);
    }

    pub fn current_colour(&self) -> (bool, bool, bool) {
        self.current
    }

    pub fn link_on(&self) -> bool {
        self.link_on
    }
}

fn drive<O: OutputPin>(pin: &mut O, high: bool, name: &str) {
    let res = if high { pin.set_high() } else { pin.set_low() };
    if let Err(e) = res {
        warn!("LED {}: write failed ({:?})", name, e.kind());
    }
}
