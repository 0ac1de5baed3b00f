//! One-shot hardware peripheral initialization and raw GPIO access.
//!
//! Configures the indicator outputs using raw ESP-IDF sys calls and
//! exposes [`GpioInput`] / [`GpioOutput`], thin `embedded-hal` 1.0 pin
//! wrappers over a GPIO number. Sensor inputs are configured lazily by
//! their monitor's `setup`, with the pull resistor the sensor needs.
//!
//! On host targets every pin is backed by an atomic simulation level so
//! integration tests and the fuzz harness can drive the inputs.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::error::SensorError;
use crate::pins;
use crate::sensors::monitor::{Pull, SensorInput};

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    InvalidPin(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::InvalidPin(pin) => write!(f, "GPIO{} does not exist", pin),
        }
    }
}

/// Output pins driven by the firmware, with the level that turns each off.
const OUTPUT_PINS: [(i32, bool); 4] = [
    (pins::LED_R_GPIO, true),
    (pins::LED_G_GPIO, true),
    (pins::LED_B_GPIO, true),
    (pins::LED_LINK_GPIO, false),
];

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the BLE stack starts; single-threaded.
    unsafe {
        init_gpio_outputs()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    for (pin, off_level) in OUTPUT_PINS {
        check_pin(pin)?;
        gpio_write(pin, off_level);
    }
    log::info!("hw_init(sim): outputs parked at their off level");
    Ok(())
}

fn check_pin(pin: i32) -> Result<(), HwInitError> {
    if (0..=pins::MAX_GPIO).contains(&pin) {
        Ok(())
    } else {
        Err(HwInitError::InvalidPin(pin))
    }
}

// ── GPIO Inputs ───────────────────────────────────────────────

/// Configure `pin` as a plain input with the given pull resistor.
#[cfg(target_os = "espidf")]
pub fn configure_input(pin: i32, pull: Pull) -> Result<(), HwInitError> {
    check_pin(pin)?;
    let (pull_up_en, pull_down_en) = match pull {
        Pull::Up => (
            gpio_pullup_t_GPIO_PULLUP_ENABLE,
            gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        ),
        Pull::Down => (
            gpio_pullup_t_GPIO_PULLUP_DISABLE,
            gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
        ),
    };
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en,
        pull_down_en,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: gpio_config only touches the IO-MUX registers of `pin`,
    // which was range-checked above. Main-task only.
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn configure_input(pin: i32, pull: Pull) -> Result<(), HwInitError> {
    check_pin(pin)?;
    sim::PULLS[pin as usize].store(
        match pull {
            Pull::Up => sim::PULL_UP,
            Pull::Down => sim::PULL_DOWN,
        },
        core::sync::atomic::Ordering::Relaxed,
    );
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> bool {
    sim::level(pin)
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    for (pin, off_level) in OUTPUT_PINS {
        check_pin(pin)?;
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        unsafe { gpio_set_level(pin, off_level as u32) };
    }

    info!("hw_init: GPIO outputs configured (RGB active-low, link active-high)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was validated during init_gpio_outputs(). Main-loop only.
    unsafe {
        gpio_set_level(pin, if high { 1 } else { 0 });
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    sim::set_level(pin, high);
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

    use crate::pins::MAX_GPIO;

    const PIN_COUNT: usize = MAX_GPIO as usize + 1;

    pub(super) const PULL_NONE: u8 = 0;
    pub(super) const PULL_UP: u8 = 1;
    pub(super) const PULL_DOWN: u8 = 2;

    pub(super) static LEVELS: [AtomicBool; PIN_COUNT] =
        [const { AtomicBool::new(false) }; PIN_COUNT];
    pub(super) static PULLS: [AtomicU8; PIN_COUNT] = [const { AtomicU8::new(PULL_NONE) }; PIN_COUNT];

    pub(super) fn level(pin: i32) -> bool {
        usize::try_from(pin)
            .ok()
            .and_then(|i| LEVELS.get(i))
            .is_some_and(|l| l.load(Ordering::Relaxed))
    }

    pub(super) fn set_level(pin: i32, high: bool) {
        if let Some(l) = usize::try_from(pin).ok().and_then(|i| LEVELS.get(i)) {
            l.store(high, Ordering::Relaxed);
        }
    }
}

/// Drive a simulated input line (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_input(pin: i32, high: bool) {
    sim::set_level(pin, high);
}

/// Level last written to a simulated output (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_output_level(pin: i32) -> bool {
    sim::level(pin)
}

/// Pull resistor a simulated input was configured with (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_input_pull(pin: i32) -> Option<Pull> {
    use core::sync::atomic::Ordering;
    let raw = usize::try_from(pin)
        .ok()
        .and_then(|i| sim::PULLS.get(i))?
        .load(Ordering::Relaxed);
    match raw {
        sim::PULL_UP => Some(Pull::Up),
        sim::PULL_DOWN => Some(Pull::Down),
        _ => None,
    }
}

// ── embedded-hal pin wrappers ─────────────────────────────────

/// Digital input on a raw GPIO number.
#[derive(Debug)]
pub struct GpioInput {
    pin: i32,
}

impl GpioInput {
    pub const fn new(pin: i32) -> Self {
        Self { pin }
    }
}

impl ErrorType for GpioInput {
    type Error = Infallible;
}

impl InputPin for GpioInput {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(gpio_read(self.pin))
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!gpio_read(self.pin))
    }
}

impl SensorInput for GpioInput {
    fn configure(&mut self, pull: Pull) -> Result<(), SensorError> {
        configure_input(self.pin, pull).map_err(|e| {
            log::error!("GPIO{}: input config failed: {}", self.pin, e);
            SensorError::GpioConfigFailed
        })
    }
}

/// Digital output on a raw GPIO number configured by [`init_peripherals`].
#[derive(Debug)]
pub struct GpioOutput {
    pin: i32,
}

impl GpioOutput {
    pub const fn new(pin: i32) -> Self {
        Self { pin }
    }
}

impl ErrorType for GpioOutput {
    type Error = Infallible;
}

impl OutputPin for GpioOutput {
    fn set_low(&mut self) -> Result<(), Infallible> {
        gpio_write(self.pin, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        gpio_write(self.pin, true);
        Ok(())
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    // GPIO 40..=47 are unused by the board; each test owns one pin so
    // parallel tests never share a simulated level.

    #[test]
    fn input_follows_sim_level() {
        let mut input = GpioInput::new(40);
        sim_set_input(40, true);
        assert_eq!(input.is_high(), Ok(true));
        sim_set_input(40, false);
        assert_eq!(input.is_low(), Ok(true));
    }

    #[test]
    fn configure_records_pull() {
        let mut input = GpioInput::new(41);
        input.configure(Pull::Down).unwrap();
        assert_eq!(sim_input_pull(41), Some(Pull::Down));
    }

    #[test]
    fn configure_rejects_missing_pin() {
        let mut input = GpioInput::new(pins::MAX_GPIO + 1);
        assert_eq!(input.configure(Pull::Up), Err(SensorError::GpioConfigFailed));
    }

    #[test]
    fn output_writes_sim_level() {
        let mut out = GpioOutput::new(42);
        out.set_high().unwrap();
        assert!(sim_output_level(42));
        out.set_low().unwrap();
        assert!(!sim_output_level(42));
    }
}
