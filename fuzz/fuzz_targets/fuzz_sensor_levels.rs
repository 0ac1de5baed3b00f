//! Fuzz target: `AppService::tick` over simulated GPIO levels
//!
//! Each input byte sets the door, PIR and smoke lines from its low three
//! bits and runs one polling pass. Asserts that the status byte never
//! grows bits beyond the three sensors and that, after every pass, the last
//! published byte matches the monitors' states.
//!
//! cargo fuzz run fuzz_sensor_levels

#![no_main]

use binsense::app::events::AppEvent;
use binsense::app::ports::{EventSink, IndicatorPort, StatusPort};
use binsense::app::service::AppService;
use binsense::config::SystemConfig;
use binsense::drivers::hw_init::{GpioInput, sim_set_input};
use binsense::pins;
use binsense::sensors::{SensorHub, SensorId};
use binsense::sensors::door::DoorMonitor;
use binsense::sensors::pir::PirMonitor;
use binsense::sensors::smoke::SmokeMonitor;
use libfuzzer_sys::fuzz_target;

#[derive(Default)]
struct Capture(Vec<u8>);

impl StatusPort for Capture {
    fn publish_status(&mut self, bits: u8) {
        self.0.push(bits);
    }
}

struct NoLeds;

impl IndicatorPort for NoLeds {
    fn set_rgb(&mut self, _red: bool, _green: bool, _blue: bool) {}
    fn set_link(&mut self, _on: bool) {}
    fn all_off(&mut self) {}
}

#[derive(Default)]
struct Edges(usize);

impl EventSink for Edges {
    fn emit(&mut self, event: &AppEvent) {
        if matches!(event, AppEvent::SensorChanged { .. }) {
            self.0 += 1;
        }
    }
}

fuzz_target!(|data: &[u8]| {
    // Sim levels are process-global; park them at idle for every run.
    sim_set_input(pins::DOOR_SENSOR_GPIO, true);
    sim_set_input(pins::PIR_SENSOR_GPIO, false);
    sim_set_input(pins::SMOKE_SENSOR_GPIO, true);

    let hub = SensorHub::new(
        DoorMonitor::new(GpioInput::new(pins::DOOR_SENSOR_GPIO)),
        PirMonitor::new(GpioInput::new(pins::PIR_SENSOR_GPIO)),
        SmokeMonitor::new(GpioInput::new(pins::SMOKE_SENSOR_GPIO)),
    );
    let mut app = AppService::new(SystemConfig::default(), hub);
    let mut out = Capture::default();
    let mut edges = Edges::default();
    if app.start(&mut out, &mut NoLeds, &mut edges).is_err() {
        return;
    }

    let mut total = 0;
    for &b in data {
        sim_set_input(pins::DOOR_SENSOR_GPIO, b & 0b001 != 0);
        sim_set_input(pins::PIR_SENSOR_GPIO, b & 0b010 != 0);
        sim_set_input(pins::SMOKE_SENSOR_GPIO, b & 0b100 != 0);
        total += app.tick(&mut out, &mut edges);

        let bits = app.status().bits();
        assert_eq!(bits & !0b111, 0, "status byte out of range");

        // The characteristic always holds the latest state of all three lines.
        let hub = app.hub();
        let expected = u8::from(hub.is_active(SensorId::Door))
            | u8::from(hub.is_active(SensorId::Smoke)) << 1
            | u8::from(hub.is_active(SensorId::Pir)) << 2;
        assert_eq!(out.0.last().copied(), Some(expected), "published byte is stale");
        assert_eq!(bits, expected);
    }

    // One publication at start plus one per edge.
    assert_eq!(out.0.len(), total + 1);
    assert_eq!(edges.0, total);
    assert!(out.0.iter().all(|b| b & !0b111 == 0));
});
