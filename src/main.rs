//! binsense Firmware — Main Entry Point
//!
//! Door, PIR and smoke sensors polled while a BLE central is connected,
//! with the combined status byte notified over GATT.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  BleAdapter            HardwareAdapter   LogEventSink  NvsAdapter│
//! │  (Link+Status+Command) (Indicator)       (EventSink)   (Config) │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  SensorHub (PIR · Door · Smoke) · StatusRegister       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use log::{debug, error, info, warn};

use binsense::adapters::ble::{self, BleAdapter};
use binsense::adapters::hardware::HardwareAdapter;
use binsense::adapters::log_sink::LogEventSink;
use binsense::adapters::nvs::NvsAdapter;
use binsense::app::ports::{ConfigPort, LinkPort};
use binsense::app::service::AppService;
use binsense::config::SystemConfig;
use binsense::drivers::hw_init::{self, GpioInput};
use binsense::error::Error;
use binsense::events::{self, Event};
use binsense::pins;
use binsense::sensors::SensorHub;
use binsense::sensors::door::DoorMonitor;
use binsense::sensors::pir::PirMonitor;
use binsense::sensors::smoke::SmokeMonitor;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  binsense v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 1b. Initialise hardware peripherals ───────────────────
    if let Err(e) = hw_init::init_peripherals().map_err(Error::from) {
        error!("{}, halting", e);
        loop {
            FreeRtos::delay_ms(1000);
        }
    }

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => {
            warn!("{}, running with defaults and no persistence", Error::from(e));
            NvsAdapter::unavailable()
        }
    };
    let config = match nvs.load() {
        Ok(cfg) => {
            info!("Config loaded from NVS");
            cfg
        }
        Err(e) => {
            warn!("{}, using defaults", Error::from(e));
            SystemConfig::default()
        }
    };

    // ── 3. Construct adapters ─────────────────────────────────
    let hub = SensorHub::new(
        DoorMonitor::new(GpioInput::new(pins::DOOR_SENSOR_GPIO)),
        PirMonitor::new(GpioInput::new(pins::PIR_SENSOR_GPIO)),
        SmokeMonitor::new(GpioInput::new(pins::SMOKE_SENSOR_GPIO)),
    );
    let mut hw = HardwareAdapter::from_board();
    let mut log_sink = LogEventSink::new();
    let mut ble = BleAdapter::new(config.device_name.clone());
    ble.start().map_err(Error::from)?;

    // ── 4. Construct app service ──────────────────────────────
    let idle_wait_ms = config.idle_wait_ms;
    let mut app = AppService::new(config, hub);
    app.start(&mut ble, &mut hw, &mut log_sink)
        .map_err(Error::from)?;
    let mut delay = FreeRtos;

    info!("System ready. Waiting for a central.");

    // ── 5. Event loop ─────────────────────────────────────────
    loop {
        events::drain_events(|event| match event {
            Event::CentralConnected => ble.on_central_connected(ble::take_peer()),
            Event::CentralDisconnected => ble.on_central_disconnected(),
            Event::IndicatorWritten => {
                if let Some(raw) = ble::take_led_data() {
                    if let Err(e) = ble.on_command_write(&raw) {
                        debug!("LED write dropped ({})", e);
                    }
                }
            }
        });

        if ble.is_connected() {
            app.run_session(&mut ble, &mut hw, &mut log_sink, &mut delay);
            info!("Session over ({} polls total). Advertising again.", app.tick_count());
        }

        FreeRtos::delay_ms(idle_wait_ms);
    }
}
