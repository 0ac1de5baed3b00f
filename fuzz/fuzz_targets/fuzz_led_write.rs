//! Fuzz target: `BleAdapter::on_command_write`
//!
//! Feeds arbitrary characteristic writes into a connected adapter and
//! asserts that only single-byte writes are queued, that a queued byte
//! always maps to a valid `LedCommand`, and that a disconnect drops it.
//!
//! cargo fuzz run fuzz_led_write

#![no_main]

use binsense::adapters::ble::BleAdapter;
use binsense::app::commands::LedCommand;
use binsense::app::ports::CommandPort;
use binsense::config::SystemConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut ble = BleAdapter::new(SystemConfig::default().device_name);
    if ble.start().is_err() {
        return;
    }
    ble.on_central_connected(None);

    let accepted = ble.on_command_write(data).is_ok();
    assert_eq!(accepted, data.len() == 1, "write length check");

    if accepted {
        let Some(raw) = ble.take_command() else {
            panic!("accepted write was not queued");
        };
        assert_eq!(raw, data[0]);
        let (r, g, b) = LedCommand::from_byte(raw).channels();
        assert!(usize::from(r) + usize::from(g) + usize::from(b) <= 1);
    }

    let _ = ble.on_command_write(data);
    ble.on_central_disconnected();
    assert_eq!(ble.take_command(), None, "pending command survived disconnect");
});
