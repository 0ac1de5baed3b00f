//! Integration tests: AppService → status byte → BLE link / LEDs.

use binsense::app::commands::{AppCommand, LedCommand};
use binsense::app::events::AppEvent;
use binsense::app::service::AppService;
use binsense::app::status::SensorStatus;
use binsense::config::SystemConfig;
use binsense::error::SensorError;
use binsense::sensors::SensorHub;
use binsense::sensors::door::DoorMonitor;
use binsense::sensors::pir::PirMonitor;
use binsense::sensors::smoke::SmokeMonitor;

use crate::mock_hw::{
    BrokenLine, IndicatorCall, Lines, MockHub, MockIndicators, MockLink, RecordingSink,
    SharedLevel, StepDelay, board,
};

struct Rig {
    lines: Lines,
    app: AppService<SharedLevel, SharedLevel, SharedLevel>,
    link: MockLink,
    leds: MockIndicators,
    sink: RecordingSink,
}

fn rig_with(config: SystemConfig) -> Rig {
    let (lines, hub): (Lines, MockHub) = board();
    let mut rig = Rig {
        lines,
        app: AppService::new(config, hub),
        link: MockLink::new(),
        leds: MockIndicators::new(),
        sink: RecordingSink::new(),
    };
    rig.app
        .start(&mut rig.link, &mut rig.leds, &mut rig.sink)
        .unwrap();
    rig
}

fn rig() -> Rig {
    rig_with(SystemConfig::default())
}

#[test]
fn start_publishes_empty_status_and_darkens_leds() {
    let r = rig();
    assert!(r.app.is_started());
    assert_eq!(r.link.published, vec![0]);
    assert_eq!(r.leds.calls, vec![IndicatorCall::AllOff]);
    assert_eq!(r.sink.events, vec![AppEvent::Started(SensorStatus::EMPTY)]);
    assert_eq!(r.app.indicator(), LedCommand::Off);
}

#[test]
fn start_fails_on_unconfigurable_line() {
    let hub = SensorHub::new(
        DoorMonitor::new(BrokenLine),
        PirMonitor::new(SharedLevel::new(false)),
        SmokeMonitor::new(SharedLevel::new(true)),
    );
    let mut app = AppService::new(SystemConfig::default(), hub);
    let res = app.start(
        &mut MockLink::new(),
        &mut MockIndicators::new(),
        &mut RecordingSink::new(),
    );
    assert_eq!(res, Err(SensorError::GpioConfigFailed));
    assert!(!app.is_started());
}

#[test]
fn idle_tick_publishes_nothing() {
    let mut r = rig();
    assert_eq!(r.app.tick(&mut r.link, &mut r.sink), 0);
    assert_eq!(r.link.published, vec![0]);
}

#[test]
fn each_transition_publishes_in_poll_order() {
    let mut r = rig();
    r.lines.door.set(false);
    r.lines.pir.set(true);
    r.lines.smoke.set(false);

    assert_eq!(r.app.tick(&mut r.link, &mut r.sink), 3);
    // PIR, then door, then smoke.
    assert_eq!(r.link.published, vec![0, 0b100, 0b101, 0b111]);
    assert_eq!(
        r.sink.sensor_labels(),
        vec!["Presence detected", "Door open", "Smoke detected"]
    );
    assert_eq!(r.app.status().bits(), 0b111);
}

#[test]
fn clearing_transitions_reset_bits() {
    let mut r = rig();
    r.lines.smoke.set(false);
    r.lines.door.set(false);
    r.app.tick(&mut r.link, &mut r.sink);
    assert_eq!(r.app.status().bits(), 0b011);

    r.lines.door.set(true);
    r.app.tick(&mut r.link, &mut r.sink);
    assert_eq!(r.link.last_published(), Some(0b010));

    r.lines.smoke.set(true);
    r.app.tick(&mut r.link, &mut r.sink);
    assert_eq!(r.link.last_published(), Some(0));
    assert_eq!(r.app.tick_count(), 3);
}

#[test]
fn led_commands_drive_exactly_one_channel() {
    let mut r = rig();
    let cases = [
        (1u8, (true, false, false)),
        (2, (false, true, false)),
        (3, (false, false, true)),
        (0, (false, false, false)),
        (20, (false, false, false)),
        (0xFF, (false, false, false)),
    ];
    for (raw, rgb) in cases {
        r.app
            .handle_command(AppCommand::from_led_write(raw), &mut r.leds, &mut r.sink);
        assert_eq!(r.leds.rgb(), rgb, "byte {raw}");
    }
    assert_eq!(r.app.indicator(), LedCommand::Off);
}

#[test]
fn led_command_does_not_touch_status() {
    let mut r = rig();
    r.app
        .handle_command(AppCommand::from_led_write(2), &mut r.leds, &mut r.sink);
    assert_eq!(r.link.published, vec![0]);
    assert_eq!(
        r.sink.events.last(),
        Some(&AppEvent::IndicatorChanged(LedCommand::Green))
    );
}

#[test]
fn session_polls_until_link_drops() {
    let mut r = rig();
    r.link.connect_for(4);
    r.link.commands.push_back(2);

    let (door, smoke) = (r.lines.door.clone(), r.lines.smoke.clone());
    let door2 = door.clone();
    let mut delay = StepDelay::new()
        .then(move || door.set(false))
        .then(move || smoke.set(false))
        .then(move || door2.set(true));

    let polls = r
        .app
        .run_session(&mut r.link, &mut r.leds, &mut r.sink, &mut delay);

    assert_eq!(polls, 4);
    assert_eq!(r.link.published, vec![0, 0b001, 0b011, 0b010]);
    assert_eq!(delay.calls, 4);
    assert_eq!(delay.total_ns, 4 * 10_000_000);

    // Link LED lit for the session, green applied, everything off after.
    let calls = &r.leds.calls;
    assert_eq!(calls[1], IndicatorCall::Link(true));
    assert!(calls.contains(&IndicatorCall::Rgb(false, true, false)));
    assert_eq!(calls.last(), Some(&IndicatorCall::AllOff));
    assert!(!r.leds.link_on());
    assert_eq!(r.leds.rgb(), (false, false, false));
    assert_eq!(r.app.indicator(), LedCommand::Off);

    assert_eq!(
        r.sink.events[1],
        AppEvent::Connected(Some([0xC0, 0xFF, 0xEE, 0x00, 0x00, 0x01]))
    );
    assert!(matches!(
        r.sink.events.last(),
        Some(AppEvent::Disconnected { ticks: 4, .. })
    ));
}

#[test]
fn zero_poll_interval_skips_pacing() {
    let config = SystemConfig {
        poll_interval_ms: 0,
        ..SystemConfig::default()
    };
    let mut r = rig_with(config);
    r.link.connect_for(5);
    let mut delay = StepDelay::new();

    let polls = r
        .app
        .run_session(&mut r.link, &mut r.leds, &mut r.sink, &mut delay);
    assert_eq!(polls, 5);
    assert_eq!(delay.calls, 0);
}

#[test]
fn state_survives_across_sessions() {
    let mut r = rig();
    r.link.connect_for(1);
    r.lines.pir.set(true);
    r.app
        .run_session(&mut r.link, &mut r.leds, &mut r.sink, &mut StepDelay::new());
    assert_eq!(r.app.status().bits(), 0b100);

    // Presence cleared while nobody was connected: seen on the next session.
    r.lines.pir.set(false);
    r.link.connect_for(1);
    r.app
        .run_session(&mut r.link, &mut r.leds, &mut r.sink, &mut StepDelay::new());
    assert_eq!(r.link.last_published(), Some(0));
    assert_eq!(r.app.tick_count(), 2);
}
