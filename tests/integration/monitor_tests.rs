//! Integration tests: sensor monitors driven through mock input lines.

use std::cell::RefCell;
use std::rc::Rc;

use binsense::sensors::door::{DoorMonitor, DoorState};
use binsense::sensors::monitor::{Level, Pull};
use binsense::sensors::pir::{PirMonitor, PresenceState};
use binsense::sensors::smoke::{SmokeMonitor, SmokeState};
use binsense::sensors::SensorId;

use crate::mock_hw::{BrokenLine, SharedLevel, board};

/// Subscriber that records every state it is handed.
fn recorder<S: 'static>() -> (Rc<RefCell<Vec<S>>>, impl FnMut(S) + 'static) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |s: S| sink.borrow_mut().push(s))
}

#[test]
fn door_sequence_notifies_on_open_and_close_only() {
    let line = SharedLevel::new(true);
    let mut door = DoorMonitor::new(line.clone());
    let (seen, sub) = recorder::<DoorState>();
    door.setup(sub).unwrap();

    let mut fired_at = Vec::new();
    for (i, high) in [true, true, false, false, true].into_iter().enumerate() {
        line.set(high);
        if door.poll().is_some() {
            fired_at.push(i);
        }
    }

    assert_eq!(fired_at, vec![2, 4]);
    assert_eq!(*seen.borrow(), vec![DoorState::Opened, DoorState::Closed]);
    assert_eq!(door.status(), DoorState::Closed);
}

#[test]
fn pir_steady_low_never_notifies() {
    let line = SharedLevel::new(false);
    let mut pir = PirMonitor::new(line.clone());
    let (seen, sub) = recorder::<PresenceState>();
    pir.setup(sub).unwrap();

    for _ in 0..3 {
        line.set(false);
        assert_eq!(pir.poll(), None);
    }
    assert!(seen.borrow().is_empty());
    assert_eq!(pir.status(), PresenceState::NotDetected);
}

#[test]
fn smoke_alarm_pulls_line_low() {
    let line = SharedLevel::new(true);
    let mut smoke = SmokeMonitor::new(line.clone());
    let (seen, sub) = recorder::<SmokeState>();
    smoke.setup(sub).unwrap();

    line.set(false);
    assert_eq!(smoke.poll(), Some(SmokeState::Detected));
    line.set(true);
    assert_eq!(smoke.poll(), Some(SmokeState::NotDetected));
    assert_eq!(
        *seen.borrow(),
        vec![SmokeState::Detected, SmokeState::NotDetected]
    );
}

#[test]
fn status_before_first_poll_is_default() {
    let (_lines, hub) = board();
    assert_eq!(hub.door.status(), DoorState::Closed);
    assert_eq!(hub.pir.status(), PresenceState::NotDetected);
    assert_eq!(hub.smoke.status(), SmokeState::NotDetected);
}

#[test]
fn unchanged_level_notifies_once() {
    let line = SharedLevel::new(false);
    let mut pir = PirMonitor::new(line.clone());
    let (seen, sub) = recorder::<PresenceState>();
    pir.setup(sub).unwrap();

    line.set(true);
    pir.poll();
    pir.poll();
    pir.poll();
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn silent_monitor_still_tracks_state() {
    let line = SharedLevel::new(true);
    let mut door = DoorMonitor::new(line.clone());
    door.setup_silent().unwrap();
    assert!(!door.has_subscriber());

    line.set(false);
    assert_eq!(door.poll(), Some(DoorState::Opened));
    assert_eq!(door.status(), DoorState::Opened);
}

#[test]
fn second_setup_replaces_subscriber() {
    let line = SharedLevel::new(false);
    let mut pir = PirMonitor::new(line.clone());
    let (first, sub1) = recorder::<PresenceState>();
    let (second, sub2) = recorder::<PresenceState>();
    pir.setup(sub1).unwrap();
    pir.setup(sub2).unwrap();

    line.set(true);
    pir.poll();
    assert!(first.borrow().is_empty());
    assert_eq!(*second.borrow(), vec![PresenceState::Detected]);
}

#[test]
fn setup_applies_kind_pull() {
    let (lines, mut hub) = board();
    hub.door.setup_silent().unwrap();
    hub.pir.setup_silent().unwrap();
    hub.smoke.setup_silent().unwrap();
    assert_eq!(lines.door.configured_pull(), Some(Pull::Up));
    assert_eq!(lines.pir.configured_pull(), Some(Pull::Down));
    assert_eq!(lines.smoke.configured_pull(), Some(Pull::Up));
}

#[test]
fn setup_surfaces_config_failure() {
    let mut door = DoorMonitor::new(BrokenLine);
    assert!(door.setup_silent().is_err());
}

#[test]
fn read_failure_is_no_change() {
    let line = SharedLevel::new(true);
    let mut door = DoorMonitor::new(line.clone());
    door.setup_silent().unwrap();

    line.set(false);
    line.set_failing(true);
    assert_eq!(door.poll(), None);
    assert_eq!(door.last_level(), Level::High);

    line.set_failing(false);
    assert_eq!(door.poll(), Some(DoorState::Opened));
}

#[test]
fn double_toggle_between_polls_is_invisible() {
    let line = SharedLevel::new(true);
    let mut door = DoorMonitor::new(line.clone());
    door.setup_silent().unwrap();

    line.set(false);
    line.set(true);
    assert_eq!(door.poll(), None);
    assert_eq!(door.status(), DoorState::Closed);
}

#[test]
fn hub_polls_in_fixed_order() {
    let (lines, mut hub) = board();
    lines.door.set(false);
    lines.pir.set(true);
    lines.smoke.set(false);

    let mut order = Vec::new();
    let edges = hub.poll_all(|e| order.push(e.sensor));
    assert_eq!(edges, 3);
    assert_eq!(order, SensorId::POLL_ORDER.to_vec());
    assert!(hub.is_active(SensorId::Door));
    assert!(hub.is_active(SensorId::Pir));
    assert!(hub.is_active(SensorId::Smoke));
}
