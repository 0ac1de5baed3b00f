//! Mock adapters for integration tests.
//!
//! Records every port call so tests can assert on the full history
//! without touching real GPIO registers or a BLE stack.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use binsense::app::events::AppEvent;
use binsense::app::ports::{CommandPort, EventSink, IndicatorPort, LinkPort, PeerAddress, StatusPort};
use binsense::error::SensorError;
use binsense::sensors::SensorHub;
use binsense::sensors::door::DoorMonitor;
use binsense::sensors::monitor::{Pull, SensorInput};
use binsense::sensors::pir::PirMonitor;
use binsense::sensors::smoke::SmokeMonitor;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, InputPin};

// ── Input lines ───────────────────────────────────────────────

/// Input pin whose level the test flips through a shared handle.
#[derive(Clone, Default)]
pub struct SharedLevel {
    high: Rc<Cell<bool>>,
    fail: Rc<Cell<bool>>,
    pull: Rc<Cell<Option<Pull>>>,
}

#[allow(dead_code)]
impl SharedLevel {
    pub fn new(high: bool) -> Self {
        let line = Self::default();
        line.set(high);
        line
    }

    pub fn set(&self, high: bool) {
        self.high.set(high);
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.set(fail);
    }

    pub fn configured_pull(&self) -> Option<Pull> {
        self.pull.get()
    }
}

impl ErrorType for SharedLevel {
    type Error = ErrorKind;
}

impl InputPin for SharedLevel {
    fn is_high(&mut self) -> Result<bool, ErrorKind> {
        if self.fail.get() {
            Err(ErrorKind::Other)
        } else {
            Ok(self.high.get())
        }
    }

    fn is_low(&mut self) -> Result<bool, ErrorKind> {
        self.is_high().map(|h| !h)
    }
}

impl SensorInput for SharedLevel {
    fn configure(&mut self, pull: Pull) -> Result<(), SensorError> {
        self.pull.set(Some(pull));
        Ok(())
    }
}

/// Line whose configuration is always rejected.
pub struct BrokenLine;

impl ErrorType for BrokenLine {
    type Error = ErrorKind;
}

impl InputPin for BrokenLine {
    fn is_high(&mut self) -> Result<bool, ErrorKind> {
        Err(ErrorKind::Other)
    }

    fn is_low(&mut self) -> Result<bool, ErrorKind> {
        Err(ErrorKind::Other)
    }
}

impl SensorInput for BrokenLine {
    fn configure(&mut self, _pull: Pull) -> Result<(), SensorError> {
        Err(SensorError::GpioConfigFailed)
    }
}

// ── Board ─────────────────────────────────────────────────────

/// Handles to the three sensor lines, parked at their idle levels.
pub struct Lines {
    pub door: SharedLevel,
    pub pir: SharedLevel,
    pub smoke: SharedLevel,
}

pub type MockHub = SensorHub<SharedLevel, SharedLevel, SharedLevel>;

pub fn board() -> (Lines, MockHub) {
    let lines = Lines {
        door: SharedLevel::new(true),
        pir: SharedLevel::new(false),
        smoke: SharedLevel::new(true),
    };
    let hub = SensorHub::new(
        DoorMonitor::new(lines.door.clone()),
        PirMonitor::new(lines.pir.clone()),
        SmokeMonitor::new(lines.smoke.clone()),
    );
    (lines, hub)
}

// ── BLE link ──────────────────────────────────────────────────

/// Link that stays connected for a fixed number of `is_connected` checks.
pub struct MockLink {
    pub peer: Option<PeerAddress>,
    pub published: Vec<u8>,
    pub commands: VecDeque<u8>,
    connected_checks: Cell<u32>,
}

#[allow(dead_code)]
impl MockLink {
    pub fn new() -> Self {
        Self {
            peer: Some([0xC0, 0xFF, 0xEE, 0x00, 0x00, 0x01]),
            published: Vec::new(),
            commands: VecDeque::new(),
            connected_checks: Cell::new(0),
        }
    }

    /// Stay connected for the next `iterations` loop checks.
    pub fn connect_for(&mut self, iterations: u32) {
        self.connected_checks.set(iterations);
    }

    pub fn last_published(&self) -> Option<u8> {
        self.published.last().copied()
    }
}

impl LinkPort for MockLink {
    fn is_connected(&self) -> bool {
        let left = self.connected_checks.get();
        if left == 0 {
            return false;
        }
        self.connected_checks.set(left - 1);
        true
    }

    fn peer(&self) -> Option<PeerAddress> {
        self.peer
    }
}

impl StatusPort for MockLink {
    fn publish_status(&mut self, bits: u8) {
        self.published.push(bits);
    }
}

impl CommandPort for MockLink {
    fn take_command(&mut self) -> Option<u8> {
        self.commands.pop_front()
    }
}

// ── Indicators ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorCall {
    Rgb(bool, bool, bool),
    Link(bool),
    AllOff,
}

#[derive(Default)]
pub struct MockIndicators {
    pub calls: Vec<IndicatorCall>,
}

#[allow(dead_code)]
impl MockIndicators {
    pub fn new() -> Self {
        Self::default()
    }

    /// RGB channels lit after replaying the call history.
    pub fn rgb(&self) -> (bool, bool, bool) {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                IndicatorCall::Rgb(r, g, b) => Some((*r, *g, *b)),
                IndicatorCall::AllOff => Some((false, false, false)),
                IndicatorCall::Link(_) => None,
            })
            .unwrap_or((false, false, false))
    }

    pub fn link_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                IndicatorCall::Link(on) => Some(*on),
                IndicatorCall::AllOff => Some(false),
                IndicatorCall::Rgb(..) => None,
            })
            .unwrap_or(false)
    }
}

impl IndicatorPort for MockIndicators {
    fn set_rgb(&mut self, red: bool, green: bool, blue: bool) {
        self.calls.push(IndicatorCall::Rgb(red, green, blue));
    }

    fn set_link(&mut self, on: bool) {
        self.calls.push(IndicatorCall::Link(on));
    }

    fn all_off(&mut self) {
        self.calls.push(IndicatorCall::AllOff);
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels of every `SensorChanged` event, in emission order.
    pub fn sensor_labels(&self) -> Vec<&'static str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::SensorChanged { event, .. } => Some(event.label),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Delay ─────────────────────────────────────────────────────

/// Delay that runs one scripted step per pacing call instead of sleeping.
///
/// Lets a test change sensor levels between polling iterations of
/// `run_session`.
#[derive(Default)]
pub struct StepDelay {
    steps: VecDeque<Box<dyn FnMut()>>,
    pub total_ns: u64,
    pub calls: u32,
}

#[allow(dead_code)]
impl StepDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, step: impl FnMut() + 'static) -> Self {
        self.steps.push_back(Box::new(step));
        self
    }
}

impl StepDelay {
    fn pace(&mut self, ns: u64) {
        self.calls += 1;
        self.total_ns += ns;
        if let Some(mut step) = self.steps.pop_front() {
            step();
        }
    }
}

// `delay_ms` is overridden so one pacing call is one step; the default
// splits long delays into several `delay_ns` calls.
impl DelayNs for StepDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.pace(u64::from(ns));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.pace(u64::from(ms) * 1_000_000);
    }
}
