//! Generic edge-detecting monitor for a single binary sensor.
//!
//! Every sensor on the board is the same state machine: sample one digital
//! line, compare it with the previous sample, and on a literal LOW↔HIGH
//! change map the edge to a logical state and notify a single subscriber.
//!
//! ```text
//!   InputPin ──▶ [last vs current] ──edge──▶ state ──▶ Subscriber
//!                      │
//!                      └── no edge: nothing but last_level update
//! ```
//!
//! What differs between door, PIR and smoke is captured by a [`SensorKind`]:
//! the logical state type, which level means "active", and the pull
//! resistor the line needs.
//!
//! Only two consecutive samples are compared. A pulse that starts and ends
//! between two polls is never seen.

use embedded_hal::digital::{Error as _, InputPin};
use log::{debug, warn};

use crate::error::SensorError;

// ───────────────────────────────────────────────────────────────
// Raw level
// ───────────────────────────────────────────────────────────────

/// A raw two-valued sample taken from an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }

    pub const fn inverted(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }
}

/// Pull resistor applied when an input line is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    Up,
    Down,
}

// ───────────────────────────────────────────────────────────────
// Sensor kind (compile-time mapping table)
// ───────────────────────────────────────────────────────────────

/// Two-valued logical sensor state.
pub trait BinaryState: Copy + Eq + core::fmt::Debug {
    /// `true` for the alerting value (door opened, presence, smoke).
    fn is_active(self) -> bool;

    /// Log label for this value, e.g. "Door open".
    fn label(self) -> &'static str;
}

/// Per-sensor parameters of the edge detector.
pub trait SensorKind {
    type State: BinaryState;

    /// Short human-readable name used in log lines.
    const NAME: &'static str;
    /// Level the sensor drives while in its active state.
    const ACTIVE_LEVEL: Level;
    /// Pull resistor the input line is configured with.
    const PULL: Pull;
    /// State reported after setup and before the first edge.
    const INACTIVE: Self::State;
    const ACTIVE: Self::State;

    /// Level assumed at setup: the one matching [`Self::INACTIVE`].
    fn idle_level() -> Level {
        Self::ACTIVE_LEVEL.inverted()
    }

    /// Map a LOW→HIGH or HIGH→LOW edge ending at `to` onto a logical state.
    fn state_after_edge(to: Level) -> Self::State {
        if to == Self::ACTIVE_LEVEL {
            Self::ACTIVE
        } else {
            Self::INACTIVE
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Input line
// ───────────────────────────────────────────────────────────────

/// A digital input that can be configured once before polling.
///
/// Lines that need no configuration (mocks, pre-configured pins) can use
/// the default no-op.
pub trait SensorInput: InputPin {
    fn configure(&mut self, _pull: Pull) -> Result<(), SensorError> {
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Subscriber
// ───────────────────────────────────────────────────────────────

/// Recipient of state-change notifications. Called synchronously from
/// [`SensorMonitor::poll`], once per detected edge.
pub trait Subscriber<S> {
    fn notify(&mut self, state: S);
}

impl<S, F: FnMut(S)> Subscriber<S> for F {
    fn notify(&mut self, state: S) {
        self(state);
    }
}

// ───────────────────────────────────────────────────────────────
// Monitor
// ───────────────────────────────────────────────────────────────

/// Edge detector, state register and notifier for one sensor line.
pub struct SensorMonitor<K: SensorKind, P> {
    input: P,
    last_level: Level,
    state: K::State,
    subscriber: Option<Box<dyn Subscriber<K::State>>>,
}

impl<K: SensorKind, P: SensorInput> SensorMonitor<K, P> {
    /// Wrap an input line. The monitor starts in the kind's defaults and
    /// can be polled immediately; [`setup`](Self::setup) configures the line.
    pub fn new(input: P) -> Self {
        Self {
            input,
            last_level: K::idle_level(),
            state: K::INACTIVE,
            subscriber: None,
        }
    }

    /// Configure the line, register `subscriber` and reset to defaults.
    ///
    /// Calling this again replaces the previous subscriber.
    pub fn setup(
        &mut self,
        subscriber: impl Subscriber<K::State> + 'static,
    ) -> Result<(), SensorError> {
        self.reset_line()?;
        if self.subscriber.is_some() {
            debug!("{}: replacing registered subscriber", K::NAME);
        }
        self.subscriber = Some(Box::new(subscriber));
        Ok(())
    }

    /// Configure the line and reset to defaults without a subscriber.
    /// Edges still update the state register.
    pub fn setup_silent(&mut self) -> Result<(), SensorError> {
        self.reset_line()?;
        self.subscriber = None;
        Ok(())
    }

    fn reset_line(&mut self) -> Result<(), SensorError> {
        self.input.configure(K::PULL)?;
        self.last_level = K::idle_level();
        self.state = K::INACTIVE;
        debug!(
            "{}: configured ({:?} pull, idle {:?})",
            K::NAME,
            K::PULL,
            self.last_level
        );
        Ok(())
    }

    /// Sample the line once. Returns the new state when an edge was seen.
    ///
    /// A failed read is treated as "level unchanged".
    pub fn poll(&mut self) -> Option<K::State> {
        let current = match self.input.is_high() {
            Ok(high) => Level::from(high),
            Err(e) => {
                warn!("{}: input read failed ({:?})", K::NAME, e.kind());
                self.last_level
            }
        };

        let edge = match (self.last_level, current) {
            (Level::Low, Level::High) | (Level::High, Level::Low) => {
                Some(K::state_after_edge(current))
            }
            _ => None,
        };

        if let Some(state) = edge {
            self.state = state;
            debug!("{}: {:?} -> {:?}", K::NAME, self.last_level, state);
            if let Some(subscriber) = self.subscriber.as_mut() {
                subscriber.notify(state);
            }
        }

        self.last_level = current;
        edge
    }

    /// Current logical state. No side effects.
    pub fn status(&self) -> K::State {
        self.state
    }

    /// Level observed by the most recent poll (or the idle level).
    pub fn last_level(&self) -> Level {
        self.last_level
    }

    pub fn has_subscriber(&self) -> bool {
        self.subscriber.is_some()
    }

    pub fn input_mut(&mut self) -> &mut P {
        &mut self.input
    }
}
