//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters decide what to do
//! with them — in production they become serial log lines.

use super::commands::LedCommand;
use super::ports::PeerAddress;
use super::status::SensorStatus;
use crate::sensors::SensorEvent;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Monitors are set up and the initial status has been published.
    Started(SensorStatus),

    /// A central connected; polling begins.
    Connected(Option<PeerAddress>),

    /// The central went away after `ticks` polling iterations.
    Disconnected { peer: Option<PeerAddress>, ticks: u64 },

    /// A sensor edge was detected and the status byte republished.
    SensorChanged { event: SensorEvent, status: SensorStatus },

    /// The indicator LEDs were switched by a remote command.
    IndicatorChanged(LedCommand),
}
