//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use core::fmt;

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, PeerAddress};

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

/// `aa:bb:cc:dd:ee:ff`, or `unknown` when the stack gave no address.
struct Mac(Option<PeerAddress>);

impl fmt::Display for Mac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(a) = self.0 else {
            return f.write_str("unknown");
        };
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            a[0], a[1], a[2], a[3], a[4], a[5]
        )
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(status) => {
                info!("START | status=0b{:08b}", status.bits());
            }
            AppEvent::Connected(peer) => {
                info!("LINK | connected to central {}", Mac(*peer));
            }
            AppEvent::Disconnected { peer, ticks } => {
                info!(
                    "LINK | disconnected from central {} after {} polls",
                    Mac(*peer),
                    ticks
                );
            }
            AppEvent::SensorChanged { event, status } => {
                info!("SENSOR | {} | status=0b{:08b}", event.label, status.bits());
            }
            AppEvent::IndicatorChanged(led) => {
                info!("LED | {}", led.label());
            }
        }
    }
}
