//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the [`SensorHub`] and the shared status register.
//! It exposes a hardware-agnostic API. All I/O flows through port traits
//! injected at call sites, so the whole service runs against mock
//! adapters on the host.
//!
//! ```text
//!  InputPin ×3 ──▶ ┌────────────────────────┐ ──▶ StatusPort (BLE notify)
//!                  │      AppService         │ ──▶ EventSink
//!  CommandPort ──▶ │  SensorHub · Status     │ ──▶ IndicatorPort (LEDs)
//!                  └────────────────────────┘
//! ```

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::config::SystemConfig;
use crate::error::SensorError;
use crate::sensors::door::DoorState;
use crate::sensors::monitor::SensorInput;
use crate::sensors::pir::PresenceState;
use crate::sensors::smoke::SmokeState;
use crate::sensors::{SensorHub, SensorId};

use super::commands::{AppCommand, LedCommand};
use super::events::AppEvent;
use super::ports::{CommandPort, EventSink, IndicatorPort, LinkPort, PeerAddress, StatusPort};
use super::status::{SensorStatus, StatusRegister};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates polling, publication and LED
/// commands.
pub struct AppService<D, P, S>
where
    D: SensorInput,
    P: SensorInput,
    S: SensorInput,
{
    hub: SensorHub<D, P, S>,
    status: StatusRegister,
    config: SystemConfig,
    indicator: LedCommand,
    tick_count: u64,
    session_ticks: u64,
    started: bool,
}

impl<D, P, S> AppService<D, P, S>
where
    D: SensorInput,
    P: SensorInput,
    S: SensorInput,
{
    /// Construct the service around an already-built hub.
    ///
    /// Does **not** configure the sensor lines; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig, hub: SensorHub<D, P, S>) -> Self {
        Self {
            hub,
            status: StatusRegister::new(),
            config,
            indicator: LedCommand::Off,
            tick_count: 0,
            session_ticks: 0,
            started: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Set up all three monitors with subscribers feeding the status
    /// register, switch every LED off and publish the initial status byte.
    pub fn start(
        &mut self,
        status_port: &mut impl StatusPort,
        indicators: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) -> Result<(), SensorError> {
        self.status = StatusRegister::new();
        self.hub
            .door
            .setup(self.status.subscriber::<DoorState>(SensorId::Door))?;
        self.hub
            .pir
            .setup(self.status.subscriber::<PresenceState>(SensorId::Pir))?;
        self.hub
            .smoke
            .setup(self.status.subscriber::<SmokeState>(SensorId::Smoke))?;

        indicators.all_off();
        self.indicator = LedCommand::Off;

        let status = self.status.get();
        status_port.publish_status(status.bits());
        self.started = true;
        sink.emit(&AppEvent::Started(status));
        info!("AppService started (status=0b{:08b})", status.bits());
        Ok(())
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Poll PIR, door and smoke once, in that order. Every detected edge
    /// republishes the status byte before the next sensor is sampled.
    ///
    /// Returns the number of edges seen.
    pub fn tick(&mut self, status_port: &mut impl StatusPort, sink: &mut impl EventSink) -> usize {
        self.tick_count += 1;
        let status = &self.status;
        self.hub.poll_all(|event| {
            let status = status.get();
            status_port.publish_status(status.bits());
            sink.emit(&AppEvent::SensorChanged { event, status });
        })
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (from the LED characteristic).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        indicators: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::SetIndicator(led) => {
                let (r, g, b) = led.channels();
                indicators.set_rgb(r, g, b);
                self.indicator = led;
                sink.emit(&AppEvent::IndicatorChanged(led));
            }
        }
    }

    // ── Connection lifecycle ──────────────────────────────────

    pub fn on_connected(
        &mut self,
        peer: Option<PeerAddress>,
        indicators: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) {
        self.session_ticks = 0;
        indicators.set_link(true);
        sink.emit(&AppEvent::Connected(peer));
    }

    pub fn on_disconnected(
        &mut self,
        peer: Option<PeerAddress>,
        indicators: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) {
        indicators.all_off();
        self.indicator = LedCommand::Off;
        sink.emit(&AppEvent::Disconnected {
            peer,
            ticks: self.session_ticks,
        });
    }

    /// Serve one connected central until the link drops.
    ///
    /// The `link` parameter satisfies [`LinkPort`], [`StatusPort`] **and**
    /// [`CommandPort`]. All three live on the BLE adapter, and a single
    /// borrow keeps that explicit.
    ///
    /// Returns the number of polling iterations run in this session.
    pub fn run_session(
        &mut self,
        link: &mut (impl LinkPort + StatusPort + CommandPort),
        indicators: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
        delay: &mut impl DelayNs,
    ) -> u64 {
        let peer = link.peer();
        self.on_connected(peer, indicators, sink);

        while link.is_connected() {
            self.tick(link, sink);
            self.session_ticks += 1;

            if let Some(raw) = link.take_command() {
                debug!("LED command byte 0x{:02x}", raw);
                self.handle_command(AppCommand::from_led_write(raw), indicators, sink);
            }

            if self.config.poll_interval_ms > 0 {
                delay.delay_ms(self.config.poll_interval_ms);
            }
        }

        self.on_disconnected(peer, indicators, sink);
        self.session_ticks
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current combined status byte.
    pub fn status(&self) -> SensorStatus {
        self.status.get()
    }

    /// Last LED command applied (reset to `Off` on disconnect).
    pub fn indicator(&self) -> LedCommand {
        self.indicator
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Total polling iterations since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn hub(&self) -> &SensorHub<D, P, S> {
        &self.hub
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }
}
