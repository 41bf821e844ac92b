//! The poll-render control loop.
//!
//! [`Core`] owns the outputs and collaborators for the process lifetime and
//! walks through a small state machine:
//!
//! ```text
//! Starting -> WaitingForConnectivity -> Running -> ShuttingDown
//! ```
//!
//! - **Starting**: LEDs cleared, display blanked.
//! - **WaitingForConnectivity**: the network is polled until it is up, with a
//!   waiting frame on the display. The home location is resolved afterwards.
//! - **Running**: night check, fetch with bounded retry, snapshot, normalize,
//!   render, push, sleep. Repeats until cancelled or a fatal error.
//! - **ShuttingDown**: [`shutdown`] runs exactly once whatever ended the run,
//!   including a panic inside the loop.
//!
//! Roster cycling and the test pattern skip the weather path but end through
//! the same shutdown.

pub mod error;

use chrono::Utc;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::backend::{DisplayOutput, LedOutput};
use crate::commands;
use crate::config::Config;
use crate::geo::{SolarTracker, resolve_home_location, solar::HomeLocationError};
use crate::io::lock::InstanceLock;
use crate::io::network::NetworkStatus;
use crate::io::signals::SignalState;
use crate::render::{self, DisplayFrame, RenderState};
use crate::weather::{
    ReportSource, fetch::write_snapshot, fetch_with_retry, latest_report_time, normalize,
};

pub use error::{ExitReason, LoopError};

/// What the process was started to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Normal weather display.
    #[default]
    Monitor,
    /// Light each airport in turn with its identifier on the display.
    CycleRoster,
    /// Show both palettes and one status frame, then hold.
    TestPattern,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Monitor => write!(f, "monitor"),
            RunMode::CycleRoster => write!(f, "airport cycling"),
            RunMode::TestPattern => write!(f, "display test"),
        }
    }
}

/// Lifecycle phase of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    WaitingForConnectivity,
    Running,
    ShuttingDown,
}

/// Everything [`Core`] needs, bundled to keep the constructor readable.
pub struct CoreParams {
    pub leds: Box<dyn LedOutput>,
    pub display: Box<dyn DisplayOutput>,
    pub source: Box<dyn ReportSource>,
    pub network: Box<dyn NetworkStatus>,
    pub config: Config,
    pub signal_state: SignalState,
    pub mode: RunMode,
    pub debug_enabled: bool,
    /// Held for the lifetime of the loop, released on drop
    pub lock: Option<InstanceLock>,
}

pub struct Core {
    leds: Box<dyn LedOutput>,
    display: Box<dyn DisplayOutput>,
    source: Box<dyn ReportSource>,
    network: Box<dyn NetworkStatus>,
    config: Config,
    signal_state: SignalState,
    mode: RunMode,
    debug_enabled: bool,
    phase: Phase,
    _lock: Option<InstanceLock>,
}

impl Core {
    pub fn new(params: CoreParams) -> Self {
        Self {
            leds: params.leds,
            display: params.display,
            source: params.source,
            network: params.network,
            config: params.config,
            signal_state: params.signal_state,
            mode: params.mode,
            debug_enabled: params.debug_enabled,
            phase: Phase::Starting,
            _lock: params.lock,
        }
    }

    /// Run until cancelled or a fatal error, then shut the outputs down.
    pub fn execute(mut self) -> ExitReason {
        log_block_start!(
            "Starting in {} mode ({} LEDs, {} display)",
            self.mode,
            self.leds.slot_count(),
            self.display.backend_name()
        );

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run()))
            .unwrap_or_else(|payload| Err(LoopError::Panic(panic_message(payload.as_ref()))));

        let reason = match outcome {
            Ok(()) | Err(LoopError::Cancelled) => ExitReason::Cancelled,
            Err(e) => ExitReason::Fatal(e),
        };

        self.set_phase(Phase::ShuttingDown);
        shutdown(self.leds.as_mut(), self.display.as_mut(), &reason);
        reason
    }

    fn run(&mut self) -> Result<(), LoopError> {
        self.set_phase(Phase::Starting);
        self.leds.clear().map_err(LoopError::Output)?;
        self.blank_display();

        match self.mode {
            RunMode::Monitor => {
                self.wait_for_connectivity()?;
                let mut tracker = self.solar_tracker()?;
                self.set_phase(Phase::Running);
                self.monitor(&mut tracker)
            }
            RunMode::CycleRoster => {
                self.set_phase(Phase::Running);
                commands::cycle::run(
                    self.leds.as_mut(),
                    self.display.as_mut(),
                    &self.config.roster(),
                    self.config.cycle_dwell(),
                    &self.signal_state,
                )
            }
            RunMode::TestPattern => {
                self.set_phase(Phase::Running);
                commands::test_pattern::run(
                    self.leds.as_mut(),
                    self.display.as_mut(),
                    self.network.as_ref(),
                    &self.signal_state,
                )
            }
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.debug_enabled && self.phase != phase {
            log_debug!("Phase {:?} -> {:?}", self.phase, phase);
        }
        self.phase = phase;
    }

    fn wait_for_connectivity(&mut self) -> Result<(), LoopError> {
        self.set_phase(Phase::WaitingForConnectivity);
        let mut announced = false;

        loop {
            if !self.signal_state.is_running() {
                return Err(LoopError::Cancelled);
            }
            if self.network.is_connected() {
                break;
            }

            if !announced {
                log_block_start!("Waiting for network connectivity...");
                self.render_display(&DisplayFrame::WaitingForNetwork);
                announced = true;
            }
            if self.signal_state.wait(self.config.connectivity_interval()) {
                return Err(LoopError::Cancelled);
            }
        }

        if announced {
            log_decorated!("Network connected");
        }
        Ok(())
    }

    fn solar_tracker(&self) -> Result<SolarTracker, LoopError> {
        if let Some(location) = self.config.configured_location() {
            log_block_start!("Using configured location {location}");
            return Ok(SolarTracker::new(location));
        }

        let home = self
            .config
            .home_station()
            .ok_or_else(|| HomeLocationError::NoCoordinates("(no home station)".to_string()))?;

        log_block_start!("Looking up home station {home}");
        let location = resolve_home_location(
            self.source.as_ref(),
            &home,
            self.config.fetch_retries(),
            &self.signal_state.running,
        )?;
        log_decorated!("Home station {home} at {location}");

        Ok(SolarTracker::new(location))
    }

    fn monitor(&mut self, tracker: &mut SolarTracker) -> Result<(), LoopError> {
        let roster = self.config.roster();
        let station_ids = roster.as_slice().to_vec();
        log_block_start!("Monitoring: {}", station_ids.join(", "));

        loop {
            if !self.signal_state.is_running() {
                return Err(LoopError::Cancelled);
            }

            let is_night = tracker.night_now();
            log_block_start!("Night mode: {}", if is_night { "on" } else { "off" });

            let reports = fetch_with_retry(
                self.source.as_ref(),
                &station_ids,
                self.config.fetch_retries(),
                &self.signal_state.running,
            )?;

            if let Err(e) = write_snapshot(Path::new(self.config.snapshot_path()), &reports) {
                log_warning!("Failed to write snapshot: {e:#}");
            }

            let categories = normalize(&reports, &roster);
            for station in &roster {
                log_indented!("{station} > {}", categories.get(station));
            }

            let state = render::build(
                &categories,
                &roster,
                is_night,
                &self.network.connectivity(),
                latest_report_time(&reports),
                Utc::now(),
            );
            self.push(&state)?;

            if self.signal_state.wait(self.config.update_interval()) {
                return Err(LoopError::Cancelled);
            }
        }
    }

    /// LED failures are fatal; the display is best effort.
    fn push(&mut self, state: &RenderState) -> Result<(), LoopError> {
        self.leds.show(&state.colors).map_err(LoopError::Output)?;
        self.render_display(&DisplayFrame::Status(state.display_text.clone()));
        Ok(())
    }

    fn render_display(&mut self, frame: &DisplayFrame) {
        if let Err(e) = self.display.render(frame) {
            log_warning!("Display update failed: {e:#}");
        }
    }

    fn blank_display(&mut self) {
        if let Err(e) = self.display.blank() {
            log_warning!("Failed to blank display: {e:#}");
        }
    }
}

/// Single cleanup path: clear the LEDs, then blank the display after a
/// cancellation or leave an error frame after a fatal error.
pub fn shutdown(leds: &mut dyn LedOutput, display: &mut dyn DisplayOutput, reason: &ExitReason) {
    match reason {
        ExitReason::Cancelled => log_block_start!("Shutting down"),
        ExitReason::Fatal(e) => {
            log_pipe!();
            log_critical!("{e}");
            log_decorated!("Shutting down");
        }
    }

    if let Err(e) = leds.clear() {
        log_warning!("Failed to clear LEDs: {e:#}");
    }

    let result = match reason {
        ExitReason::Cancelled => display.blank(),
        ExitReason::Fatal(e) => display.render(&DisplayFrame::Error {
            summary: e.summary().to_string(),
        }),
    };
    if let Err(e) = result {
        log_warning!("Failed to reset display: {e:#}");
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
