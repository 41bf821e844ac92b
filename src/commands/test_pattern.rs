//! Display test: both palettes on the first ten LEDs and one status frame.
//!
//! Slots 0-4 show the day colors and slots 5-9 the night colors, each in
//! VFR, MVFR, IFR, LIFR, UNK order. The display shows a status frame with
//! live network facts and no report time. Holds until cancelled.

use chrono::Utc;
use std::time::Duration;

use crate::backend::{DisplayOutput, LedOutput};
use crate::core::LoopError;
use crate::io::network::NetworkStatus;
use crate::io::signals::SignalState;
use crate::render::{Color, DAY_PALETTE, DisplayFrame, NIGHT_PALETTE, StatusText};

const HOLD_POLL: Duration = Duration::from_secs(3600);

pub fn pattern() -> Vec<Color> {
    DAY_PALETTE
        .colors()
        .into_iter()
        .chain(NIGHT_PALETTE.colors())
        .collect()
}

pub fn run(
    leds: &mut dyn LedOutput,
    display: &mut dyn DisplayOutput,
    network: &dyn NetworkStatus,
    signal_state: &SignalState,
) -> Result<(), LoopError> {
    log_block_start!("Showing day and night palettes on LEDs 0-9");
    leds.show(&pattern()).map_err(LoopError::Output)?;

    let status = StatusText::new(&network.connectivity(), None, Utc::now());
    if let Err(e) = display.render(&DisplayFrame::Status(status)) {
        log_warning!("Display update failed: {e:#}");
    }

    log_decorated!("Holding until interrupted (Ctrl+C)");
    while !signal_state.wait(HOLD_POLL) {}
    Err(LoopError::Cancelled)
}
