//! Roster cycling: light one airport at a time to check the wiring.
//!
//! Each slot in turn shows the VFR day color while every other LED is off and
//! the display names the slot and station. Runs until cancelled.

use std::time::Duration;

use crate::backend::{DisplayOutput, LedOutput};
use crate::core::LoopError;
use crate::io::signals::SignalState;
use crate::render::{Color, DAY_PALETTE, DisplayFrame};
use crate::weather::StationRoster;

pub fn run(
    leds: &mut dyn LedOutput,
    display: &mut dyn DisplayOutput,
    roster: &StationRoster,
    dwell: Duration,
    signal_state: &SignalState,
) -> Result<(), LoopError> {
    let visible = roster.len().min(leds.slot_count());
    if visible < roster.len() {
        log_warning!(
            "Only the first {visible} of {} airports fit on the LED string",
            roster.len()
        );
    }

    if visible == 0 {
        log_warning!("Nothing to cycle through");
        while !signal_state.wait(dwell) {}
        return Err(LoopError::Cancelled);
    }

    log_block_start!("Cycling {visible} airports, {}s each", dwell.as_secs());
    loop {
        for (slot, station_id) in roster.iter().enumerate().take(visible) {
            leds.show(&single_slot(slot)).map_err(LoopError::Output)?;

            log_decorated!("{slot} - {station_id}");
            let frame = DisplayFrame::Station {
                slot,
                station_id: station_id.clone(),
            };
            if let Err(e) = display.render(&frame) {
                log_warning!("Display update failed: {e:#}");
            }

            if signal_state.wait(dwell) {
                return Err(LoopError::Cancelled);
            }
        }
    }
}

/// Frame with only `slot` lit.
fn single_slot(slot: usize) -> Vec<Color> {
    let mut frame = vec![Color::OFF; slot + 1];
    frame[slot] = DAY_PALETTE.vfr;
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_slot_frame() {
        assert_eq!(single_slot(0), vec![DAY_PALETTE.vfr]);
        assert_eq!(
            single_slot(2),
            vec![Color::OFF, Color::OFF, DAY_PALETTE.vfr]
        );
    }
}
