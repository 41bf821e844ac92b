//! Log-only outputs for running without the board attached.

use anyhow::Result;

use super::{DisplayOutput, LedOutput, fit_to_slots};
use crate::render::{Color, DisplayFrame};

/// LED string that logs each frame and remembers the last one.
#[derive(Debug)]
pub struct SimulatedLeds {
    slots: Vec<Color>,
}

impl SimulatedLeds {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![Color::OFF; slot_count],
        }
    }

    /// Colors currently "lit".
    pub fn slots(&self) -> &[Color] {
        &self.slots
    }
}

impl LedOutput for SimulatedLeds {
    fn show(&mut self, colors: &[Color]) -> Result<()> {
        self.slots = fit_to_slots(colors, self.slots.len());
        let lit = self.slots.iter().filter(|c| **c != Color::OFF).count();
        let preview = self
            .slots
            .iter()
            .map(Color::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        log_indented!("LEDs ({lit}/{} lit): {preview}", self.slots.len());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.slots.fill(Color::OFF);
        log_indented!("LEDs cleared");
        Ok(())
    }

    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn backend_name(&self) -> &'static str {
        "simulated"
    }
}

/// Display that logs the text of each frame.
#[derive(Debug, Default)]
pub struct SimulatedDisplay {
    last_frame: Option<DisplayFrame>,
}

impl SimulatedDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> Option<&DisplayFrame> {
        self.last_frame.as_ref()
    }
}

impl DisplayOutput for SimulatedDisplay {
    fn render(&mut self, frame: &DisplayFrame) -> Result<()> {
        let mut text = frame.lines().join(" | ");
        if let DisplayFrame::Status(status) = frame {
            match status.signal_bars {
                Some(bars) => text.push_str(&format!(" | signal {bars}/4")),
                None => text.push_str(" | signal x"),
            }
        }
        log_indented!("Display: {text}");
        self.last_frame = Some(frame.clone());
        Ok(())
    }

    fn blank(&mut self) -> Result<()> {
        log_indented!("Display blanked");
        self.last_frame = None;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "simulated"
    }
}
