//! Output backends for the LED string and the status display.
//!
//! The control loop only talks to the [`LedOutput`] and [`DisplayOutput`]
//! traits. Two families implement them:
//!
//! - **Simulated**: frames are written to the log. Works on any machine and is
//!   forced by `--dry-run`.
//! - **Device** (cargo feature `hardware`): a WS2812 string driven over SPI and
//!   a 128x32 SSD1306 OLED on I2C.
//!
//! Selection happens once at startup from `output = "simulated" | "device"`.

use anyhow::Result;

use crate::config::{Config, OutputMode};
use crate::render::{Color, DisplayFrame};

#[cfg(feature = "hardware")]
pub mod oled;
pub mod simulated;
pub mod ws2812;

/// An addressable LED string.
pub trait LedOutput {
    /// Light slot *i* with `colors[i]`. Colors past the end of the string are
    /// dropped; slots without a color are turned off.
    fn show(&mut self, colors: &[Color]) -> Result<()>;

    /// Turn every LED off.
    fn clear(&mut self) -> Result<()>;

    fn slot_count(&self) -> usize;

    fn backend_name(&self) -> &'static str;
}

/// The auxiliary status display.
pub trait DisplayOutput {
    fn render(&mut self, frame: &DisplayFrame) -> Result<()>;

    /// Clear the screen.
    fn blank(&mut self) -> Result<()>;

    fn backend_name(&self) -> &'static str;
}

/// The pair of outputs driven by the control loop.
pub struct Outputs {
    pub leds: Box<dyn LedOutput>,
    pub display: Box<dyn DisplayOutput>,
}

/// Fit a color sequence to a string of `slot_count` LEDs.
pub fn fit_to_slots(colors: &[Color], slot_count: usize) -> Vec<Color> {
    let mut frame: Vec<Color> = colors.iter().copied().take(slot_count).collect();
    frame.resize(slot_count, Color::OFF);
    frame
}

/// Create the outputs selected by configuration. `dry_run` forces simulation.
pub fn create_outputs(config: &Config, dry_run: bool) -> Result<Outputs> {
    let mode = if dry_run {
        OutputMode::Simulated
    } else {
        config.output_mode()
    };

    match mode {
        OutputMode::Simulated => Ok(Outputs {
            leds: Box::new(simulated::SimulatedLeds::new(config.led_count())),
            display: Box::new(simulated::SimulatedDisplay::new()),
        }),
        OutputMode::Device => create_device_outputs(config),
    }
}

#[cfg(feature = "hardware")]
fn create_device_outputs(config: &Config) -> Result<Outputs> {
    let leds = ws2812::Ws2812Spi::open(config.spi_device(), config.led_count())?;
    let display = oled::OledDisplay::open(config.i2c_bus())?;
    Ok(Outputs {
        leds: Box::new(leds),
        display: Box::new(display),
    })
}

#[cfg(not(feature = "hardware"))]
fn create_device_outputs(_config: &Config) -> Result<Outputs> {
    anyhow::bail!(
        "output = \"device\" requires a build with the `hardware` feature \
         (cargo build --features hardware), or run with --dry-run"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_to_slots_truncates_and_pads() {
        let red = Color::new(140, 0, 0);
        assert_eq!(fit_to_slots(&[red, red, red], 2), vec![red, red]);
        assert_eq!(fit_to_slots(&[red], 3), vec![red, Color::OFF, Color::OFF]);
        assert!(fit_to_slots(&[red], 0).is_empty());
    }

    #[test]
    fn test_dry_run_forces_simulation() {
        let config = Config {
            airports: vec!["KSEA".to_string()],
            output: Some(OutputMode::Device),
            led_count: Some(12),
            ..Default::default()
        };
        let outputs = create_outputs(&config, true).unwrap();
        assert_eq!(outputs.leds.backend_name(), "simulated");
        assert_eq!(outputs.leds.slot_count(), 12);
        assert_eq!(outputs.display.backend_name(), "simulated");
    }

    #[cfg(not(feature = "hardware"))]
    #[test]
    fn test_device_output_needs_hardware_feature() {
        let config = Config {
            airports: vec!["KSEA".to_string()],
            output: Some(OutputMode::Device),
            ..Default::default()
        };
        let err = create_outputs(&config, false).err().unwrap();
        assert!(err.to_string().contains("hardware"));
    }
}
