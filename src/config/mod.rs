//! Configuration for the board: airports, home station and output hardware.
//!
//! The configuration lives in `metarmap.toml`, by default at
//! `$XDG_CONFIG_HOME/metarmap/metarmap.toml`:
//!
//! ```toml
//! #[Airports]
//! airports = ["KSEA", "KBFI", "KPAE"]  # One station per LED, in string order
//! home = "KSEA"                        # Station whose sunrise/sunset dims the board
//!
//! #[Location]
//! latitude = 47.4447                   # Optional, skips the home station lookup
//! longitude = -122.3144
//!
//! #[Hardware]
//! output = "simulated"                 # "simulated" or "device"
//! led_count = 30                       # LEDs on the string (1-1024)
//! spi_device = "/dev/spidev0.0"
//! i2c_bus = "/dev/i2c-1"
//!
//! #[Timing]
//! update_interval = 60                 # Seconds between refreshes (10-3600)
//! fetch_timeout = 15                   # Seconds per HTTP request (1-120)
//! fetch_retries = 5                    # Retries after a failed fetch (0-20)
//! connectivity_interval = 10           # Seconds between network checks (1-300)
//! cycle_dwell = 3                      # Seconds per airport in cycling mode (1-60)
//!
//! #[Data]
//! snapshot_path = "latest_metars.json"
//! api_url = "https://aviationweather.gov/api/data/metar"
//! ```
//!
//! Every field except `airports` is optional and falls back to the defaults in
//! [`crate::common::constants`]. Values are range-checked on load; errors name
//! the offending field and its allowed range.

pub mod builder;
pub mod loading;
pub mod validation;

use serde::Deserialize;
use std::time::Duration;

use crate::common::constants::*;
use crate::geo::Location;
use crate::weather::{StationRoster, normalize_station_id};

pub use builder::create_default_config;
pub use loading::{get_config_path, load, load_from_path};

/// Where frames are sent.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Frames are written to the log. Works on any machine.
    #[default]
    Simulated,
    /// WS2812 string over SPI and SSD1306 display over I2C.
    Device,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Simulated => "simulated",
            OutputMode::Device => "device",
        }
    }
}

/// Parsed `metarmap.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub airports: Vec<String>,
    pub home: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub output: Option<OutputMode>,
    pub led_count: Option<usize>,
    pub spi_device: Option<String>,
    pub i2c_bus: Option<String>,
    pub update_interval: Option<u64>,       // seconds
    pub fetch_timeout: Option<u64>,         // seconds
    pub fetch_retries: Option<u32>,
    pub connectivity_interval: Option<u64>, // seconds
    pub cycle_dwell: Option<u64>,           // seconds
    pub snapshot_path: Option<String>,
    pub api_url: Option<String>,
}

impl Config {
    /// Configured airports as an ordered, upper-cased roster.
    pub fn roster(&self) -> StationRoster {
        StationRoster::new(&self.airports)
    }

    /// Home station, defaulting to the first airport.
    pub fn home_station(&self) -> Option<String> {
        self.home
            .as_deref()
            .map(normalize_station_id)
            .filter(|id| !id.is_empty())
            .or_else(|| self.airports.first().map(|id| normalize_station_id(id)))
    }

    /// Fixed coordinates, when both are configured.
    pub fn configured_location(&self) -> Option<Location> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Location::new(lat, lon).ok(),
            _ => None,
        }
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output.unwrap_or_default()
    }

    pub fn led_count(&self) -> usize {
        self.led_count.unwrap_or(DEFAULT_LED_COUNT)
    }

    pub fn spi_device(&self) -> &str {
        self.spi_device.as_deref().unwrap_or(DEFAULT_SPI_DEVICE)
    }

    pub fn i2c_bus(&self) -> &str {
        self.i2c_bus.as_deref().unwrap_or(DEFAULT_I2C_BUS)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval.unwrap_or(DEFAULT_UPDATE_INTERVAL))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout.unwrap_or(DEFAULT_FETCH_TIMEOUT))
    }

    pub fn fetch_retries(&self) -> u32 {
        self.fetch_retries.unwrap_or(DEFAULT_FETCH_RETRIES)
    }

    pub fn connectivity_interval(&self) -> Duration {
        Duration::from_secs(
            self.connectivity_interval
                .unwrap_or(DEFAULT_CONNECTIVITY_INTERVAL),
        )
    }

    pub fn cycle_dwell(&self) -> Duration {
        Duration::from_secs(self.cycle_dwell.unwrap_or(DEFAULT_CYCLE_DWELL))
    }

    pub fn snapshot_path(&self) -> &str {
        self.snapshot_path
            .as_deref()
            .unwrap_or(DEFAULT_SNAPSHOT_PATH)
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// Log the effective settings at startup.
    pub fn log_config(&self) {
        let roster = self.roster();
        log_block_start!("Loaded configuration");
        log_indented!("Airports: {} ({} stations)", roster.as_slice().join(", "), roster.len());
        if let Some(home) = self.home_station() {
            log_indented!("Home station: {home}");
        }
        if let Some(location) = self.configured_location() {
            log_indented!("Location: {location}");
        }
        log_indented!("Output: {}", self.output_mode().as_str());
        if self.output_mode() == OutputMode::Device {
            log_indented!("LED string: {} LEDs on {}", self.led_count(), self.spi_device());
            log_indented!("Display: {}", self.i2c_bus());
        }
        log_indented!("Update interval: {}s", self.update_interval().as_secs());
        log_indented!(
            "Fetch: {}s timeout, {} retries",
            self.fetch_timeout().as_secs(),
            self.fetch_retries()
        );
        log_indented!("Snapshot: {}", self.snapshot_path());
    }
}

#[cfg(test)]
mod tests;
