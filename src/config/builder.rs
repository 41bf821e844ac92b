//! Default configuration file generation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::common::constants::*;

const SAMPLE_AIRPORTS: [&str; 4] = ["KSEA", "KBFI", "KPAE", "KOLM"];

/// Write a commented default config to `path`, creating parent directories.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    fs::write(path, default_config_content())
        .with_context(|| format!("Failed to write default config to {}", path.display()))
}

/// Text of the default config, with aligned comments.
pub fn default_config_content() -> String {
    let airports = SAMPLE_AIRPORTS
        .iter()
        .map(|id| format!("\"{id}\""))
        .collect::<Vec<_>>()
        .join(", ");

    let mut content = ConfigBuilder::new()
        .add_section("Airports")
        .add_setting(
            "airports",
            &format!("[{airports}]"),
            "One station per LED, in string order",
        )
        .add_setting(
            "home",
            &format!("\"{}\"", SAMPLE_AIRPORTS[0]),
            "Station whose sunrise/sunset dims the board",
        )
        .add_section("Hardware")
        .add_setting("output", "\"simulated\"", "Output: \"simulated\" or \"device\"")
        .add_setting(
            "led_count",
            &DEFAULT_LED_COUNT.to_string(),
            &format!("LEDs on the string (1-{MAXIMUM_LED_COUNT})"),
        )
        .add_setting(
            "spi_device",
            &format!("\"{DEFAULT_SPI_DEVICE}\""),
            "SPI device driving the LED string",
        )
        .add_setting(
            "i2c_bus",
            &format!("\"{DEFAULT_I2C_BUS}\""),
            "I2C bus of the status display",
        )
        .add_section("Timing")
        .add_setting(
            "update_interval",
            &DEFAULT_UPDATE_INTERVAL.to_string(),
            &format!(
                "Seconds between refreshes ({MINIMUM_UPDATE_INTERVAL}-{MAXIMUM_UPDATE_INTERVAL})"
            ),
        )
        .add_setting(
            "fetch_timeout",
            &DEFAULT_FETCH_TIMEOUT.to_string(),
            &format!("Seconds per request ({MINIMUM_FETCH_TIMEOUT}-{MAXIMUM_FETCH_TIMEOUT})"),
        )
        .add_setting(
            "fetch_retries",
            &DEFAULT_FETCH_RETRIES.to_string(),
            &format!("Retries after an empty or failed fetch (0-{MAXIMUM_FETCH_RETRIES})"),
        )
        .add_setting(
            "connectivity_interval",
            &DEFAULT_CONNECTIVITY_INTERVAL.to_string(),
            &format!(
                "Seconds between network checks ({MINIMUM_CONNECTIVITY_INTERVAL}-{MAXIMUM_CONNECTIVITY_INTERVAL})"
            ),
        )
        .add_setting(
            "cycle_dwell",
            &DEFAULT_CYCLE_DWELL.to_string(),
            &format!("Seconds per airport when cycling ({MINIMUM_CYCLE_DWELL}-{MAXIMUM_CYCLE_DWELL})"),
        )
        .add_section("Data")
        .add_setting(
            "snapshot_path",
            &format!("\"{DEFAULT_SNAPSHOT_PATH}\""),
            "Raw reports of the last fetch",
        )
        .add_setting(
            "api_url",
            &format!("\"{DEFAULT_API_URL}\""),
            "METAR data API",
        )
        .build();

    content.push_str(
        "\n\n#[Location]\n\
         # Set both to skip looking up the home station's coordinates\n\
         # latitude = 47.4447\n\
         # longitude = -122.3144\n",
    );
    content
}

struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        // Comments line up one space after the longest setting
        let width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                ConfigEntry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut lines = Vec::new();
        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) => {
                    if !lines.is_empty() {
                        lines.push(String::new());
                    }
                    lines.push(title);
                }
                ConfigEntry::Setting { line, comment } => {
                    lines.push(format!("{line:<width$}{comment}"));
                }
            }
        }
        lines.join("\n")
    }
}
