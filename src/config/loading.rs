//! Configuration loading.
//!
//! Resolves the config file path, creates a default file on first run and
//! parses and validates the TOML.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;
use super::validation::validate_config;

pub const CONFIG_DIR_NAME: &str = "metarmap";
pub const CONFIG_FILE_NAME: &str = "metarmap.toml";

/// Default configuration file path: `$XDG_CONFIG_HOME/metarmap/metarmap.toml`.
pub fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load configuration from the default path.
///
/// A commented default file is written first if none exists.
pub fn load() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        super::builder::create_default_config(&config_path)
            .context("Failed to create default config during load")?;
        log_block_start!("Created default configuration: {}", config_path.display());
        log_indented!("Edit the airport list to match your map");
    }

    load_from_path(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))
}

/// Load configuration from an explicit path. Never creates the file.
pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Configuration file not found: {}", path.display());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    parse(&content).with_context(|| format!("Invalid config in {}", path.display()))
}

/// Parse and validate configuration text.
pub fn parse(content: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(content).context("Failed to parse TOML")?;
    apply_modifications(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Normalize station identifiers and drop blank entries before validation.
fn apply_modifications(config: &mut Config) {
    config.airports.retain(|id| !id.trim().is_empty());
    for id in &mut config.airports {
        *id = crate::weather::normalize_station_id(id);
    }
    if let Some(home) = &config.home {
        let home = crate::weather::normalize_station_id(home);
        config.home = (!home.is_empty()).then_some(home);
    }
}
