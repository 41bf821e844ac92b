//! Configuration validation.
//!
//! Range checks for every numeric field and shape checks for the airport
//! list. Errors name the field and the accepted range.

use anyhow::Result;
use std::collections::HashSet;
use std::ops::RangeInclusive;

use super::Config;
use crate::common::constants::*;
use crate::weather::normalize_station_id;

/// Validate a loaded configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.airports.is_empty() {
        anyhow::bail!("airports must list at least one station");
    }

    let mut seen = HashSet::new();
    for airport in &config.airports {
        validate_station_id(airport, "airports")?;
        if !seen.insert(normalize_station_id(airport)) {
            log_warning!(
                "Station {} is listed more than once; every occurrence shows the same color",
                normalize_station_id(airport)
            );
        }
    }

    if let Some(home) = &config.home {
        validate_station_id(home, "home")?;
    }

    if let Some(lat) = config.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat);
    }

    if let Some(lon) = config.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            lon
        );
    }

    if config.latitude.is_some() != config.longitude.is_some() {
        anyhow::bail!("latitude and longitude must be set together");
    }

    if let Some(count) = config.led_count
        && !(1..=MAXIMUM_LED_COUNT).contains(&count)
    {
        anyhow::bail!(
            "led_count ({}) must be between 1 and {}",
            count,
            MAXIMUM_LED_COUNT
        );
    }

    check_range(
        config.update_interval,
        "update_interval",
        MINIMUM_UPDATE_INTERVAL..=MAXIMUM_UPDATE_INTERVAL,
        "seconds",
    )?;
    check_range(
        config.fetch_timeout,
        "fetch_timeout",
        MINIMUM_FETCH_TIMEOUT..=MAXIMUM_FETCH_TIMEOUT,
        "seconds",
    )?;
    check_range(
        config.fetch_retries,
        "fetch_retries",
        0..=MAXIMUM_FETCH_RETRIES,
        "retries",
    )?;
    check_range(
        config.connectivity_interval,
        "connectivity_interval",
        MINIMUM_CONNECTIVITY_INTERVAL..=MAXIMUM_CONNECTIVITY_INTERVAL,
        "seconds",
    )?;
    check_range(
        config.cycle_dwell,
        "cycle_dwell",
        MINIMUM_CYCLE_DWELL..=MAXIMUM_CYCLE_DWELL,
        "seconds",
    )?;

    if let Some(url) = &config.api_url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        anyhow::bail!("api_url must be an http:// or https:// URL (got {url})");
    }

    if let Some(path) = &config.snapshot_path
        && path.trim().is_empty()
    {
        anyhow::bail!("snapshot_path must not be empty");
    }

    // More stations than LEDs is allowed; the extra stations are never shown
    let led_count = config.led_count.unwrap_or(DEFAULT_LED_COUNT);
    if config.airports.len() > led_count {
        log_warning!(
            "{} airports configured but only {} LEDs; stations past slot {} are not shown",
            config.airports.len(),
            led_count,
            led_count
        );
    }

    Ok(())
}

/// Station identifiers are 3 or 4 ASCII letters or digits.
pub(crate) fn validate_station_id(id: &str, field_name: &str) -> Result<()> {
    let id = id.trim();
    if !(3..=4).contains(&id.len()) || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        anyhow::bail!(
            "{} entry \"{}\" is not a valid station identifier (3-4 letters or digits)",
            field_name,
            id
        );
    }
    Ok(())
}

fn check_range<T>(
    value: Option<T>,
    field_name: &str,
    range: RangeInclusive<T>,
    unit: &str,
) -> Result<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if let Some(value) = value
        && !range.contains(&value)
    {
        anyhow::bail!(
            "{} ({} {}) must be between {} and {} {}",
            field_name,
            value,
            unit,
            range.start(),
            range.end(),
            unit
        );
    }
    Ok(())
}
