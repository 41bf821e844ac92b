//! Day/night tracking for the board's home location.
//!
//! Sunrise and sunset come from the `sunrise` crate for a UTC date. West of
//! Greenwich the daylight window of one UTC date can end after the next UTC
//! midnight (and east of it start before the previous one), so a moment is
//! considered night only when it falls inside none of the windows of the
//! surrounding dates.
//!
//! Above the polar circles the sun may not rise or set at all on a date. The
//! crate then reports no usable events, and the date is classified as polar
//! day or polar night from the sun's elevation at noon.

use anyhow::Result;
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use std::f64::consts::TAU;
use std::sync::atomic::AtomicBool;
use sunrise::{Coordinates, SolarDay, SolarEvent};
use thiserror::Error;

use super::Location;
use crate::weather::fetch::{FetchError, ReportSource, fetch_with_retry};
use crate::weather::normalize::{report_location, station_id};

/// Noon elevation (degrees) above which the sun's disk stays above the
/// horizon, accounting for refraction.
const HORIZON_ELEVATION: f64 = -0.833;

/// Published day/night flag, owned and updated only by [`SolarTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolarState {
    pub is_night: bool,
    pub computed_for_date: NaiveDate,
}

/// Daylight on one UTC date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Daylight {
    /// Ordinary day with a sunrise and a sunset.
    Window {
        sunrise: DateTime<Utc>,
        sunset: DateTime<Utc>,
    },
    /// The sun never sets.
    PolarDay,
    /// The sun never rises.
    PolarNight,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DaylightWindow {
    pub date: NaiveDate,
    pub daylight: Daylight,
}

impl DaylightWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        match self.daylight {
            Daylight::Window { sunrise, sunset } => sunrise <= instant && instant <= sunset,
            Daylight::PolarDay => instant.date_naive() == self.date,
            Daylight::PolarNight => false,
        }
    }
}

/// Compute the daylight of `date` at `location`.
pub fn daylight_window(location: &Location, date: NaiveDate) -> Result<DaylightWindow> {
    let coord = Coordinates::new(location.latitude, location.longitude)
        .ok_or_else(|| anyhow::anyhow!("Invalid coordinates: {location}"))?;
    let solar_day = SolarDay::new(coord, date);
    let sunrise = solar_day.event_time(SolarEvent::Sunrise);
    let sunset = solar_day.event_time(SolarEvent::Sunset);

    let daylight = if is_plausible_event(sunrise, date)
        && is_plausible_event(sunset, date)
        && sunrise < sunset
    {
        Daylight::Window { sunrise, sunset }
    } else if noon_elevation(location.latitude, date) > HORIZON_ELEVATION {
        Daylight::PolarDay
    } else {
        Daylight::PolarNight
    };

    Ok(DaylightWindow { date, daylight })
}

/// Events for `date` fall within a day of it; anything else (the crate
/// answers with the epoch) means the event does not happen.
fn is_plausible_event(event: DateTime<Utc>, date: NaiveDate) -> bool {
    let day = event.date_naive();
    date.checked_sub_days(Days::new(1)).is_some_and(|d| day >= d)
        && date.checked_add_days(Days::new(1)).is_some_and(|d| day <= d)
}

/// Approximate solar elevation at local noon, in degrees.
fn noon_elevation(latitude: f64, date: NaiveDate) -> f64 {
    let day_of_year = f64::from(date.ordinal());
    let declination = 23.44 * (TAU * (284.0 + day_of_year) / 365.0).sin();
    90.0 - (latitude - declination).abs()
}

fn windows_around(location: &Location, date: NaiveDate) -> Vec<DaylightWindow> {
    [
        date.checked_sub_days(Days::new(1)),
        Some(date),
        date.checked_add_days(Days::new(1)),
    ]
    .into_iter()
    .flatten()
    .filter_map(|d| daylight_window(location, d).ok())
    .collect()
}

fn night_among(windows: &[DaylightWindow], now: DateTime<Utc>) -> bool {
    // Without any window (invalid coordinates) prefer the bright palette
    !windows.is_empty() && !windows.iter().any(|w| w.contains(now))
}

/// Whether `now` is outside daylight at `location`. Pure.
pub fn is_night_at(location: &Location, now: DateTime<Utc>) -> bool {
    night_among(&windows_around(location, now.date_naive()), now)
}

/// Memoizing day/night tracker.
///
/// Windows are recomputed only when the UTC date changes; the result is the
/// same as calling [`is_night_at`] every time.
#[derive(Debug, Clone)]
pub struct SolarTracker {
    location: Location,
    windows: Vec<DaylightWindow>,
    state: Option<SolarState>,
}

impl SolarTracker {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            windows: Vec::new(),
            state: None,
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Last computed state, `None` before the first query.
    pub fn state(&self) -> Option<SolarState> {
        self.state
    }

    /// Today's window, if it has been computed.
    pub fn today(&self) -> Option<&DaylightWindow> {
        let date = self.state?.computed_for_date;
        self.windows.iter().find(|w| w.date == date)
    }

    pub fn night_now(&mut self) -> bool {
        self.night_at(Utc::now())
    }

    pub fn night_at(&mut self, now: DateTime<Utc>) -> bool {
        let date = now.date_naive();
        if self.state.map(|s| s.computed_for_date) != Some(date) {
            self.windows = windows_around(&self.location, date);
        }

        let is_night = night_among(&self.windows, now);
        self.state = Some(SolarState {
            is_night,
            computed_for_date: date,
        });
        is_night
    }
}

/// Failure to find the home station's coordinates.
#[derive(Debug, Error)]
pub enum HomeLocationError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("home station {0} did not report valid coordinates")]
    NoCoordinates(String),
}

/// Look up the home station once through the report source and take its
/// coordinates from the report. Only the home station's own record counts.
pub fn resolve_home_location(
    source: &dyn ReportSource,
    home_station_id: &str,
    max_retries: u32,
    running: &AtomicBool,
) -> Result<Location, HomeLocationError> {
    let home = crate::weather::normalize_station_id(home_station_id);
    let reports = fetch_with_retry(source, std::slice::from_ref(&home), max_retries, running)?;

    reports
        .iter()
        .filter(|record| station_id(record).as_deref() == Some(home.as_str()))
        .find_map(report_location)
        .ok_or(HomeLocationError::NoCoordinates(home))
}
