//! METAR data model and the weather-to-category pipeline.
//!
//! - [`classify`]: cloud layers to a flight-rules category
//! - [`normalize`]: raw feed records to one category per roster station
//! - [`fetch`]: the report source abstraction, HTTP client and bounded retry

pub mod classify;
pub mod fetch;
pub mod normalize;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use classify::{ceiling, classify};
pub use fetch::{AviationWeatherClient, FetchError, ReportSource, fetch_with_retry};
pub use normalize::{StationCategories, latest_report_time, normalize};

/// One record of the weather feed, kept as loose JSON so that malformed or
/// unexpected fields never fail a whole fetch.
pub type RawReport = serde_json::Map<String, serde_json::Value>;

/// Sky cover code of a single cloud layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CloudCover {
    Skc,
    Clr,
    Cavok,
    Nsc,
    Few,
    Sct,
    Bkn,
    Ovc,
    Other(String),
}

impl CloudCover {
    /// Parse a METAR cover code, case-insensitively.
    pub fn parse(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "SKC" => CloudCover::Skc,
            "CLR" => CloudCover::Clr,
            "CAVOK" => CloudCover::Cavok,
            "NSC" => CloudCover::Nsc,
            "FEW" => CloudCover::Few,
            "SCT" => CloudCover::Sct,
            "BKN" => CloudCover::Bkn,
            "OVC" => CloudCover::Ovc,
            other => CloudCover::Other(other.to_string()),
        }
    }

    /// Broken and overcast layers are the ones that form a ceiling.
    pub fn forms_ceiling(&self) -> bool {
        matches!(self, CloudCover::Bkn | CloudCover::Ovc)
    }
}

/// A reported cloud layer.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudLayer {
    pub cover: CloudCover,
    /// Layer base in feet AGL, absent when the report carried none.
    pub base_feet: Option<f64>,
}

impl CloudLayer {
    pub fn new(cover: CloudCover, base_feet: Option<f64>) -> Self {
        Self { cover, base_feet }
    }
}

/// Flight-rules category of a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlightCategory {
    Vfr,
    Mvfr,
    Ifr,
    Lifr,
    /// No usable report for the station.
    #[default]
    Unk,
}

impl FlightCategory {
    pub const ALL: [FlightCategory; 5] = [
        FlightCategory::Vfr,
        FlightCategory::Mvfr,
        FlightCategory::Ifr,
        FlightCategory::Lifr,
        FlightCategory::Unk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightCategory::Vfr => "VFR",
            FlightCategory::Mvfr => "MVFR",
            FlightCategory::Ifr => "IFR",
            FlightCategory::Lifr => "LIFR",
            FlightCategory::Unk => "UNK",
        }
    }
}

impl fmt::Display for FlightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered station identifiers; slot `i` of the LED string shows station `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationRoster {
    stations: Vec<String>,
}

impl StationRoster {
    /// Build a roster, trimming and upper-casing every identifier.
    pub fn new<I, S>(stations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stations: stations
                .into_iter()
                .map(|s| normalize_station_id(s.as_ref()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn contains(&self, station_id: &str) -> bool {
        self.stations.iter().any(|s| s == station_id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.stations.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.stations
    }
}

impl<'a> IntoIterator for &'a StationRoster {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.stations.iter()
    }
}

/// Canonical form of an ICAO identifier.
pub fn normalize_station_id(id: &str) -> String {
    id.trim().to_ascii_uppercase()
}
