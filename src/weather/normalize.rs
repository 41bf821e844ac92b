//! Folding raw feed records into one category per roster station.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

use super::{
    CloudCover, CloudLayer, FlightCategory, RawReport, StationRoster, classify,
    normalize_station_id,
};
use crate::geo::Location;

/// Field names that may carry the station identifier, probed in order.
const STATION_ID_FIELDS: [&str; 5] = ["icaoId", "station_id", "station", "icao", "id"];

/// Closed mapping from roster station to category.
///
/// Built only by [`normalize`], so every roster station has exactly one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct StationCategories {
    categories: HashMap<String, FlightCategory>,
}

impl StationCategories {
    fn unknown_for(roster: &StationRoster) -> Self {
        Self {
            categories: roster
                .iter()
                .map(|id| (id.clone(), FlightCategory::Unk))
                .collect(),
        }
    }

    /// Category for a station, `Unk` for anything not on the roster.
    pub fn get(&self, station_id: &str) -> FlightCategory {
        self.categories
            .get(station_id)
            .copied()
            .unwrap_or(FlightCategory::Unk)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FlightCategory)> {
        self.categories.iter()
    }
}

/// Map raw records to a category for each roster station.
///
/// Records without an identifier, for stations off the roster, or with a
/// malformed `clouds` field are skipped. When a station appears more than once
/// the last record wins.
pub fn normalize(reports: &[RawReport], roster: &StationRoster) -> StationCategories {
    let mut result = StationCategories::unknown_for(roster);

    for record in reports {
        let Some(station_id) = station_id(record) else {
            continue;
        };
        if !roster.contains(&station_id) {
            continue;
        }
        let Some(clouds) = cloud_layers(record) else {
            continue;
        };
        result.categories.insert(station_id, classify(&clouds));
    }

    result
}

/// First non-empty identifier field, upper-cased.
pub fn station_id(record: &RawReport) -> Option<String> {
    STATION_ID_FIELDS
        .iter()
        .filter_map(|field| record.get(*field).and_then(Value::as_str))
        .map(normalize_station_id)
        .find(|id| !id.is_empty())
}

/// Cloud layers of a record.
///
/// A missing field means a clear report. A field of the wrong type makes the
/// whole record unusable (`None`); individual bad layers are dropped.
pub fn cloud_layers(record: &RawReport) -> Option<Vec<CloudLayer>> {
    let clouds = match record.get("clouds") {
        None | Some(Value::Null) => return Some(Vec::new()),
        Some(Value::Array(layers)) => layers,
        Some(_) => return None,
    };

    Some(
        clouds
            .iter()
            .filter_map(|layer| {
                let cover = layer.get("cover")?.as_str()?;
                let base_feet = layer.get("base").and_then(Value::as_f64);
                Some(CloudLayer::new(CloudCover::parse(cover), base_feet))
            })
            .collect(),
    )
}

/// Observation time of a record.
///
/// `reportTime` is accepted as RFC 3339 or `YYYY-MM-DD HH:MM:SS` (UTC);
/// `obsTime` (unix seconds) is the fallback.
pub fn report_time(record: &RawReport) -> Option<DateTime<Utc>> {
    let from_text = record
        .get("reportTime")
        .and_then(Value::as_str)
        .and_then(parse_report_time);

    from_text.or_else(|| {
        record
            .get("obsTime")
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    })
}

fn parse_report_time(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Newest observation time across a fetch, used as the freshness indicator.
pub fn latest_report_time(reports: &[RawReport]) -> Option<DateTime<Utc>> {
    reports.iter().filter_map(report_time).max()
}

/// Station coordinates from the record's `lat`/`lon` fields.
pub fn report_location(record: &RawReport) -> Option<Location> {
    let latitude = record.get("lat").and_then(Value::as_f64)?;
    let longitude = record.get("lon").and_then(Value::as_f64)?;
    Location::new(latitude, longitude).ok()
}
