//! Report retrieval: the source abstraction, the aviationweather.gov client,
//! bounded retry and the diagnostic snapshot.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;

use super::RawReport;

const USER_AGENT: &str = concat!("metarmap/", env!("CARGO_PKG_VERSION"));

/// Anything that can produce METAR records for a set of stations.
///
/// Failures of any kind (network, HTTP status, undecodable body) surface as
/// an empty result; callers treat empty and failed the same way.
#[cfg_attr(test, mockall::automock)]
pub trait ReportSource {
    fn fetch_reports(&self, station_ids: &[String]) -> Vec<RawReport>;
}

/// Why a fetch cycle produced no reports.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("no METAR data after {attempts} attempts")]
    Exhausted { attempts: u32 },
    #[error("fetch interrupted by shutdown")]
    Cancelled,
}

/// Fetch with one initial attempt plus up to `max_retries` immediate retries.
///
/// An empty result counts as a failure. Shutdown is checked before every
/// attempt so a pending cancellation never waits out the remaining retries.
pub fn fetch_with_retry(
    source: &dyn ReportSource,
    station_ids: &[String],
    max_retries: u32,
    running: &AtomicBool,
) -> Result<Vec<RawReport>, FetchError> {
    let attempts = max_retries + 1;

    for attempt in 1..=attempts {
        if !running.load(Ordering::SeqCst) {
            return Err(FetchError::Cancelled);
        }

        let reports = source.fetch_reports(station_ids);
        if !reports.is_empty() {
            if attempt > 1 {
                log_decorated!("Fetched {} reports on attempt {attempt}", reports.len());
            }
            return Ok(reports);
        }

        if attempt < attempts {
            log_warning!("No METAR data (attempt {attempt}/{attempts}), retrying...");
        }
    }

    Err(FetchError::Exhausted { attempts })
}

/// Blocking client for the aviationweather.gov data API.
pub struct AviationWeatherClient {
    client: reqwest::blocking::Client,
    api_url: String,
}

impl AviationWeatherClient {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
        })
    }

    fn request(&self, station_ids: &[String]) -> Result<Vec<RawReport>> {
        let ids = station_ids.join(",");
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("ids", ids.as_str()), ("format", "json"), ("taf", "false")])
            .send()
            .context("Request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {status} from {}", self.api_url);
        }

        let body: Value = response.json().context("Failed to decode response")?;
        Ok(parse_response(body))
    }
}

impl ReportSource for AviationWeatherClient {
    fn fetch_reports(&self, station_ids: &[String]) -> Vec<RawReport> {
        match self.request(station_ids) {
            Ok(reports) => reports,
            Err(e) => {
                log_error!("METAR fetch error: {e:#}");
                Vec::new()
            }
        }
    }
}

/// Extract report objects from a response body.
///
/// The API answers with a bare array, older versions wrap it in `{"data": [...]}`.
/// Elements that are not JSON objects are dropped.
pub fn parse_response(body: Value) -> Vec<RawReport> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

/// Write the raw records of the last successful fetch for diagnostics.
///
/// The file is replaced atomically so readers never see a partial document.
pub fn write_snapshot(path: &Path, reports: &[RawReport]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    serde_json::to_writer_pretty(&mut tmp, reports).context("Failed to serialize snapshot")?;
    tmp.persist(path)
        .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::logger::Log;
    use mockall::Sequence;
    use serde_json::json;

    fn one_report() -> Vec<RawReport> {
        parse_response(json!([{"icaoId": "KSEA", "clouds": []}]))
    }

    fn ids() -> Vec<String> {
        vec!["KSEA".to_string()]
    }

    #[test]
    fn test_first_success_needs_no_retry() {
        let mut source = MockReportSource::new();
        source
            .expect_fetch_reports()
            .times(1)
            .returning(|_| one_report());

        let running = AtomicBool::new(true);
        let reports = fetch_with_retry(&source, &ids(), 5, &running).unwrap();
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn test_six_empty_results_exhaust_after_fifth_retry() {
        Log::set_enabled(false);
        let mut source = MockReportSource::new();
        source
            .expect_fetch_reports()
            .times(6)
            .returning(|_| Vec::new());

        let running = AtomicBool::new(true);
        let result = fetch_with_retry(&source, &ids(), 5, &running);
        assert_eq!(result, Err(FetchError::Exhausted { attempts: 6 }));
    }

    #[test]
    fn test_success_on_last_retry_is_not_fatal() {
        Log::set_enabled(false);
        let mut seq = Sequence::new();
        let mut source = MockReportSource::new();
        source
            .expect_fetch_reports()
            .times(5)
            .in_sequence(&mut seq)
            .returning(|_| Vec::new());
        source
            .expect_fetch_reports()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| one_report());

        let running = AtomicBool::new(true);
        assert!(fetch_with_retry(&source, &ids(), 5, &running).is_ok());
    }

    #[test]
    fn test_shutdown_stops_retrying() {
        let mut source = MockReportSource::new();
        source.expect_fetch_reports().times(0);

        let running = AtomicBool::new(false);
        let result = fetch_with_retry(&source, &ids(), 5, &running);
        assert_eq!(result, Err(FetchError::Cancelled));
    }

    #[test]
    fn test_parse_response_shapes() {
        assert_eq!(parse_response(json!([{"icaoId": "KSEA"}, 3, "x"])).len(), 1);
        assert_eq!(
            parse_response(json!({"data": [{"icaoId": "KSEA"}, {"icaoId": "KBFI"}]})).len(),
            2
        );
        assert!(parse_response(json!({"error": "bad ids"})).is_empty());
        assert!(parse_response(json!(null)).is_empty());
    }

    #[test]
    fn test_snapshot_is_pretty_json_of_raw_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latest_metars.json");
        let reports = parse_response(json!([{"icaoId": "KSEA", "rawOb": "KSEA 011453Z"}]));

        write_snapshot(&path, &reports).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains('\n'));
        let parsed: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, json!([{"icaoId": "KSEA", "rawOb": "KSEA 011453Z"}]));
    }
}
