//! Render state: what the LED string and the status display should show.
//!
//! Everything here is pure. The control loop hands the result to the output
//! backends, which do the actual I/O.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::common::constants::{DISCONNECTED_LABEL, NOT_AVAILABLE};
use crate::weather::{FlightCategory, StationCategories, StationRoster};

/// An RGB color. Backends convert to their wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const OFF: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Category to color table for one brightness profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub vfr: Color,
    pub mvfr: Color,
    pub ifr: Color,
    pub lifr: Color,
    pub unk: Color,
}

impl Palette {
    pub fn color(&self, category: FlightCategory) -> Color {
        match category {
            FlightCategory::Vfr => self.vfr,
            FlightCategory::Mvfr => self.mvfr,
            FlightCategory::Ifr => self.ifr,
            FlightCategory::Lifr => self.lifr,
            FlightCategory::Unk => self.unk,
        }
    }

    /// Colors in `FlightCategory::ALL` order.
    pub fn colors(&self) -> [Color; 5] {
        FlightCategory::ALL.map(|category| self.color(category))
    }
}

pub const DAY_PALETTE: Palette = Palette {
    vfr: Color::new(0, 140, 0),
    mvfr: Color::new(0, 0, 140),
    ifr: Color::new(140, 0, 0),
    lifr: Color::new(120, 0, 80),
    unk: Color::new(100, 100, 100),
};

pub const NIGHT_PALETTE: Palette = Palette {
    vfr: Color::new(0, 45, 0),
    mvfr: Color::new(0, 0, 45),
    ifr: Color::new(45, 0, 0),
    lifr: Color::new(64, 0, 64),
    unk: Color::new(50, 50, 50),
};

/// The whole table for the current brightness profile. Tables are never mixed.
pub fn palette(is_night: bool) -> &'static Palette {
    if is_night { &NIGHT_PALETTE } else { &DAY_PALETTE }
}

/// Network facts sampled once per cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connectivity {
    pub ip: Option<String>,
    pub signal_dbm: Option<i32>,
}

/// Text fields of the status display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusText {
    /// `HH:MM` UTC of the newest report, `N/A` when unknown.
    pub last_report_time: String,
    /// `HH:MM` UTC.
    pub now_time: String,
    /// IP address or `Disconnected`.
    pub connectivity_label: String,
    /// 1 to 4, `None` draws crossed-out bars.
    pub signal_bars: Option<u8>,
}

impl StatusText {
    pub fn new(
        connectivity: &Connectivity,
        last_report_time: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            last_report_time: last_report_time
                .map(hhmm)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            now_time: hhmm(now),
            connectivity_label: connectivity
                .ip
                .clone()
                .unwrap_or_else(|| DISCONNECTED_LABEL.to_string()),
            signal_bars: signal_bars(connectivity.signal_dbm),
        }
    }
}

/// Complete output of one cycle, rebuilt from scratch every time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderState {
    pub colors: Vec<Color>,
    pub display_text: StatusText,
    pub is_night: bool,
}

/// Content of the auxiliary display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayFrame {
    Status(StatusText),
    WaitingForNetwork,
    /// Roster cycling: the lit slot and its station.
    Station { slot: usize, station_id: String },
    Error { summary: String },
}

impl DisplayFrame {
    /// Text content, one entry per display line.
    pub fn lines(&self) -> Vec<String> {
        match self {
            DisplayFrame::Status(text) => vec![
                format!("WX: {}z", text.last_report_time),
                format!("{}z", text.now_time),
                text.connectivity_label.clone(),
            ],
            DisplayFrame::WaitingForNetwork => vec!["WiFi Connecting".to_string()],
            DisplayFrame::Station { slot, station_id } => vec![format!("{slot} - {station_id}")],
            DisplayFrame::Error { summary } => vec!["ERROR".to_string(), summary.clone()],
        }
    }
}

/// Combine categories and the day/night flag into a render state.
pub fn build(
    categories: &StationCategories,
    roster: &StationRoster,
    is_night: bool,
    connectivity: &Connectivity,
    last_report_time: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> RenderState {
    let palette = palette(is_night);
    let colors = roster
        .iter()
        .map(|station| palette.color(categories.get(station)))
        .collect();

    RenderState {
        colors,
        display_text: StatusText::new(connectivity, last_report_time, now),
        is_night,
    }
}

/// Map a received signal level to 1-4 bars.
pub fn signal_bars(signal_dbm: Option<i32>) -> Option<u8> {
    signal_dbm.map(|dbm| match dbm {
        d if d >= -60 => 4,
        d if d >= -70 => 3,
        d if d >= -80 => 2,
        _ => 1,
    })
}

/// `HH:MM` in UTC.
pub fn hhmm(time: DateTime<Utc>) -> String {
    time.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::normalize;
    use chrono::TimeZone;
    use serde_json::json;

    fn categories_for(roster: &StationRoster) -> StationCategories {
        let reports = crate::weather::fetch::parse_response(json!([
            {"icaoId": "KSEA", "clouds": [{"cover": "OVC", "base": 400}]},
            {"icaoId": "KBFI", "clouds": [{"cover": "BKN", "base": 2000}]},
            {"icaoId": "KPAE", "clouds": []}
        ]));
        normalize(&reports, roster)
    }

    fn connected() -> Connectivity {
        Connectivity {
            ip: Some("192.168.1.20".to_string()),
            signal_dbm: Some(-65),
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 5, 0).unwrap()
    }

    #[test]
    fn test_colors_follow_roster_order() {
        let roster = StationRoster::new(["KPAE", "KSEA", "KOLM", "KBFI"]);
        let state = build(
            &categories_for(&roster),
            &roster,
            false,
            &connected(),
            None,
            noon(),
        );

        assert_eq!(
            state.colors,
            vec![
                DAY_PALETTE.vfr,
                DAY_PALETTE.lifr,
                DAY_PALETTE.unk,
                DAY_PALETTE.mvfr
            ]
        );
        assert!(!state.is_night);
    }

    #[test]
    fn test_night_uses_dim_table_for_every_slot() {
        let roster = StationRoster::new(["KPAE", "KSEA", "KOLM", "KBFI"]);
        let state = build(
            &categories_for(&roster),
            &roster,
            true,
            &connected(),
            None,
            noon(),
        );

        assert_eq!(state.colors.len(), roster.len());
        let night = NIGHT_PALETTE.colors();
        assert!(state.colors.iter().all(|c| night.contains(c)));
        assert!(state.is_night);
    }

    #[test]
    fn test_palettes_do_not_share_colors() {
        let day = DAY_PALETTE.colors();
        assert!(NIGHT_PALETTE.colors().iter().all(|c| !day.contains(c)));
    }

    #[test]
    fn test_empty_roster_builds_empty_colors() {
        let roster = StationRoster::new(Vec::<String>::new());
        let state = build(
            &categories_for(&roster),
            &roster,
            false,
            &Connectivity::default(),
            None,
            noon(),
        );
        assert!(state.colors.is_empty());
    }

    #[test]
    fn test_status_text_fields() {
        let roster = StationRoster::new(["KSEA"]);
        let report = Utc.with_ymd_and_hms(2025, 6, 1, 11, 53, 0).unwrap();
        let state = build(
            &categories_for(&roster),
            &roster,
            false,
            &connected(),
            Some(report),
            noon(),
        );

        assert_eq!(
            state.display_text,
            StatusText {
                last_report_time: "11:53".to_string(),
                now_time: "12:05".to_string(),
                connectivity_label: "192.168.1.20".to_string(),
                signal_bars: Some(3),
            }
        );
    }

    #[test]
    fn test_status_text_when_offline_and_stale() {
        let text = StatusText::new(&Connectivity::default(), None, noon());
        assert_eq!(text.last_report_time, "N/A");
        assert_eq!(text.connectivity_label, "Disconnected");
        assert_eq!(text.signal_bars, None);
    }

    #[test]
    fn test_signal_bar_thresholds() {
        assert_eq!(signal_bars(Some(-40)), Some(4));
        assert_eq!(signal_bars(Some(-60)), Some(4));
        assert_eq!(signal_bars(Some(-61)), Some(3));
        assert_eq!(signal_bars(Some(-70)), Some(3));
        assert_eq!(signal_bars(Some(-80)), Some(2));
        assert_eq!(signal_bars(Some(-81)), Some(1));
        assert_eq!(signal_bars(Some(-95)), Some(1));
        assert_eq!(signal_bars(None), None);
    }

    #[test]
    fn test_frame_lines() {
        let text = StatusText::new(&connected(), None, noon());
        assert_eq!(
            DisplayFrame::Status(text).lines(),
            vec!["WX: N/Az", "12:05z", "192.168.1.20"]
        );
        assert_eq!(
            DisplayFrame::Station {
                slot: 3,
                station_id: "KPAE".to_string()
            }
            .lines(),
            vec!["3 - KPAE"]
        );
        assert_eq!(DisplayFrame::WaitingForNetwork.lines(), vec!["WiFi Connecting"]);
        assert_eq!(
            DisplayFrame::Error {
                summary: "FetchExhausted".to_string()
            }
            .lines(),
            vec!["ERROR", "FetchExhausted"]
        );
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color::new(120, 0, 80).to_string(), "#780050");
        assert_eq!(Color::OFF, Color::default());
    }
}
