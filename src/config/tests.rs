use super::loading::parse;
use super::validation::validate_config;
use super::*;
use crate::common::logger::Log;
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

fn minimal_config() -> Config {
    Config {
        airports: vec!["KSEA".to_string(), "KBFI".to_string()],
        ..Default::default()
    }
}

#[test]
fn test_minimal_config_uses_defaults() {
    let config = parse(r#"airports = ["ksea", " kbfi "]"#).unwrap();

    assert_eq!(config.airports, vec!["KSEA", "KBFI"]);
    assert_eq!(config.home_station(), Some("KSEA".to_string()));
    assert_eq!(config.output_mode(), OutputMode::Simulated);
    assert_eq!(config.led_count(), DEFAULT_LED_COUNT);
    assert_eq!(config.update_interval().as_secs(), DEFAULT_UPDATE_INTERVAL);
    assert_eq!(config.fetch_timeout().as_secs(), DEFAULT_FETCH_TIMEOUT);
    assert_eq!(config.fetch_retries(), DEFAULT_FETCH_RETRIES);
    assert_eq!(config.cycle_dwell().as_secs(), DEFAULT_CYCLE_DWELL);
    assert_eq!(config.snapshot_path(), DEFAULT_SNAPSHOT_PATH);
    assert_eq!(config.api_url(), DEFAULT_API_URL);
    assert_eq!(config.configured_location(), None);
}

#[test]
fn test_full_config_parses() {
    let config = parse(
        r#"
        airports = ["KSEA", "KBFI", "KPAE"]
        home = "kpae"
        latitude = 47.9063
        longitude = -122.2816
        output = "device"
        led_count = 50
        spi_device = "/dev/spidev1.0"
        i2c_bus = "/dev/i2c-3"
        update_interval = 300
        fetch_timeout = 30
        fetch_retries = 0
        connectivity_interval = 5
        cycle_dwell = 10
        snapshot_path = "/var/lib/metarmap/latest.json"
        api_url = "http://localhost:8080/metar"
        "#,
    )
    .unwrap();

    assert_eq!(config.home_station(), Some("KPAE".to_string()));
    assert_eq!(config.output_mode(), OutputMode::Device);
    assert_eq!(config.led_count(), 50);
    assert_eq!(config.spi_device(), "/dev/spidev1.0");
    assert_eq!(config.i2c_bus(), "/dev/i2c-3");
    assert_eq!(config.update_interval().as_secs(), 300);
    assert_eq!(config.fetch_retries(), 0);
    assert_eq!(config.connectivity_interval().as_secs(), 5);
    let location = config.configured_location().unwrap();
    assert_eq!(location.latitude, 47.9063);
    assert_eq!(location.longitude, -122.2816);
}

#[test]
fn test_roster_preserves_order() {
    let config = parse(r#"airports = ["KPAE", "KSEA", "KBFI"]"#).unwrap();
    let roster = config.roster();
    assert_eq!(roster.as_slice(), ["KPAE", "KSEA", "KBFI"]);
}

#[test]
fn test_empty_airports_rejected() {
    assert!(parse("airports = []").is_err());
    assert!(parse("home = \"KSEA\"").is_err());
    assert!(parse(r#"airports = ["  "]"#).is_err());
}

#[test]
fn test_invalid_station_ids_rejected() {
    let err = parse(r#"airports = ["KSEA", "K-BF"]"#).unwrap_err();
    assert!(format!("{err:#}").contains("K-BF"));

    assert!(parse(r#"airports = ["KSEATTLE"]"#).is_err());
    assert!(parse(r#"airports = ["KS"]"#).is_err());
    assert!(parse(r#"airports = ["KSEA"]
home = "SEATAC""#)
        .is_err());
    // Three-character identifiers are fine
    assert!(parse(r#"airports = ["S43"]"#).is_ok());
}

#[test]
fn test_blank_home_falls_back_to_first_airport() {
    let config = parse(
        r#"airports = ["KBFI", "KSEA"]
home = "" "#,
    );
    // A blank home is dropped before validation
    let config = config.unwrap();
    assert_eq!(config.home, None);
    assert_eq!(config.home_station(), Some("KBFI".to_string()));
}

#[test]
fn test_range_validation_names_field_and_bounds() {
    let cases = [
        ("update_interval", "5", "update_interval (5 seconds) must be between 10 and 3600 seconds"),
        ("fetch_timeout", "0", "fetch_timeout (0 seconds) must be between 1 and 120 seconds"),
        ("fetch_retries", "21", "fetch_retries (21 retries) must be between 0 and 20 retries"),
        (
            "connectivity_interval",
            "301",
            "connectivity_interval (301 seconds) must be between 1 and 300 seconds",
        ),
        ("cycle_dwell", "61", "cycle_dwell (61 seconds) must be between 1 and 60 seconds"),
        ("led_count", "0", "led_count (0) must be between 1 and 1024"),
    ];

    for (field, value, expected) in cases {
        let text = format!("airports = [\"KSEA\"]\n{field} = {value}");
        let err = parse(&text).unwrap_err();
        assert_eq!(err.to_string(), expected, "{field}");
    }
}

#[test]
fn test_coordinate_validation() {
    let mut config = minimal_config();
    config.latitude = Some(91.0);
    config.longitude = Some(0.0);
    assert!(validate_config(&config).is_err());

    config.latitude = Some(45.0);
    config.longitude = Some(-181.0);
    assert!(validate_config(&config).is_err());

    config.longitude = None;
    let err = validate_config(&config).unwrap_err();
    assert!(err.to_string().contains("together"));

    config.longitude = Some(-122.0);
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_more_airports_than_leds_only_warns() {
    Log::set_enabled(false);
    let mut config = minimal_config();
    config.led_count = Some(1);
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_api_url_must_be_http() {
    let mut config = minimal_config();
    config.api_url = Some("ftp://example.com".to_string());
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_unknown_output_mode_rejected() {
    assert!(parse("airports = [\"KSEA\"]\noutput = \"neopixel\"").is_err());
}

#[test]
fn test_default_config_content_round_trips() {
    let config = parse(&builder::default_config_content()).unwrap();
    assert_eq!(config.airports, vec!["KSEA", "KBFI", "KPAE", "KOLM"]);
    assert_eq!(config.home_station(), Some("KSEA".to_string()));
    assert_eq!(config.update_interval, Some(DEFAULT_UPDATE_INTERVAL));
    assert_eq!(config.configured_location(), None);
}

#[test]
fn test_load_from_missing_path_fails() {
    let dir = tempdir().unwrap();
    let result = load_from_path(&dir.path().join("nope.toml"));
    assert!(result.is_err());
}

#[test]
fn test_load_from_path_reports_file_on_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("metarmap.toml");
    fs::write(&path, "airports = [\"KSEA\"]\nupdate_interval = 1\n").unwrap();

    let err = load_from_path(&path).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("metarmap.toml"));
    assert!(message.contains("update_interval"));
}

#[test]
#[serial]
fn test_config_load_default_creation() {
    Log::set_enabled(false);
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("metarmap").join("metarmap.toml");

    let original = std::env::var("XDG_CONFIG_HOME").ok();
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
    }

    let result = load();

    unsafe {
        match original {
            Some(val) => std::env::set_var("XDG_CONFIG_HOME", val),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }

    let config = result.unwrap();
    assert!(config_path.exists());
    assert_eq!(config.airports.len(), 4);
}
