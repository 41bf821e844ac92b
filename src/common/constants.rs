//! Application-wide defaults and limits.
//!
//! Config fields fall back to the `DEFAULT_*` values here when absent, and the
//! `MINIMUM_*`/`MAXIMUM_*` pairs bound what validation accepts.

// # Application Defaults

pub const DEFAULT_UPDATE_INTERVAL: u64 = 60; // seconds between weather refreshes
pub const DEFAULT_FETCH_TIMEOUT: u64 = 15; // seconds per HTTP request
pub const DEFAULT_FETCH_RETRIES: u32 = 5; // immediate retries after the first attempt
pub const DEFAULT_CONNECTIVITY_INTERVAL: u64 = 10; // seconds between network checks
pub const DEFAULT_CYCLE_DWELL: u64 = 3; // seconds each airport stays lit when cycling
pub const DEFAULT_LED_COUNT: usize = 30;
pub const DEFAULT_SPI_DEVICE: &str = "/dev/spidev0.0";
pub const DEFAULT_I2C_BUS: &str = "/dev/i2c-1";
pub const DEFAULT_SNAPSHOT_PATH: &str = "latest_metars.json";
pub const DEFAULT_API_URL: &str = "https://aviationweather.gov/api/data/metar";

// # Validation Limits

pub const MINIMUM_UPDATE_INTERVAL: u64 = 10;
pub const MAXIMUM_UPDATE_INTERVAL: u64 = 3600;
pub const MINIMUM_FETCH_TIMEOUT: u64 = 1;
pub const MAXIMUM_FETCH_TIMEOUT: u64 = 120;
pub const MAXIMUM_FETCH_RETRIES: u32 = 20;
pub const MINIMUM_CONNECTIVITY_INTERVAL: u64 = 1;
pub const MAXIMUM_CONNECTIVITY_INTERVAL: u64 = 300;
pub const MINIMUM_CYCLE_DWELL: u64 = 1;
pub const MAXIMUM_CYCLE_DWELL: u64 = 60;
pub const MAXIMUM_LED_COUNT: usize = 1024;

// # Flight Category Thresholds (feet AGL)

pub const LIFR_CEILING_BELOW: f64 = 500.0;
pub const IFR_CEILING_BELOW: f64 = 1000.0;
pub const MVFR_CEILING_BELOW: f64 = 3000.0;

// # Display

pub const NOT_AVAILABLE: &str = "N/A";
pub const DISCONNECTED_LABEL: &str = "Disconnected";

// # Exit Codes

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
