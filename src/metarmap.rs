//! Application coordinator that manages the complete lifecycle of metarmap.
//!
//! Resource acquisition happens here, in this order: configuration, the
//! single-instance lock, signal handling, the report client and finally the
//! outputs. Nothing fallible runs after the outputs are open, so a failed
//! startup never leaves LEDs lit. The control loop itself lives in
//! [`crate::core`].
//!
//! ```no_run
//! use metarmap::MetarMap;
//! use metarmap::core::RunMode;
//!
//! let reason = MetarMap::new(false)
//!     .with_mode(RunMode::CycleRoster)
//!     .dry_run()
//!     .run();
//! std::process::exit(reason.exit_code());
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::{
    backend::create_outputs,
    config::{self, Config},
    core::{Core, CoreParams, ExitReason, LoopError, RunMode},
    io::{lock::acquire_lock, network::SystemNetwork, signals::setup_signal_handler},
    weather::AviationWeatherClient,
};

/// Builder for configuring and running the map.
pub struct MetarMap {
    debug_enabled: bool,
    config_path: Option<PathBuf>,
    dry_run: bool,
    mode: RunMode,
    create_lock: bool,
}

impl MetarMap {
    /// Create a new runner with defaults matching a normal run
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            config_path: None,
            dry_run: false,
            mode: RunMode::Monitor,
            create_lock: true,
        }
    }

    /// Read configuration from this file instead of the default location
    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Log frames instead of driving the hardware
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Skip the single-instance lock
    pub fn without_lock(mut self) -> Self {
        self.create_lock = false;
        self
    }

    /// Run until shutdown and report why the process ended.
    ///
    /// Setup failures (bad configuration, lock held, outputs unavailable)
    /// are reported as fatal before the control loop starts.
    pub fn run(self) -> ExitReason {
        match self.prepare() {
            Ok(core) => core.execute(),
            Err(e) => {
                log_error_exit!("Startup failed");
                eprintln!("{e:?}");
                ExitReason::Fatal(LoopError::Startup(e))
            }
        }
    }

    fn prepare(&self) -> Result<Core> {
        let config = self.load_config()?;

        let lock = if self.create_lock {
            let lock = acquire_lock()?;
            if self.debug_enabled {
                log_debug!("Lock acquired at {}", lock.path().display());
            }
            Some(lock)
        } else {
            None
        };

        let signal_state = setup_signal_handler(self.debug_enabled)?;

        config.log_config();
        if self.dry_run {
            log_block_start!("Dry run: LED and display frames go to the log");
        }

        let source = AviationWeatherClient::new(config.api_url(), config.fetch_timeout())?;
        let outputs = create_outputs(&config, self.dry_run).context("Failed to open outputs")?;

        Ok(Core::new(CoreParams {
            leds: outputs.leds,
            display: outputs.display,
            source: Box::new(source),
            network: Box::new(SystemNetwork),
            config,
            signal_state,
            mode: self.mode,
            debug_enabled: self.debug_enabled,
            lock,
        }))
    }

    fn load_config(&self) -> Result<Config> {
        match &self.config_path {
            Some(path) => config::load_from_path(path),
            None => config::load(),
        }
    }
}
