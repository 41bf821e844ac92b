//! Outcomes of the control loop.

use thiserror::Error;

use crate::common::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::geo::solar::HomeLocationError;
use crate::weather::FetchError;

/// Why the control loop stopped.
#[derive(Debug, Error)]
pub enum LoopError {
    #[error("shutdown requested")]
    Cancelled,
    #[error("fetch failed: {0}")]
    Fetch(FetchError),
    #[error("home location unavailable: {0}")]
    HomeLocation(HomeLocationError),
    #[error("LED output failed: {0:#}")]
    Output(anyhow::Error),
    #[error("control loop panicked: {0}")]
    Panic(String),
    #[error("startup failed: {0:#}")]
    Startup(anyhow::Error),
}

impl LoopError {
    /// Short label for the display's error frame.
    pub fn summary(&self) -> &'static str {
        match self {
            LoopError::Cancelled => "Cancelled",
            LoopError::Fetch(_) => "FetchExhausted",
            LoopError::HomeLocation(_) => "NoHomeLocation",
            LoopError::Output(_) => "LedFailure",
            LoopError::Panic(_) => "Panic",
            LoopError::Startup(_) => "Startup",
        }
    }
}

impl From<FetchError> for LoopError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Cancelled => LoopError::Cancelled,
            other => LoopError::Fetch(other),
        }
    }
}

impl From<HomeLocationError> for LoopError {
    fn from(e: HomeLocationError) -> Self {
        match e {
            HomeLocationError::Fetch(fetch) => fetch.into(),
            other => LoopError::HomeLocation(other),
        }
    }
}

/// How the process ends.
#[derive(Debug)]
pub enum ExitReason {
    Cancelled,
    Fatal(LoopError),
}

impl ExitReason {
    pub fn exit_code(&self) -> i32 {
        if self.is_fatal() {
            EXIT_FAILURE
        } else {
            EXIT_SUCCESS
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, ExitReason::Fatal(_))
    }
}
