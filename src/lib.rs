//! # metarmap
//!
//! Drives an LED METAR map: one LED per airport colored by flight category,
//! dimmed after dark, with a small status display.
//!
//! ## Architecture
//!
//! - **Entry Point**: `MetarMap` builder acquires resources and runs the loop
//! - **Core Logic**: `core` contains the poll-render control loop and shutdown
//! - **Weather**: `weather` fetches reports, classifies ceilings and folds
//!   records into one category per airport
//! - **Geographic**: `geo` tracks day and night for the home location
//! - **Rendering**: `render` turns categories into colors and status text
//! - **Backends**: `backend` drives the WS2812 string and SSD1306 display, or
//!   simulates both in the log
//! - **Configuration**: `config` for TOML settings with validation
//! - **Commands**: `commands` for the airport cycling and display test modes
//! - **Infrastructure**: signal handling, lock file, network probe, logging

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod common;

pub mod args;
pub mod backend;
pub mod commands;
pub mod config;
pub mod core;
pub mod geo;
pub mod io;
pub mod render;
pub mod weather;

mod metarmap;

pub use metarmap::MetarMap;
