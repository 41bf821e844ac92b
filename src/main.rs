//! Main entry point for metarmap.
//!
//! Parses arguments and hands off to the [`MetarMap`] builder. The exit code
//! is 0 after a requested shutdown and 1 after a fatal error.

use std::path::PathBuf;

use metarmap::args::{self, CliAction, ParsedArgs};
use metarmap::common::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use metarmap::common::logger::Log;
use metarmap::{MetarMap, log_end, log_error_exit, log_version};

fn main() {
    let parsed_args = ParsedArgs::from_env();

    let code = match parsed_args.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            EXIT_SUCCESS
        }
        CliAction::ShowHelp => {
            args::display_help();
            EXIT_SUCCESS
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            EXIT_FAILURE
        }
        CliAction::Run {
            debug_enabled,
            config_path,
            dry_run,
            mode,
            log_file,
        } => {
            // Keep the guard alive until the loop has finished
            let _log_guard = match log_file.as_deref().map(Log::start_file_logging).transpose() {
                Ok(guard) => guard,
                Err(e) => {
                    log_error_exit!("Failed to start file logging");
                    eprintln!("{e:?}");
                    std::process::exit(EXIT_FAILURE);
                }
            };

            log_version!();

            let mut runner = MetarMap::new(debug_enabled)
                .with_config_path(config_path.map(PathBuf::from))
                .with_mode(mode);
            if dry_run {
                runner = runner.dry_run();
            }

            let reason = runner.run();
            log_end!();
            reason.exit_code()
        }
    };

    std::process::exit(code);
}
