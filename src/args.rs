//! Command-line argument parsing and processing.
//!
//! Flags select the run mode and a few overrides; everything else comes from
//! the configuration file. Unknown options print the help and exit non-zero.

use crate::core::RunMode;

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the map with these settings
    Run {
        debug_enabled: bool,
        config_path: Option<String>,
        dry_run: bool,
        mode: RunMode,
        log_file: Option<String>,
    },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// The first item is the program name and is skipped. Version wins over
    /// help, help wins over everything else, and any parse error turns the
    /// action into [`CliAction::ShowHelpDueToError`].
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut dry_run = false;
        let mut cycle_airports = false;
        let mut test_displays = false;
        let mut unknown_arg_found = false;
        let mut config_path: Option<String> = None;
        let mut log_file: Option<String> = None;

        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut i = 0;
        while i < args_vec.len() {
            let arg_str = args_vec[i].as_str();
            match arg_str {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--debug" | "-d" => debug_enabled = true,
                "--dry-run" | "-n" => dry_run = true,
                "--cycle-airports" => cycle_airports = true,
                "--test-displays" => test_displays = true,
                "--config" | "-c" | "--log" => match option_value(&args_vec, i) {
                    Some(value) => {
                        if arg_str == "--log" {
                            log_file = Some(value);
                        } else {
                            config_path = Some(value);
                        }
                        i += 1;
                    }
                    None => {
                        log_warning!("Missing value for {arg_str}");
                        unknown_arg_found = true;
                    }
                },
                _ => {
                    if arg_str.starts_with('-') {
                        log_warning!("Unknown option: {arg_str}");
                    } else {
                        log_warning!("Unexpected argument: {arg_str}");
                    }
                    unknown_arg_found = true;
                }
            }
            i += 1;
        }

        if cycle_airports && test_displays {
            log_error!("--cycle-airports and --test-displays cannot be combined");
            unknown_arg_found = true;
        }

        let mode = if cycle_airports {
            RunMode::CycleRoster
        } else if test_displays {
            RunMode::TestPattern
        } else {
            RunMode::Monitor
        };

        let action = if display_version {
            CliAction::ShowVersion
        } else if display_help {
            CliAction::ShowHelp
        } else if unknown_arg_found {
            CliAction::ShowHelpDueToError
        } else {
            CliAction::Run {
                debug_enabled,
                config_path,
                dry_run,
                mode,
                log_file,
            }
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Value following the flag at `idx`, unless it is missing or another flag.
fn option_value(args: &[String], idx: usize) -> Option<String> {
    args.get(idx + 1)
        .filter(|value| !value.starts_with('-'))
        .cloned()
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("metarmap [OPTIONS]");
    log_block_start!("Options:");
    log_indented!("-c, --config <file>    Use a custom configuration file");
    log_indented!("-n, --dry-run          Simulate LEDs and display in the log");
    log_indented!("    --cycle-airports   Light each airport in turn with its identifier");
    log_indented!("    --test-displays    Show both palettes and a status frame");
    log_indented!("    --log <file>       Mirror log output to a file");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_action(
        debug_enabled: bool,
        config_path: Option<&str>,
        dry_run: bool,
        mode: RunMode,
        log_file: Option<&str>,
    ) -> CliAction {
        CliAction::Run {
            debug_enabled,
            config_path: config_path.map(str::to_string),
            dry_run,
            mode,
            log_file: log_file.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_no_args() {
        let parsed = ParsedArgs::parse(vec!["metarmap"]);
        assert_eq!(
            parsed.action,
            run_action(false, None, false, RunMode::Monitor, None)
        );
    }

    #[test]
    fn test_parse_debug_flags() {
        for flag in ["--debug", "-d"] {
            let parsed = ParsedArgs::parse(vec!["metarmap", flag]);
            assert_eq!(
                parsed.action,
                run_action(true, None, false, RunMode::Monitor, None)
            );
        }
    }

    #[test]
    fn test_parse_help_flag() {
        assert_eq!(
            ParsedArgs::parse(vec!["metarmap", "--help"]).action,
            CliAction::ShowHelp
        );
        assert_eq!(
            ParsedArgs::parse(vec!["metarmap", "-h"]).action,
            CliAction::ShowHelp
        );
    }

    #[test]
    fn test_parse_version_flags() {
        for flag in ["--version", "-V", "-v"] {
            assert_eq!(
                ParsedArgs::parse(vec!["metarmap", flag]).action,
                CliAction::ShowVersion
            );
        }
    }

    #[test]
    fn test_version_takes_precedence() {
        let parsed = ParsedArgs::parse(vec!["metarmap", "--version", "--help", "--debug"]);
        assert_eq!(parsed.action, CliAction::ShowVersion);
    }

    #[test]
    fn test_help_takes_precedence_over_unknown() {
        let parsed = ParsedArgs::parse(vec!["metarmap", "--bogus", "--help"]);
        assert_eq!(parsed.action, CliAction::ShowHelp);
    }

    #[test]
    fn test_parse_unknown_flag() {
        let parsed = ParsedArgs::parse(vec!["metarmap", "--debug", "--unknown"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_stray_positional() {
        let parsed = ParsedArgs::parse(vec!["metarmap", "KSEA"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_config_path() {
        let parsed = ParsedArgs::parse(vec!["metarmap", "-c", "/etc/metarmap.toml"]);
        assert_eq!(
            parsed.action,
            run_action(
                false,
                Some("/etc/metarmap.toml"),
                false,
                RunMode::Monitor,
                None
            )
        );
    }

    #[test]
    fn test_parse_config_without_value() {
        assert_eq!(
            ParsedArgs::parse(vec!["metarmap", "--config"]).action,
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            ParsedArgs::parse(vec!["metarmap", "--config", "--debug"]).action,
            CliAction::ShowHelpDueToError
        );
    }

    #[test]
    fn test_parse_modes() {
        let parsed = ParsedArgs::parse(vec!["metarmap", "--cycle-airports", "-n"]);
        assert_eq!(
            parsed.action,
            run_action(false, None, true, RunMode::CycleRoster, None)
        );

        let parsed = ParsedArgs::parse(vec!["metarmap", "--test-displays"]);
        assert_eq!(
            parsed.action,
            run_action(false, None, false, RunMode::TestPattern, None)
        );
    }

    #[test]
    fn test_conflicting_modes_are_rejected() {
        let parsed = ParsedArgs::parse(vec!["metarmap", "--cycle-airports", "--test-displays"]);
        assert_eq!(parsed.action, CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_log_file() {
        let parsed = ParsedArgs::parse(vec![
            "metarmap",
            "--dry-run",
            "--log",
            "/tmp/metarmap.log",
            "-d",
        ]);
        assert_eq!(
            parsed.action,
            run_action(
                true,
                None,
                true,
                RunMode::Monitor,
                Some("/tmp/metarmap.log")
            )
        );
    }
}
