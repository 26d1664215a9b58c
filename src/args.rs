//! Command-line argument parsing and processing.
//!
//! This module handles parsing of command-line arguments and provides a
//! clean interface for the main application logic. It supports the standard
//! help, version, and debug flags while gracefully handling unknown options.

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the daemon with these settings
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
        startup_delay: Option<u64>,
    },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit with failure
    ShowHelpDueToError,
}

/// Container for parsed command-line arguments.
#[derive(Debug, PartialEq)]
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments (the first entry is the program name).
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut config_dir: Option<String> = None;
        let mut startup_delay: Option<u64> = None;

        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut idx = 0;
        while idx < args_vec.len() {
            match args_vec[idx].as_str() {
                "--help" | "-h" => {
                    return ParsedArgs {
                        action: CliAction::ShowHelp,
                    };
                }
                "--version" | "-V" => {
                    return ParsedArgs {
                        action: CliAction::ShowVersion,
                    };
                }
                "--debug" | "-d" => debug_enabled = true,
                "--config" | "-c" => {
                    idx += 1;
                    match args_vec.get(idx) {
                        Some(dir) => config_dir = Some(dir.clone()),
                        None => {
                            return ParsedArgs {
                                action: CliAction::ShowHelpDueToError,
                            };
                        }
                    }
                }
                "--delay" | "-i" => {
                    idx += 1;
                    match args_vec.get(idx).and_then(|v| v.parse::<u64>().ok()) {
                        Some(seconds) => startup_delay = Some(seconds),
                        None => {
                            return ParsedArgs {
                                action: CliAction::ShowHelpDueToError,
                            };
                        }
                    }
                }
                _ => {
                    return ParsedArgs {
                        action: CliAction::ShowHelpDueToError,
                    };
                }
            }
            idx += 1;
        }

        ParsedArgs {
            action: CliAction::Run {
                debug_enabled,
                config_dir,
                startup_delay,
            },
        }
    }
}

/// Print usage information.
pub fn display_help() {
    log_version!();
    log_block_start!("Usage: ambientr [OPTIONS]");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-c, --config <DIR>     Use an alternate configuration directory");
    log_indented!("-i, --delay <SECONDS>  Override the startup delay");
    log_indented!("-h, --help             Display this help message");
    log_indented!("-V, --version          Display version information");
    log_block_start!("Signals");
    log_indented!("SIGUSR1                Re-enable automatic brightness");
    log_indented!("SIGUSR2                Cycle through manual brightness presets");
    log_indented!("SIGTERM/SIGINT         Graceful shutdown");
    log_end!();
}

/// Print version information.
pub fn display_version() {
    log_version!();
    log_decorated!("Adaptive display brightness and color temperature daemon");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliAction {
        ParsedArgs::parse(args.iter().copied()).action
    }

    #[test]
    fn no_arguments_runs_with_defaults() {
        assert_eq!(
            parse(&["ambientr"]),
            CliAction::Run {
                debug_enabled: false,
                config_dir: None,
                startup_delay: None,
            }
        );
    }

    #[test]
    fn debug_flag_is_recognized() {
        assert_eq!(
            parse(&["ambientr", "--debug"]),
            CliAction::Run {
                debug_enabled: true,
                config_dir: None,
                startup_delay: None,
            }
        );
        assert_eq!(
            parse(&["ambientr", "-d"]),
            CliAction::Run {
                debug_enabled: true,
                config_dir: None,
                startup_delay: None,
            }
        );
    }

    #[test]
    fn config_dir_takes_a_value() {
        assert_eq!(
            parse(&["ambientr", "--config", "/tmp/test"]),
            CliAction::Run {
                debug_enabled: false,
                config_dir: Some("/tmp/test".to_string()),
                startup_delay: None,
            }
        );
    }

    #[test]
    fn missing_config_value_shows_help() {
        assert_eq!(parse(&["ambientr", "--config"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn delay_parses_seconds() {
        assert_eq!(
            parse(&["ambientr", "-i", "30", "-d"]),
            CliAction::Run {
                debug_enabled: true,
                config_dir: None,
                startup_delay: Some(30),
            }
        );
    }

    #[test]
    fn non_numeric_delay_shows_help() {
        assert_eq!(parse(&["ambientr", "--delay", "soon"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn help_and_version_short_circuit() {
        assert_eq!(parse(&["ambientr", "--help"]), CliAction::ShowHelp);
        assert_eq!(parse(&["ambientr", "-V", "--debug"]), CliAction::ShowVersion);
    }

    #[test]
    fn unknown_flag_shows_help() {
        assert_eq!(parse(&["ambientr", "--frobnicate"]), CliAction::ShowHelpDueToError);
    }
}
