//! Binary entry point: argument dispatch and exit codes.
//!
//! Parses command-line arguments, configures the process, and hands off to
//! the `Ambientr` coordinator. Exit code is 0 on graceful shutdown and
//! non-zero on unrecoverable startup failure.

use ambientr::args::{CliAction, ParsedArgs, display_help, display_version};
use ambientr::constants::EXIT_FAILURE;
use ambientr::{Ambientr, config, log_error_exit};

fn main() {
    let parsed = ParsedArgs::parse(std::env::args());

    match parsed.action {
        CliAction::ShowHelp => display_help(),
        CliAction::ShowVersion => display_version(),
        CliAction::ShowHelpDueToError => {
            display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Run {
            debug_enabled,
            config_dir,
            startup_delay,
        } => {
            if let Err(e) = config::set_config_dir(config_dir) {
                log_error_exit!("{e}");
                std::process::exit(EXIT_FAILURE);
            }

            let mut runner = Ambientr::new(debug_enabled);
            if let Some(seconds) = startup_delay {
                runner = runner.with_startup_delay(seconds);
            }

            if let Err(e) = runner.run() {
                log_error_exit!("ambientr failed");
                eprintln!("{e:?}");
                std::process::exit(EXIT_FAILURE);
            }
        }
    }
}
