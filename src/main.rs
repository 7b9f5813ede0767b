//! wintun-ctl: Wintun adapter control
//!
//! Entry point for the wintun-ctl application.

use std::io;
use std::process::ExitCode;

use wintun_ctl::adapter::Wintun;
use wintun_ctl::config::{Cli, Command, ValidatedConfig, write_default_config};

mod app;
mod run;

use app::{configure_driver_log, exit_code, print_config_hint, setup_tracing};

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Handle init subcommand
    if let Command::Init { output } = &cli.command {
        return handle_init(output);
    }

    // Load and validate configuration
    let config = match ValidatedConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    // Setup logging and run
    setup_tracing(config.verbose);
    tracing::debug!("{config}");
    if cli.command.needs_driver() {
        configure_driver_log(&config);
    }

    run_command(&config, &cli.command)
}

/// Handles the `init` subcommand.
fn handle_init(output: &std::path::Path) -> ExitCode {
    match write_default_config(output) {
        Ok(()) => {
            println!("Configuration template written to: {}", output.display());
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::CONFIG_ERROR
        }
    }
}

/// Runs a command against the configured driver library.
///
/// Excluded from coverage - requires the driver.
#[cfg(not(tarpaulin_include))]
fn run_command(config: &ValidatedConfig, command: &Command) -> ExitCode {
    let wintun = Wintun::with_library(&config.library);
    let mut out = io::stdout().lock();
    let mut input = io::stdin().lock();

    match run::execute(config, command, &wintun, &mut out, &mut input) {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            exit_code::runtime_error()
        }
    }
}
