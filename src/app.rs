//! Application startup and utilities.
//!
//! This module contains exit codes, tracing setup, driver log wiring, and
//! error hints that support the main entry point.

use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::EnvFilter;
use wintun_ctl::config::{ConfigError, ValidatedConfig};
use wintun_ctl::logger::{self, DiscardSink, TracingSink};

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Success (exit code 0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Configuration error (exit code 1) - invalid args, unreadable config file, etc.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Runtime error (exit code 2) - library missing, driver refused the request, etc.
    ///
    /// Note: This is a function rather than a constant because `ExitCode::from()` is not `const fn`.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Prints helpful hints for common configuration errors.
pub fn print_config_hint(error: &ConfigError) {
    match error {
        ConfigError::FileRead { .. } => {
            eprintln!("\nRun 'wintun-ctl init' to generate a configuration template.");
        }
        ConfigError::NoHomeDir { .. } => {
            eprintln!("\nUse an absolute path for the driver library.");
        }
        _ => {}
    }
}

/// Sets up the tracing subscriber for logging.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Routes driver log lines according to the configuration.
///
/// Must run before the first driver call, since the callback is
/// registered when the library loads.
pub fn configure_driver_log(config: &ValidatedConfig) {
    logger::set_prefix(config.log_prefix.as_str());
    if config.driver_logging {
        logger::set_sink(Arc::new(TracingSink));
    } else {
        logger::set_sink(Arc::new(DiscardSink));
    }
}
