//! Configuration layer for wintun-ctl.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! # Boolean Flag Semantics
//!
//! `--no-driver-log` and `logging.driver = false` both disable forwarding of
//! driver log lines. Either one is enough; the CLI flag cannot re-enable
//! forwarding that the file turned off.
//!
//! Output format (`--json`) and verbosity (`--verbose`) are CLI-only.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod validated_tests;

pub use cli::{Cli, Command};
pub use error::{ConfigError, field};
pub use toml::{DriverSection, LoggingSection, TomlConfig, default_config_template};
pub use validated::{ValidatedConfig, write_default_config};
