//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand};

use crate::guid::Guid;

use super::defaults;

/// wintun-ctl: Wintun adapter control
///
/// Creates, opens and inspects Wintun virtual network adapters and
/// manages the driver installation.
#[derive(Debug, Parser)]
#[command(name = "wintun-ctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the driver library (default: wintun.dll)
    #[arg(long, global = true)]
    pub library: Option<String>,

    /// Prefix prepended to every forwarded driver log line
    #[arg(long = "log-prefix", global = true)]
    pub log_prefix: Option<String>,

    /// Do not forward driver log lines
    #[arg(long = "no-driver-log", global = true)]
    pub no_driver_log: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for wintun-ctl
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an adapter and hold it open until Enter is pressed
    Create {
        /// Adapter name
        #[arg(long)]
        name: String,

        /// Tunnel type (default: Wintun)
        #[arg(long = "tunnel-type", value_parser = NonEmptyStringValueParser::new())]
        tunnel_type: Option<String>,

        /// Requested adapter GUID, e.g. {CD902A80-9517-5BE6-BB11-D47C983FA66E}
        #[arg(long, conflicts_with = "guid_from_name")]
        guid: Option<Guid>,

        /// Derive the adapter GUID from its name
        #[arg(long = "guid-from-name")]
        guid_from_name: bool,
    },

    /// Open an existing adapter and print its identifiers
    Open {
        /// Adapter name
        #[arg(long)]
        name: String,
    },

    /// Print the LUID of an existing adapter
    Luid {
        /// Adapter name
        #[arg(long)]
        name: String,
    },

    /// Print the version of the running driver
    Version,

    /// Remove the driver from the system
    Uninstall,

    /// Print the GUID derived from a name
    Guid {
        /// Name to derive the GUID from
        name: String,
    },

    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = defaults::CONFIG_FILE)]
        output: PathBuf,
    },
}

impl Command {
    /// Returns true if the command talks to the driver.
    #[must_use]
    pub const fn needs_driver(&self) -> bool {
        !matches!(self, Self::Guid { .. } | Self::Init { .. })
    }
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Parses CLI arguments from an iterator, returning clap's error instead
    /// of exiting.
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid or conflicting arguments.
    pub fn try_parse_from_iter<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(iter)
    }
}
