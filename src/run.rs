//! Command execution.
//!
//! This module runs one subcommand against a [`Wintun`] and renders the
//! result as text or JSON.

use std::fmt;
use std::io::{self, BufRead, Write};

use serde::Serialize;
use thiserror::Error;

use wintun_ctl::adapter::{Adapter, AdapterError, Luid, Wintun};
use wintun_ctl::config::{Command, ValidatedConfig};
use wintun_ctl::driver::DriverVersion;
use wintun_ctl::guid::Guid;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for command execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// A driver operation failed.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// Writing output or reading the confirmation failed.
    #[error("I/O error on console: {0}")]
    Console(#[from] io::Error),

    /// Encoding JSON output failed.
    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result of a command, printed once per command.
#[derive(Debug, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
enum Report {
    Create {
        name: String,
        tunnel_type: String,
        guid: Option<String>,
        #[serde(flatten)]
        luid: LuidReport,
    },
    Open {
        name: String,
        #[serde(flatten)]
        luid: LuidReport,
    },
    Luid {
        name: String,
        #[serde(flatten)]
        luid: LuidReport,
    },
    Version {
        version: String,
        major: u16,
        minor: u16,
    },
    Uninstall,
    Guid {
        name: String,
        guid: String,
    },
}

/// Adapter identifiers; interface index and alias only on Windows.
#[derive(Debug, Serialize)]
struct LuidReport {
    luid: String,
    luid_value: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    interface_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alias: Option<String>,
}

impl LuidReport {
    fn of(adapter: &Adapter) -> Self {
        let luid = adapter.luid();
        let (interface_index, alias) = interface_details(luid);
        Self {
            luid: luid.to_string(),
            luid_value: luid.value(),
            interface_index,
            alias,
        }
    }
}

impl fmt::Display for LuidReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LUID {}", self.luid)?;
        if let Some(index) = self.interface_index {
            write!(f, ", interface index {index}")?;
        }
        if let Some(ref alias) = self.alias {
            write!(f, ", alias '{alias}'")?;
        }
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create {
                name,
                tunnel_type,
                guid,
                luid,
            } => {
                write!(f, "Created adapter '{name}' ({tunnel_type}")?;
                if let Some(guid) = guid {
                    write!(f, ", GUID {guid}")?;
                }
                write!(f, "): {luid}")
            }
            Self::Open { name, luid } => write!(f, "Adapter '{name}': {luid}"),
            Self::Luid { luid, .. } => f.write_str(&luid.luid),
            Self::Version { version, .. } => write!(f, "Wintun driver {version}"),
            Self::Uninstall => f.write_str("Driver uninstalled"),
            Self::Guid { guid, .. } => f.write_str(guid),
        }
    }
}

#[cfg(windows)]
fn interface_details(luid: Luid) -> (Option<u32>, Option<String>) {
    if luid.is_zero() {
        return (None, None);
    }
    (luid.interface_index().ok(), luid.alias().ok())
}

#[cfg(not(windows))]
const fn interface_details(_luid: Luid) -> (Option<u32>, Option<String>) {
    (None, None)
}

/// Executes `command`, writing its report to `out`.
///
/// `create` keeps the adapter until a line (or end of input) is read from
/// `input`, then closes it.
///
/// # Errors
///
/// Returns an error if the driver operation fails or the console is
/// unusable.
pub fn execute(
    config: &ValidatedConfig,
    command: &Command,
    wintun: &Wintun,
    out: &mut dyn Write,
    input: &mut dyn BufRead,
) -> Result<(), RunError> {
    match command {
        Command::Create {
            name,
            tunnel_type,
            guid,
            guid_from_name,
        } => {
            let requested = guid.or_else(|| guid_from_name.then(|| Guid::from_name(name)));
            let tunnel_type = config.tunnel_type_or(tunnel_type.as_deref());

            let adapter = wintun.create_adapter(name, tunnel_type, requested.as_ref())?;
            let report = Report::Create {
                name: name.clone(),
                tunnel_type: tunnel_type.to_string(),
                guid: requested.map(|g| g.to_string()),
                luid: LuidReport::of(&adapter),
            };
            emit(&report, config.json, out)?;

            hold_until_enter(&adapter, config.json, out, input)?;
            adapter.close()?;
            tracing::info!(name = %name, "Adapter closed");
            Ok(())
        }
        Command::Open { name } => {
            let adapter = wintun.open_adapter(name)?;
            let report = Report::Open {
                name: name.clone(),
                luid: LuidReport::of(&adapter),
            };
            adapter.close()?;
            emit(&report, config.json, out)
        }
        Command::Luid { name } => {
            let adapter = wintun.open_adapter(name)?;
            let report = Report::Luid {
                name: name.clone(),
                luid: LuidReport::of(&adapter),
            };
            adapter.close()?;
            emit(&report, config.json, out)
        }
        Command::Version => {
            let version = wintun.running_version()?;
            emit(&version_report(version), config.json, out)
        }
        Command::Uninstall => {
            wintun.uninstall()?;
            emit(&Report::Uninstall, config.json, out)
        }
        Command::Guid { name } => {
            let report = Report::Guid {
                name: name.clone(),
                guid: Guid::from_name(name).to_string(),
            };
            emit(&report, config.json, out)
        }
        // Handled before configuration is loaded
        Command::Init { .. } => Ok(()),
    }
}

fn version_report(version: DriverVersion) -> Report {
    Report::Version {
        version: version.to_string(),
        major: version.major(),
        minor: version.minor(),
    }
}

fn hold_until_enter(
    adapter: &Adapter,
    json: bool,
    out: &mut dyn Write,
    input: &mut dyn BufRead,
) -> Result<(), RunError> {
    // The prompt would break the single JSON object on stdout
    if json {
        tracing::info!("Press Enter to close adapter '{}'", adapter.name());
    } else {
        writeln!(out, "Press Enter to close the adapter...")?;
        out.flush()?;
    }

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}

fn emit(report: &Report, json: bool, out: &mut dyn Write) -> Result<(), RunError> {
    if json {
        serde_json::to_writer(&mut *out, report)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{report}")?;
    }
    Ok(())
}
