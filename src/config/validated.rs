//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{MAIN_SEPARATOR, Path};

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    /// Driver library path, `~` already expanded
    pub library: String,

    /// Tunnel type for new adapters
    pub tunnel_type: String,

    /// Prefix prepended to forwarded driver log lines
    pub log_prefix: String,

    /// Whether driver log lines are forwarded
    pub driver_logging: bool,

    /// Print results as JSON
    pub json: bool,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ library: {}, tunnel_type: {}, log_prefix: {:?}, driver_logging: {}, \
             output: {} }}",
            self.library,
            self.tunnel_type,
            self.log_prefix,
            self.driver_logging,
            if self.json { "json" } else { "text" },
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The library path or tunnel type is empty
    /// - The library path starts with `~` and no home directory is known
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let library = Self::resolve_library(cli, toml)?;
        let tunnel_type = Self::resolve_tunnel_type(toml)?;

        let log_prefix = cli
            .log_prefix
            .clone()
            .or_else(|| toml.and_then(|t| t.logging.prefix.clone()))
            .unwrap_or_else(|| defaults::LOG_PREFIX.to_string());

        // Either source can disable forwarding
        let driver_logging = !cli.no_driver_log
            && toml
                .and_then(|t| t.logging.driver)
                .unwrap_or(defaults::DRIVER_LOGGING);

        Ok(Self {
            library,
            tunnel_type,
            log_prefix,
            driver_logging,
            json: cli.json,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    /// Returns the tunnel type for `create`, preferring the subcommand's
    /// `--tunnel-type` over the configured one.
    #[must_use]
    pub fn tunnel_type_or<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit.unwrap_or(&self.tunnel_type)
    }

    fn resolve_library(cli: &Cli, toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let library = cli
            .library
            .as_deref()
            .or_else(|| toml.and_then(|t| t.driver.library.as_deref()))
            .unwrap_or(defaults::LIBRARY);

        if library.trim().is_empty() {
            return Err(ConfigError::invalid(field::LIBRARY, "must not be empty"));
        }

        expand_home(library, field::LIBRARY)
    }

    fn resolve_tunnel_type(toml: Option<&TomlConfig>) -> Result<String, ConfigError> {
        let tunnel_type = toml
            .and_then(|t| t.driver.tunnel_type.as_deref())
            .unwrap_or(defaults::TUNNEL_TYPE);

        if tunnel_type.is_empty() {
            return Err(ConfigError::invalid(field::TUNNEL_TYPE, "must not be empty"));
        }

        Ok(tunnel_type.to_string())
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

/// Expands a leading `~` (alone or followed by a separator).
fn expand_home(path: &str, field: &'static str) -> Result<String, ConfigError> {
    let Some(rest) = path.strip_prefix('~') else {
        return Ok(path.to_string());
    };

    let rest = if rest.is_empty() {
        rest
    } else if let Some(stripped) = rest.strip_prefix(['/', '\\']) {
        stripped
    } else {
        // `~user` style paths are left alone
        return Ok(path.to_string());
    };

    let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir { field })?;
    if rest.is_empty() {
        return Ok(home.display().to_string());
    }

    Ok(format!("{}{MAIN_SEPARATOR}{rest}", home.display()))
}
