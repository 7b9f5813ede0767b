//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Driver library section
    #[serde(default)]
    pub driver: DriverSection,

    /// Driver log forwarding section
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Driver library section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverSection {
    /// Path to the driver library; `~` expands to the home directory
    pub library: Option<String>,

    /// Tunnel type for new adapters
    pub tunnel_type: Option<String>,
}

/// Driver log forwarding section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Prefix prepended to every forwarded driver log line
    pub prefix: Option<String>,

    /// Forward driver log lines (default: true)
    pub driver: Option<bool>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# wintun-ctl Configuration File

[driver]
# Path to the driver library (default: wintun.dll from the application
# directory or System32). A leading ~ expands to the home directory.
# library = "C:\\Program Files\\MyVPN\\wintun.dll"

# Tunnel type for new adapters (default: Wintun)
tunnel_type = "Wintun"

[logging]
# Prefix prepended to every driver log line
# prefix = "[wintun] "

# Forward driver log lines to the application log (default: true)
# Note: --no-driver-log disables forwarding even if this is true
driver = true
"#
    .to_string()
}
