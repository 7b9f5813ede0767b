//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration operations.
///
/// Covers errors from parsing, validation, and file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A value was present but unusable.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Name of the field
        field: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// `~` could not be expanded because the home directory is unknown.
    #[error("Cannot expand '~' in {field}: home directory not found")]
    NoHomeDir {
        /// Name of the field
        field: &'static str,
    },
}

/// Well-known field names for `InvalidValue` errors.
pub mod field {
    /// The driver library path.
    pub const LIBRARY: &str = "driver.library";
    /// The tunnel type of new adapters.
    pub const TUNNEL_TYPE: &str = "driver.tunnel_type";
}

impl ConfigError {
    /// Creates an `InvalidValue` error.
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}
