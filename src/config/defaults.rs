//! Default values for configuration options.

/// Default driver library, resolved through the DLL search path.
pub const LIBRARY: &str = crate::driver::WINTUN_DLL;

/// Default tunnel type for new adapters.
pub const TUNNEL_TYPE: &str = "Wintun";

/// Default prefix for forwarded driver log lines.
pub const LOG_PREFIX: &str = "";

/// Driver log lines are forwarded unless disabled.
pub const DRIVER_LOGGING: bool = true;

/// Default output path of `init`.
pub const CONFIG_FILE: &str = "wintun-ctl.toml";
