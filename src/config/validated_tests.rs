//! Tests for validated configuration.

use std::io::Write;

use tempfile::{NamedTempFile, tempdir};

use super::ConfigError;
use super::cli::Cli;
use super::toml::TomlConfig;
use super::validated::{ValidatedConfig, write_default_config};

/// Helper to create CLI args from a slice
fn cli(args: &[&str]) -> Cli {
    let mut full_args = vec!["wintun-ctl"];
    full_args.extend(args);
    full_args.push("version");
    Cli::parse_from_iter(full_args)
}

/// Helper to parse TOML config
fn toml(content: &str) -> TomlConfig {
    TomlConfig::parse(content).unwrap()
}

mod defaults {
    use super::*;

    #[test]
    fn no_sources_uses_defaults() {
        let config = ValidatedConfig::from_raw(&cli(&[]), None).unwrap();

        assert_eq!(config.library, "wintun.dll");
        assert_eq!(config.tunnel_type, "Wintun");
        assert_eq!(config.log_prefix, "");
        assert!(config.driver_logging);
        assert!(!config.json);
        assert!(!config.verbose);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml(""))).unwrap();

        assert_eq!(config, ValidatedConfig::from_raw(&cli(&[]), None).unwrap());
    }
}

mod precedence {
    use super::*;

    const FILE: &str = r#"
        [driver]
        library = "toml.dll"
        tunnel_type = "FromToml"

        [logging]
        prefix = "toml: "
    "#;

    #[test]
    fn toml_overrides_defaults() {
        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml(FILE))).unwrap();

        assert_eq!(config.library, "toml.dll");
        assert_eq!(config.tunnel_type, "FromToml");
        assert_eq!(config.log_prefix, "toml: ");
    }

    #[test]
    fn cli_overrides_toml() {
        let cli = cli(&["--library", "cli.dll", "--log-prefix", "cli: "]);

        let config = ValidatedConfig::from_raw(&cli, Some(&toml(FILE))).unwrap();

        assert_eq!(config.library, "cli.dll");
        assert_eq!(config.log_prefix, "cli: ");
    }

    #[test]
    fn explicit_tunnel_type_wins_over_config() {
        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml(FILE))).unwrap();

        assert_eq!(config.tunnel_type_or(Some("Explicit")), "Explicit");
        assert_eq!(config.tunnel_type_or(None), "FromToml");
    }

    #[test]
    fn cli_only_flags() {
        let config = ValidatedConfig::from_raw(&cli(&["--json", "--verbose"]), None).unwrap();

        assert!(config.json);
        assert!(config.verbose);
    }
}

mod driver_logging {
    use super::*;

    #[test]
    fn cli_flag_disables() {
        let config = ValidatedConfig::from_raw(&cli(&["--no-driver-log"]), None).unwrap();
        assert!(!config.driver_logging);
    }

    #[test]
    fn toml_disables() {
        let file = toml("[logging]\ndriver = false\n");

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&file)).unwrap();

        assert!(!config.driver_logging);
    }

    #[test]
    fn cli_flag_wins_over_toml_true() {
        let file = toml("[logging]\ndriver = true\n");

        let config = ValidatedConfig::from_raw(&cli(&["--no-driver-log"]), Some(&file)).unwrap();

        assert!(!config.driver_logging);
    }
}

mod validation {
    use super::*;

    #[test]
    fn empty_library_is_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--library", " "]), None);

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: "driver.library",
                ..
            })
        ));
    }

    #[test]
    fn empty_tunnel_type_is_rejected() {
        let file = toml("[driver]\ntunnel_type = \"\"\n");

        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&file));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: "driver.tunnel_type",
                ..
            })
        ));
    }

    #[test]
    fn display_summarises_config() {
        let config = ValidatedConfig::from_raw(&cli(&["--json"]), None).unwrap();

        let text = config.to_string();

        assert!(text.contains("library: wintun.dll"));
        assert!(text.contains("tunnel_type: Wintun"));
        assert!(text.contains("output: json"));
    }
}

mod loading {
    use super::*;

    #[test]
    fn load_reads_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[driver]\nlibrary = \"from-file.dll\"").unwrap();
        let path = file.path().to_str().unwrap();

        let cli = Cli::parse_from_iter(["wintun-ctl", "--config", path, "version"]);
        let config = ValidatedConfig::load(&cli).unwrap();

        assert_eq!(config.library, "from-file.dll");
    }

    #[test]
    fn load_without_config_file() {
        let config = ValidatedConfig::load(&cli(&[])).unwrap();
        assert_eq!(config.library, "wintun.dll");
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let cli = Cli::parse_from_iter(["wintun-ctl", "-c", path.to_str().unwrap(), "version"]);
        let result = ValidatedConfig::load(&cli);

        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }

    #[test]
    fn load_invalid_file_fails() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[driver]\nunknown = 1").unwrap();

        let cli = Cli::parse_from_iter([
            "wintun-ctl",
            "-c",
            file.path().to_str().unwrap(),
            "version",
        ]);

        assert!(matches!(
            ValidatedConfig::load(&cli),
            Err(ConfigError::TomlParse(_))
        ));
    }
}

mod init {
    use super::*;

    #[test]
    fn written_template_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wintun-ctl.toml");

        write_default_config(&path).unwrap();
        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&TomlConfig::load(&path).unwrap()))
            .unwrap();

        assert_eq!(config.tunnel_type, "Wintun");
        assert!(config.driver_logging);
    }

    #[test]
    fn write_to_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("config.toml");

        let result = write_default_config(&path);

        assert!(matches!(result, Err(ConfigError::FileWrite { .. })));
    }
}
