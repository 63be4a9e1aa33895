//! Configuration for the TcBuild job driver
//!
//! Values come from environment variables with defaults matching the Jenkins
//! build agents.
//!
//! # Environment Variables
//!
//! - `TCCI_BUILD_TOOL`: build executable - default: "TcBuild"
//! - `TCCI_BUILD_TIMEOUT_MINUTES`: timeout handed to the build tool - default: "5"
//! - `TCCI_INSTALL_ROOT`: managed library install root - default:
//!   `C:\TwinCAT\3.1\Components\Plc\Managed Libraries`
//! - `TCCI_SHARE_SCRIPT`: script that publishes freshly built libraries -
//!   default: `share_twincat_libs.bat` next to the running executable
//! - `TCCI_TARGET_ADDRESS`: AMS net id of the test PLC - default: "172.21.148.95.1.1"
//! - `TCCI_TARGET_LABEL`: runtime label of the test PLC - default: "'TwinCAT RT (x64)'"

use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_BUILD_TOOL: &str = "TcBuild";
pub const DEFAULT_TIMEOUT_MINUTES: u32 = 5;
pub const DEFAULT_INSTALL_ROOT: &str = r"C:\TwinCAT\3.1\Components\Plc\Managed Libraries";
pub const DEFAULT_SHARE_SCRIPT: &str = "share_twincat_libs.bat";
pub const DEFAULT_TARGET_ADDRESS: &str = "172.21.148.95.1.1";
pub const DEFAULT_TARGET_LABEL: &str = "'TwinCAT RT (x64)'";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    pub build_tool: String,
    pub timeout_minutes: u32,
    pub install_root: PathBuf,
    pub share_script: PathBuf,
    pub target_address: String,
    pub target_label: String,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            build_tool: DEFAULT_BUILD_TOOL.to_string(),
            timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
            install_root: PathBuf::from(DEFAULT_INSTALL_ROOT),
            share_script: default_share_script(),
            target_address: DEFAULT_TARGET_ADDRESS.to_string(),
            target_label: DEFAULT_TARGET_LABEL.to_string(),
        }
    }
}

impl JobConfig {
    /// Builds the configuration from `TCCI_*` variables, falling back to the
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let timeout_minutes = match env::var("TCCI_BUILD_TIMEOUT_MINUTES") {
            Ok(value) => value
                .trim()
                .parse::<u32>()
                .map_err(|e| ConfigError::ParseError {
                    field: "TCCI_BUILD_TIMEOUT_MINUTES".to_string(),
                    error: e.to_string(),
                })?,
            Err(_) => defaults.timeout_minutes,
        };

        let config = Self {
            build_tool: env::var("TCCI_BUILD_TOOL").unwrap_or(defaults.build_tool),
            timeout_minutes,
            install_root: env::var("TCCI_INSTALL_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.install_root),
            share_script: env::var("TCCI_SHARE_SCRIPT")
                .map(PathBuf::from)
                .unwrap_or(defaults.share_script),
            target_address: env::var("TCCI_TARGET_ADDRESS").unwrap_or(defaults.target_address),
            target_label: env::var("TCCI_TARGET_LABEL").unwrap_or(defaults.target_label),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.build_tool.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "build tool must not be empty".to_string(),
            ));
        }

        if self.timeout_minutes == 0 {
            return Err(ConfigError::ValidationFailed(
                "build timeout must be at least one minute".to_string(),
            ));
        }

        if self.target_address.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "target address must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_share_script() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_SHARE_SCRIPT)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SHARE_SCRIPT))
}

impl fmt::Display for JobConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tcci Configuration:")?;
        writeln!(f, "  Build tool: {}", self.build_tool)?;
        writeln!(f, "  Timeout: {} min", self.timeout_minutes)?;
        writeln!(f, "  Install root: {}", self.install_root.display())?;
        writeln!(f, "  Share script: {}", self.share_script.display())?;
        write!(
            f,
            "  Test target: {} {}",
            self.target_address, self.target_label
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_VARS: [&str; 6] = [
        "TCCI_BUILD_TOOL",
        "TCCI_BUILD_TIMEOUT_MINUTES",
        "TCCI_INSTALL_ROOT",
        "TCCI_SHARE_SCRIPT",
        "TCCI_TARGET_ADDRESS",
        "TCCI_TARGET_LABEL",
    ];

    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    fn clear_env() -> Vec<EnvGuard> {
        ALL_VARS.iter().map(|key| EnvGuard::unset(key)).collect()
    }

    #[test]
    #[serial]
    fn test_defaults_from_empty_env() {
        let _guards = clear_env();

        let config = JobConfig::from_env().unwrap();
        assert_eq!(config.build_tool, DEFAULT_BUILD_TOOL);
        assert_eq!(config.timeout_minutes, DEFAULT_TIMEOUT_MINUTES);
        assert_eq!(config.install_root, PathBuf::from(DEFAULT_INSTALL_ROOT));
        assert!(config.share_script.ends_with(DEFAULT_SHARE_SCRIPT));
        assert_eq!(config.target_address, DEFAULT_TARGET_ADDRESS);
        assert_eq!(config.target_label, DEFAULT_TARGET_LABEL);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        let _guards = clear_env();
        let _tool = EnvGuard::set("TCCI_BUILD_TOOL", "/opt/tc/TcBuild.exe");
        let _timeout = EnvGuard::set("TCCI_BUILD_TIMEOUT_MINUTES", "12");
        let _root = EnvGuard::set("TCCI_INSTALL_ROOT", "/srv/libs");

        let config = JobConfig::from_env().unwrap();
        assert_eq!(config.build_tool, "/opt/tc/TcBuild.exe");
        assert_eq!(config.timeout_minutes, 12);
        assert_eq!(config.install_root, PathBuf::from("/srv/libs"));
    }

    #[test]
    #[serial]
    fn test_invalid_timeout_is_parse_error() {
        let _guards = clear_env();
        let _timeout = EnvGuard::set("TCCI_BUILD_TIMEOUT_MINUTES", "five");

        let err = JobConfig::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ParseError { ref field, .. } if field == "TCCI_BUILD_TIMEOUT_MINUTES"
        ));
    }

    #[test]
    #[serial]
    fn test_zero_timeout_fails_validation() {
        let _guards = clear_env();
        let _timeout = EnvGuard::set("TCCI_BUILD_TIMEOUT_MINUTES", "0");

        let err = JobConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed(_)));
    }

    #[test]
    fn test_validate_rejects_empty_tool() {
        let config = JobConfig {
            build_tool: "  ".to_string(),
            ..JobConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_display() {
        let display = format!("{}", JobConfig::default());
        assert!(display.contains("tcci Configuration:"));
        assert!(display.contains("Build tool: TcBuild"));
        assert!(display.contains("Timeout: 5 min"));
    }
}
