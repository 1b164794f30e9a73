//! Configuration management for mongorun
//!
//! This module handles loading, parsing, and persisting configuration:
//! - Tool settings: shell executable, probe timeout, logging
//! - The connection-profile store (`[[profile]]` tables)
//!
//! Everything lives in one TOML file, `~/.mongorun/config.toml` by
//! default, overridable with `--config`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::profile::ConnectionProfile;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Shell executable configuration
    #[serde(default)]
    pub shell: ShellConfig,

    /// Connectivity probe configuration
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Stored connection profiles
    #[serde(default, rename = "profile", skip_serializing_if = "Vec::is_empty")]
    pub profiles: Vec<ConnectionProfile>,
}

/// Which external shell binary runs scripts, and where to find it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Explicit path to the shell executable. When unset, `binary` is
    /// looked up on PATH at call time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Binary name used for PATH discovery
    #[serde(default = "default_shell_binary")]
    pub binary: String,
}

/// Connectivity probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Probe timeout in seconds; bounds server selection and the
    /// handshake round trip
    #[serde(default = "default_probe_timeout")]
    pub timeout: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_shell_binary() -> String {
    "mongo".to_string()
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            path: None,
            binary: default_shell_binary(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: default_probe_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration, falling back to defaults when no file exists.
    ///
    /// An explicitly named file that does not exist is an error; a missing
    /// default file just means first run.
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(explicit) => {
                if !explicit.exists() {
                    return Err(
                        ConfigError::FileNotFound(explicit.display().to_string()).into()
                    );
                }
                Self::read_toml(explicit)
            }
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::read_toml(&default)
                } else {
                    debug!(path = %default.display(), "no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    fn read_toml(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let rendered = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, rendered)?;
        debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".mongorun")
            .join("config.toml")
    }

    /// Validate the configuration
    ///
    /// Profile names must be unique and non-empty; field-level validation
    /// (port range, blank-vs-unset) already happened when the profile was
    /// parsed.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        for profile in &self.profiles {
            if profile.name.trim().is_empty() {
                return Err(ConfigError::InvalidFormat(
                    "profile with empty name".to_string(),
                )
                .into());
            }
            if !seen.insert(profile.name.as_str()) {
                return Err(ConfigError::DuplicateProfile(profile.name.clone()).into());
            }
            // A hand-edited file can say `port = 0`; unset is expressed by
            // leaving the key out, zero is never silently coerced.
            if profile.port == Some(0) {
                return Err(ConfigError::InvalidPort("0".to_string()).into());
            }
        }
        Ok(())
    }

    /// Get probe timeout as Duration
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe.timeout)
    }

    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&ConnectionProfile> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()).into())
    }

    /// Look up a profile by name, mutably.
    pub fn profile_mut(&mut self, name: &str) -> Result<&mut ConnectionProfile> {
        self.profiles
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()).into())
    }

    /// Add a profile, rejecting duplicate names.
    pub fn add_profile(&mut self, profile: ConnectionProfile) -> Result<()> {
        if self.profiles.iter().any(|p| p.name == profile.name) {
            return Err(ConfigError::DuplicateProfile(profile.name).into());
        }
        self.profiles.push(profile);
        Ok(())
    }

    /// Remove a profile by name.
    pub fn remove_profile(&mut self, name: &str) -> Result<ConnectionProfile> {
        let index = self
            .profiles
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))?;
        Ok(self.profiles.remove(index))
    }

    /// Resolve which profile a command should use.
    ///
    /// A named profile wins; otherwise the single profile marked
    /// `auto_connect` is the default. Zero or several autoconnect
    /// profiles with no name given is a configuration error, not a guess.
    pub fn select_profile(&self, name: Option<&str>) -> Result<&ConnectionProfile> {
        if let Some(name) = name {
            return self.profile(name);
        }

        let mut autoconnect = self.profiles.iter().filter(|p| p.auto_connect);
        match (autoconnect.next(), autoconnect.next()) {
            (Some(profile), None) => Ok(profile),
            _ => Err(ConfigError::NoDefaultProfile.into()),
        }
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MongorunError;
    use crate::profile::ProfileForm;

    fn profile(name: &str, auto_connect: bool) -> ConnectionProfile {
        let mut p = ConnectionProfile::new(name);
        p.host = Some("localhost".to_string());
        p.auto_connect = auto_connect;
        p
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.shell.binary, "mongo");
        assert!(config.shell.path.is_none());
        assert_eq!(config.probe.timeout, 10);
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn test_probe_timeout() {
        let config = Config::default();
        assert_eq!(config.probe_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        let mut p = ProfileForm {
            name: "prod".to_string(),
            host: "db.example.com".to_string(),
            port: "27018".to_string(),
            databases: "orders,users".to_string(),
            ..ProfileForm::default()
        }
        .apply()
        .unwrap();
        p.server_version = Some("7.0.5".to_string());
        config.add_profile(p.clone()).unwrap();

        let rendered = toml::to_string_pretty(&config).unwrap();
        let reloaded: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(reloaded.profiles, vec![p]);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.add_profile(profile("local", true)).unwrap();
        config.save(&path).unwrap();

        let reloaded = Config::load_from_file(Some(&path)).unwrap();
        assert_eq!(reloaded.profiles.len(), 1);
        assert_eq!(reloaded.profiles[0].name, "local");
        assert!(reloaded.profiles[0].auto_connect);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let err = Config::load_from_file(Some(Path::new("/nonexistent/mongorun.toml")))
            .unwrap_err();
        assert!(matches!(
            err,
            MongorunError::Config(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_profile_rejected() {
        let mut config = Config::default();
        config.add_profile(profile("a", false)).unwrap();
        let err = config.add_profile(profile("a", false)).unwrap_err();
        assert!(matches!(
            err,
            MongorunError::Config(ConfigError::DuplicateProfile(_))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicates_from_file() {
        let config = Config {
            profiles: vec![profile("a", false), profile("a", false)],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_port_from_file() {
        let config: Config = toml::from_str(
            "[[profile]]\nname = \"a\"\nhost = \"localhost\"\nport = 0\n",
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            MongorunError::Config(ConfigError::InvalidPort(_))
        ));
    }

    #[test]
    fn test_select_profile_by_name() {
        let mut config = Config::default();
        config.add_profile(profile("a", false)).unwrap();
        assert_eq!(config.select_profile(Some("a")).unwrap().name, "a");
        assert!(config.select_profile(Some("missing")).is_err());
    }

    #[test]
    fn test_select_profile_autoconnect_fallback() {
        let mut config = Config::default();
        config.add_profile(profile("a", false)).unwrap();
        config.add_profile(profile("b", true)).unwrap();
        assert_eq!(config.select_profile(None).unwrap().name, "b");
    }

    #[test]
    fn test_select_profile_ambiguous_autoconnect() {
        let mut config = Config::default();
        config.add_profile(profile("a", true)).unwrap();
        config.add_profile(profile("b", true)).unwrap();
        assert!(config.select_profile(None).is_err());

        let empty = Config::default();
        assert!(empty.select_profile(None).is_err());
    }

    #[test]
    fn test_remove_profile() {
        let mut config = Config::default();
        config.add_profile(profile("a", false)).unwrap();
        let removed = config.remove_profile("a").unwrap();
        assert_eq!(removed.name, "a");
        assert!(config.remove_profile("a").is_err());
    }
}
