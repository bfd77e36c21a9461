//! Configuration management
//!
//! Configuration is loaded from these sources, highest precedence first:
//! 1. Environment variables (`MONGO_CURSOR_*`)
//! 2. Configuration file (TOML format)
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ConfigError, Result};

/// Prefix of the environment variables read by [`Config::from_env`]
pub const ENV_PREFIX: &str = "MONGO_CURSOR_";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Cursor configuration
    #[serde(default)]
    pub cursor: CursorConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Cursor-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorConfig {
    /// `batchSize` sent with `getMore` (0 lets the server choose)
    #[serde(default = "default_batch_size")]
    pub batch_size: i32,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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
fn default_batch_size() -> i32 {
    0
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
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

    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from all sources with proper precedence
    ///
    /// A missing file at [`Config::default_path`] is not an error.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path(), std::env::vars_os())
    }

    /// Load `path` (when it exists), then apply `vars` on top of it.
    ///
    /// The result is validated once, after the overrides, so an environment
    /// variable can correct a bad value in the file.
    pub fn load_from<P, I, K, V>(path: P, vars: I) -> Result<Self>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::read_file(path)?
        } else {
            Self::default()
        };

        config.apply_env(vars)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables on top of the defaults
    ///
    /// Variables are prefixed with `MONGO_CURSOR_`,
    /// e.g. `MONGO_CURSOR_BATCH_SIZE=500`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(std::env::vars_os())?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `(name, value)` pairs.
    ///
    /// Names that are not UTF-8 or lack the `MONGO_CURSOR_` prefix are
    /// ignored. A recognized name with a non-UTF-8 value is an invalid value.
    pub fn apply_env<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        for (name, value) in vars {
            let Some(name) = name.as_ref().to_str() else {
                continue;
            };
            let Some(key) = name.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            if !matches!(key, "BATCH_SIZE" | "LOG_LEVEL" | "LOG_TIMESTAMPS") {
                continue;
            }

            let value = value.as_ref();
            let Some(value) = value.to_str() else {
                return Err(ConfigError::InvalidValue {
                    field: name.to_string(),
                    value: value.to_string_lossy().into_owned(),
                }
                .into());
            };
            match key {
                "BATCH_SIZE" => self.cursor.batch_size = parse_value(name, value)?,
                "LOG_LEVEL" => self.logging.level = parse_value(name, value)?,
                _ => self.logging.timestamps = parse_bool(name, value)?,
            }
        }
        Ok(())
    }

    fn read_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::FileNotFound(path.display().to_string()),
            _ => ConfigError::Io(e.to_string()),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()).into())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mongo-cursor")
            .join("config.toml")
    }

    /// Save configuration to a file, creating parent directories as needed
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.cursor.batch_size < 0 {
            return Err(ConfigError::InvalidValue {
                field: "cursor.batch_size".to_string(),
                value: self.cursor.batch_size.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl LoggingConfig {
    /// Install a global `tracing` subscriber for these settings.
    ///
    /// Returns `false` if a subscriber was already installed.
    pub fn init(&self) -> bool {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(self.level.to_tracing_level())
            .with_target(false);

        if self.timestamps {
            subscriber.try_init().is_ok()
        } else {
            subscriber.without_time().try_init().is_ok()
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

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

fn parse_value<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        ConfigError::InvalidValue {
            field: name.to_string(),
            value: value.to_string(),
        }
        .into()
    })
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: name.to_string(),
            value: value.to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CursorError;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cursor.batch_size, 0);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert!(config.logging.timestamps);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[cursor]\nbatch_size = 250\n").unwrap();
        assert_eq!(config.cursor.batch_size, 250);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.cursor.batch_size = 64;
        config.logging.level = LogLevel::Debug;
        config.save(&path).unwrap();

        assert_eq!(Config::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, CursorError::Config(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[cursor]\nbatch_size = \"lots\"\n").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, CursorError::Config(ConfigError::InvalidFormat(_))));
    }

    #[test]
    fn test_apply_env() {
        let mut config = Config::default();
        config
            .apply_env(vars(&[
                ("MONGO_CURSOR_BATCH_SIZE", "500"),
                ("MONGO_CURSOR_LOG_LEVEL", "TRACE"),
                ("MONGO_CURSOR_LOG_TIMESTAMPS", "off"),
                ("HOME", "/root"),
            ]))
            .unwrap();

        assert_eq!(config.cursor.batch_size, 500);
        assert_eq!(config.logging.level, LogLevel::Trace);
        assert!(!config.logging.timestamps);
    }

    #[test]
    fn test_apply_env_rejects_bad_values() {
        let mut config = Config::default();
        let err = config
            .apply_env(vars(&[("MONGO_CURSOR_BATCH_SIZE", "many")]))
            .unwrap_err();
        match err {
            CursorError::Config(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "MONGO_CURSOR_BATCH_SIZE");
            }
            other => panic!("expected invalid value, got {other:?}"),
        }

        assert!(config.apply_env(vars(&[("MONGO_CURSOR_LOG_TIMESTAMPS", "maybe")])).is_err());
    }

    #[test]
    fn test_load_from_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[cursor]\nbatch_size = 10\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config =
            Config::load_from(&path, vars(&[("MONGO_CURSOR_BATCH_SIZE", "500")])).unwrap();
        assert_eq!(config.cursor.batch_size, 500);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(config.logging.timestamps);

        let config = Config::load_from(&path, vars(&[])).unwrap();
        assert_eq!(config.cursor.batch_size, 10);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert_eq!(Config::load_from(&path, vars(&[])).unwrap(), Config::default());

        let config =
            Config::load_from(&path, vars(&[("MONGO_CURSOR_LOG_LEVEL", "info")])).unwrap();
        assert_eq!(config.cursor.batch_size, 0);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_load_from_validates_after_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[cursor]\nbatch_size = -1\n").unwrap();

        let err = Config::load_from(&path, vars(&[])).unwrap_err();
        assert!(matches!(err, CursorError::Config(ConfigError::InvalidValue { .. })));

        let config =
            Config::load_from(&path, vars(&[("MONGO_CURSOR_BATCH_SIZE", "5")])).unwrap();
        assert_eq!(config.cursor.batch_size, 5);

        let absent = dir.path().join("absent.toml");
        let err =
            Config::load_from(&absent, vars(&[("MONGO_CURSOR_BATCH_SIZE", "-3")])).unwrap_err();
        assert!(matches!(err, CursorError::Config(ConfigError::InvalidValue { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_from_env_ignores_unrelated_non_utf8_vars() {
        use std::os::unix::ffi::OsStrExt;

        let name = "CURSOR_CONFIG_TESTS_BYTES";
        // SAFETY: no other test reads or writes this variable.
        unsafe { std::env::set_var(name, OsStr::from_bytes(b"\xff\xfe")) };
        let result = Config::from_env();
        unsafe { std::env::remove_var(name) };

        assert!(result.is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_apply_env_non_utf8_values() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let bytes = || OsString::from_vec(b"\xff\xfe".to_vec());
        let mut config = Config::default();

        config
            .apply_env([
                (OsString::from_vec(b"\xffMONGO".to_vec()), bytes()),
                (OsString::from("PATH_BYTES"), bytes()),
            ])
            .unwrap();
        assert_eq!(config, Config::default());

        let err = config
            .apply_env([(OsString::from("MONGO_CURSOR_BATCH_SIZE"), bytes())])
            .unwrap_err();
        match err {
            CursorError::Config(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "MONGO_CURSOR_BATCH_SIZE");
            }
            other => panic!("expected invalid value, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_batch_size_is_invalid() {
        let mut config = Config::default();
        config.cursor.batch_size = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Debug.to_tracing_level(), tracing::Level::DEBUG);
        assert_eq!("Warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_default_path_file_name() {
        let path = Config::default_path();
        assert!(path.ends_with("mongo-cursor/config.toml"));
    }
}
