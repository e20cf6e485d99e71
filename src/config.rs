//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::source::SseConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Event stream configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_reconnect_initial")]
    pub reconnect_initial_ms: u64,

    #[serde(default = "default_reconnect_max")]
    pub reconnect_max_ms: u64,

    #[serde(default)]
    pub max_reconnect_attempts: u32,
}

fn default_url() -> String {
    "http://127.0.0.1:8080/events".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_reconnect_initial() -> u64 {
    1000 // 1 second
}

fn default_reconnect_max() -> u64 {
    30_000 // 30 seconds
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            connect_timeout_secs: default_connect_timeout(),
            reconnect_initial_ms: default_reconnect_initial(),
            reconnect_max_ms: default_reconnect_max(),
            max_reconnect_attempts: 0,
        }
    }
}

impl SourceConfig {
    /// Connection settings for the SSE client
    pub fn sse_config(&self) -> SseConfig {
        SseConfig {
            url: self.url.clone(),
            connect_timeout: match self.connect_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            reconnect_initial: Duration::from_millis(self.reconnect_initial_ms),
            reconnect_max: Duration::from_millis(self.reconnect_max_ms),
            max_attempts: self.max_reconnect_attempts,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// File that receives logs while the terminal dashboard owns the screen
    pub fn file_or_default(&self) -> PathBuf {
        self.file
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("stagewatch.log"))
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("stagewatch").join("config.toml")),
            Some(PathBuf::from("/etc/stagewatch/config.toml")),
            Some(PathBuf::from("./stagewatch.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("STAGEWATCH_URL") {
            self.source.url = url;
        }

        if let Some(level) = lookup("STAGEWATCH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("STAGEWATCH_LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Some(file) = lookup("STAGEWATCH_LOG_FILE") {
            self.logging.file = Some(file);
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Stagewatch Configuration
#
# Environment variables override these settings:
# - STAGEWATCH_URL
# - STAGEWATCH_LOG_LEVEL
# - STAGEWATCH_LOG_FORMAT
# - STAGEWATCH_LOG_FILE

[source]
# Server-Sent Events endpoint publishing pipeline snapshots
url = "http://127.0.0.1:8080/events"

# Handshake timeout in seconds (0 disables)
connect_timeout_secs = 10

# First reconnect delay; doubles on each failure (ms)
reconnect_initial_ms = 1000

# Reconnect delay ceiling (ms)
reconnect_max_ms = 30000

# Consecutive reconnect attempts before giving up (0 = retry forever)
max_reconnect_attempts = 0

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Log file used while the terminal dashboard is running
# file = "stagewatch.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.source.url, "http://127.0.0.1:8080/events");
        assert_eq!(config.source.reconnect_initial_ms, 1000);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.is_json());
        assert_eq!(config.logging.file_or_default(), PathBuf::from("stagewatch.log"));
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config = Config::parse(&generate_default_config()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.source.url, defaults.source.url);
        assert_eq!(config.source.connect_timeout_secs, defaults.source.connect_timeout_secs);
        assert_eq!(config.source.reconnect_max_ms, defaults.source.reconnect_max_ms);
        assert_eq!(config.source.max_reconnect_attempts, 0);
        assert_eq!(config.logging.format, "pretty");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::parse("[source]\nurl = \"http://pipeline:9000/events\"\n").unwrap();
        assert_eq!(config.source.url, "http://pipeline:9000/events");
        assert_eq!(config.source.reconnect_initial_ms, 1000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nformat = \"json\"\nfile = \"/tmp/sw.log\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert!(config.logging.is_json());
        assert_eq!(config.logging.file_or_default(), PathBuf::from("/tmp/sw.log"));
    }

    #[test]
    fn test_load_errors() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[source\nurl = 1").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("STAGEWATCH_URL", "http://other/events"),
            ("STAGEWATCH_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.source.url, "http://other/events");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_sse_config_conversion() {
        let source = SourceConfig {
            connect_timeout_secs: 0,
            reconnect_initial_ms: 250,
            reconnect_max_ms: 4000,
            max_reconnect_attempts: 3,
            ..Default::default()
        };

        let sse = source.sse_config();
        assert_eq!(sse.connect_timeout, None);
        assert_eq!(sse.reconnect_initial, Duration::from_millis(250));
        assert_eq!(sse.reconnect_max, Duration::from_millis(4000));
        assert_eq!(sse.max_attempts, 3);
    }
}
