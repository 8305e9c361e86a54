//! Configuration management for sigcore
//!
//! Values are layered: built-in defaults, then an optional TOML file, then `SIGCORE_`
//! environment variables (`SIGCORE_ENGINE__WORKER_THREADS=8`).

use crate::message::MessageType;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "SIGCORE_";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    ReadError(String),
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
    #[error("Home directory not found")]
    HomeDirectoryNotFound,
}

impl From<ConfigError> for sigcore_errors::Error {
    fn from(err: ConfigError) -> Self {
        sigcore_errors::Error::Config(err.to_string())
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigcoreConfig {
    pub engine: EngineConfig,
    pub verification: VerificationConfig,
    pub logging: LoggingConfig,
}

/// Crypto engine worker pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of runtime worker threads
    pub worker_threads: usize,
    /// Upper bound on threads used for the verification math itself
    pub max_blocking_threads: usize,
    pub thread_name: String,
}

/// Verification defaults used by callers that do not pass explicit values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Bound applied by callers that wait on verification futures
    pub default_timeout_ms: u64,
    pub message_type: MessageType,
}

/// Log output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter directive
    pub level: String,
    pub json: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            worker_threads: 2,
            max_blocking_threads: 8,
            thread_name: "sigcore-verify".to_string(),
        }
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        VerificationConfig {
            default_timeout_ms: 5_000,
            message_type: MessageType::Raw,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl SigcoreConfig {
    /// Load configuration from the default path, falling back to defaults if it doesn't exist.
    /// Environment overrides apply either way.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_config_path()?;
        Self::load_layered(Some(&path))
    }

    /// Load defaults, then `path` if it exists, then environment overrides
    pub fn load_layered(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(SigcoreConfig::default()));
        if let Some(path) = path.filter(|p| p.exists()) {
            figment = figment.merge(Toml::file(path));
        }
        let config: SigcoreConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file, without environment overrides
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        let config: SigcoreConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::ReadError(format!("Failed to create config directory: {e}"))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::ReadError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeDirectoryNotFound)?;
        Ok(home.join(".sigcore").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.worker_threads == 0 {
            return Err(ConfigError::InvalidValue(
                "engine.worker_threads must be positive".to_string(),
            ));
        }

        if self.engine.max_blocking_threads == 0 {
            return Err(ConfigError::InvalidValue(
                "engine.max_blocking_threads must be positive".to_string(),
            ));
        }

        if self.verification.default_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "verification.default_timeout_ms must be positive".to_string(),
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "logging.level must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the default verification wait as a Duration
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.verification.default_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = SigcoreConfig::default();
        assert_eq!(config.engine.worker_threads, 2);
        assert_eq!(config.verification.message_type, MessageType::Raw);
        assert_eq!(config.default_timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut original = SigcoreConfig::default();
        original.engine.worker_threads = 6;
        original.verification.message_type = MessageType::Keccak256Hash;
        original.logging.json = false;

        original.save_to_file(&path).unwrap();
        let loaded = SigcoreConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[engine]\nworker_threads = 3\n").unwrap();

        let loaded = SigcoreConfig::load_layered(Some(&path)).unwrap();
        assert_eq!(loaded.engine.worker_threads, 3);
        assert_eq!(loaded.engine.thread_name, "sigcore-verify");
        assert_eq!(loaded.verification.default_timeout_ms, 5_000);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let loaded = SigcoreConfig::load_layered(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(loaded.engine.max_blocking_threads, 8);
    }

    #[test]
    fn test_validation_rejects_zero_values() {
        let mut config = SigcoreConfig::default();
        config.engine.worker_threads = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));

        let mut config = SigcoreConfig::default();
        config.verification.default_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "engine = 5").unwrap();
        assert!(matches!(
            SigcoreConfig::load_from_file(&path),
            Err(ConfigError::ParseError(_))
        ));
    }
}
