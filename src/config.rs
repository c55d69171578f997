//! Configuration management for Wellscope
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, WellscopeError};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Wellscope
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend REST settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Local session store settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Chat assistant settings
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Backend REST configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the well-log backend, including its `/api` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout shared by every backend call (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout() -> u64 {
    120
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Local session store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Store location; the platform data directory is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Maximum bytes held by the store across all keys
    #[serde(default = "default_quota_bytes")]
    pub quota_bytes: usize,
}

fn default_quota_bytes() -> usize {
    5 * 1024 * 1024 // 5 MB
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            quota_bytes: default_quota_bytes(),
        }
    }
}

impl StorageConfig {
    /// Resolve the on-disk store location
    ///
    /// # Errors
    ///
    /// Returns error if no path is configured and the platform data
    /// directory cannot be determined
    pub fn resolve_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let proj_dirs = ProjectDirs::from("com", "wellscope", "wellscope").ok_or_else(|| {
            WellscopeError::Storage("Could not determine data directory".into())
        })?;
        Ok(proj_dirs.data_dir().join("session.db"))
    }
}

/// Chat assistant configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Detail level used until the user picks one (1-5)
    #[serde(default = "default_detail_level")]
    pub default_detail_level: u8,
}

fn default_detail_level() -> u8 {
    3
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_detail_level: default_detail_level(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(WellscopeError::Io)?;
        let config = serde_yaml::from_str(&contents).map_err(WellscopeError::Yaml)?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("WELLSCOPE_API_BASE") {
            tracing::debug!(base_url = %base_url, "Env override: WELLSCOPE_API_BASE");
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("WELLSCOPE_TIMEOUT_SECONDS") {
            match timeout.parse() {
                Ok(value) => self.api.timeout_seconds = value,
                Err(_) => tracing::warn!("Invalid WELLSCOPE_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(path) = std::env::var("WELLSCOPE_STORAGE_PATH") {
            tracing::debug!(path = %path, "Env override: WELLSCOPE_STORAGE_PATH");
            self.storage.path = Some(PathBuf::from(path));
        }

        if let Ok(quota) = std::env::var("WELLSCOPE_STORAGE_QUOTA_BYTES") {
            match quota.parse() {
                Ok(value) => self.storage.quota_bytes = value,
                Err(_) => tracing::warn!("Invalid WELLSCOPE_STORAGE_QUOTA_BYTES: {}", quota),
            }
        }

        if let Ok(level) = std::env::var("WELLSCOPE_DETAIL_LEVEL") {
            match level.parse() {
                Ok(value) => self.chat.default_detail_level = value,
                Err(_) => tracing::warn!("Invalid WELLSCOPE_DETAIL_LEVEL: {}", level),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(base_url) = &cli.api_base {
            self.api.base_url = base_url.clone();
        }
        if let Some(path) = &cli.storage_path {
            self.storage.path = Some(path.clone());
        }
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.api.base_url).map_err(|e| {
            WellscopeError::Config(format!("Invalid api.base_url {}: {}", self.api.base_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(WellscopeError::Config(format!(
                "api.base_url must use http or https, got {}",
                parsed.scheme()
            ))
            .into());
        }

        if self.api.timeout_seconds == 0 {
            return Err(WellscopeError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.storage.quota_bytes == 0 {
            return Err(WellscopeError::Config(
                "storage.quota_bytes must be greater than 0".to_string(),
            )
            .into());
        }

        if !(1..=5).contains(&self.chat.default_detail_level) {
            return Err(WellscopeError::Config(
                "chat.default_detail_level must be between 1 and 5".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.api.timeout_seconds, 120);
        assert_eq!(config.storage.quota_bytes, 5 * 1024 * 1024);
        assert_eq!(config.chat.default_detail_level, 3);
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_rejects_bad_url() {
        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "ftp://example.com/api".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.api.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_quota() {
        let mut config = Config::default();
        config.storage.quota_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_detail_level_range() {
        let mut config = Config::default();
        config.chat.default_detail_level = 6;
        assert!(config.validate().is_err());
        config.chat.default_detail_level = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
api:
  base_url: "https://wells.example.com/api"
  timeout_seconds: 30
storage:
  path: "/tmp/wellscope-test.db"
  quota_bytes: 1024
chat:
  default_detail_level: 5
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api.base_url, "https://wells.example.com/api");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(
            config.storage.path,
            Some(PathBuf::from("/tmp/wellscope-test.db"))
        );
        assert_eq!(config.storage.quota_bytes, 1024);
        assert_eq!(config.chat.default_detail_level, 5);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("api:\n  timeout_seconds: 10\n").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.api.timeout_seconds, 10);
        assert!(config.storage.path.is_none());
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        let cli = crate::cli::Cli::default();
        let config = Config::load("/nonexistent/wellscope.yaml", &cli).unwrap();
        assert_eq!(config.api.timeout_seconds, 120);
    }

    #[test]
    #[serial]
    fn test_load_malformed_file_is_yaml_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wellscope.yaml");
        std::fs::write(&path, "api:\n  timeout_seconds: [unclosed\n").unwrap();

        let cli = crate::cli::Cli::default();
        let err = Config::load(path.to_str().unwrap(), &cli).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WellscopeError>(),
            Some(WellscopeError::Yaml(_))
        ));
    }

    #[test]
    fn test_cli_overrides_win() {
        let cli = crate::cli::Cli {
            api_base: Some("http://backend:9000/api".to_string()),
            storage_path: Some(PathBuf::from("/tmp/override.db")),
            ..Default::default()
        };
        let mut config = Config::default();
        config.apply_cli_overrides(&cli);
        assert_eq!(config.api.base_url, "http://backend:9000/api");
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/override.db")));
    }

    #[test]
    fn test_resolve_path_prefers_configured_path() {
        let storage = StorageConfig {
            path: Some(PathBuf::from("/tmp/explicit.db")),
            ..Default::default()
        };
        assert_eq!(
            storage.resolve_path().unwrap(),
            PathBuf::from("/tmp/explicit.db")
        );
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_overrides_fields() {
        std::env::set_var("WELLSCOPE_API_BASE", "http://env-host:8000/api");
        std::env::set_var("WELLSCOPE_TIMEOUT_SECONDS", "45");
        std::env::set_var("WELLSCOPE_STORAGE_QUOTA_BYTES", "not-a-number");
        std::env::set_var("WELLSCOPE_DETAIL_LEVEL", "4");

        let mut config = Config::default();
        config.apply_env_vars();

        assert_eq!(config.api.base_url, "http://env-host:8000/api");
        assert_eq!(config.api.timeout_seconds, 45);
        // invalid value is ignored
        assert_eq!(config.storage.quota_bytes, 5 * 1024 * 1024);
        assert_eq!(config.chat.default_detail_level, 4);

        std::env::remove_var("WELLSCOPE_API_BASE");
        std::env::remove_var("WELLSCOPE_TIMEOUT_SECONDS");
        std::env::remove_var("WELLSCOPE_STORAGE_QUOTA_BYTES");
        std::env::remove_var("WELLSCOPE_DETAIL_LEVEL");
    }
}
