//! Main application configuration
//!
//! This module defines the primary configuration structures for the roll-call
//! service, including environment variable and TOML file loading and validation.

use crate::config::storage::{StorageBackend, StorageSettings};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub storage: StorageSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Port for health check endpoint
    pub health_port: u16,
    /// Whether to serve the health and metrics endpoints
    pub enable_health_server: bool,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "roll-call".to_string(),
            log_level: "info".to_string(),
            health_port: 8080,
            enable_health_server: true,
            shutdown_timeout_seconds: 10,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; environment variables still override it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        if let Ok(port) = env::var("HEALTH_PORT") {
            self.service.health_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid HEALTH_PORT value: {}", port))?;
        }
        if let Ok(enabled) = env::var("ENABLE_HEALTH_SERVER") {
            self.service.enable_health_server = enabled
                .parse()
                .map_err(|_| anyhow!("Invalid ENABLE_HEALTH_SERVER value: {}", enabled))?;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            self.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Storage settings
        if let Ok(backend) = env::var("STORAGE_BACKEND") {
            self.storage.backend = backend
                .parse()
                .map_err(|e| anyhow!("Invalid STORAGE_BACKEND value: {}", e))?;
        }
        if let Ok(path) = env::var("STORAGE_PATH") {
            self.storage.path = PathBuf::from(path);
        }

        Ok(())
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    // Validate ports
    if config.service.enable_health_server && config.service.health_port == 0 {
        return Err(anyhow!("Health port cannot be 0"));
    }

    // Validate timeouts
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }

    // Validate storage settings
    if config.storage.backend == StorageBackend::Json
        && config.storage.path.as_os_str().is_empty()
    {
        return Err(anyhow!("Storage path cannot be empty for the json backend"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = AppConfig::default();
        config.service.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.service.health_port = 0;
        assert!(validate_config(&config).is_err());
        config.service.enable_health_server = false;
        assert!(validate_config(&config).is_ok());

        let mut config = AppConfig::default();
        config.storage.backend = StorageBackend::Json;
        config.storage.path = PathBuf::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [storage]
            backend = "json"
            path = "/var/lib/roll-call/lobbies.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Json);
        assert_eq!(
            config.storage.path,
            PathBuf::from("/var/lib/roll-call/lobbies.json")
        );
        assert_eq!(config.service.name, "roll-call");
        assert_eq!(config.service.health_port, 8080);
    }

    #[test]
    fn test_from_file_reports_bad_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("roll-call.toml");
        std::fs::write(&path, "[service\nname = ").unwrap();

        let err = AppConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_storage_backend_parsing() {
        assert_eq!("JSON".parse::<StorageBackend>(), Ok(StorageBackend::Json));
        assert_eq!("memory".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert!("mongo".parse::<StorageBackend>().is_err());
    }
}
