//! Configuration module for simdash
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`SIMDASH_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use simdash::config::SimdashConfig;
//!
//! let config = SimdashConfig::default();
//! assert_eq!(config.stream.max_attempts, 10);
//!
//! let toml = r#"
//! [backend]
//! url = "http://sim-host:5000"
//! "#;
//! let config: SimdashConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.backend.url, "http://sim-host:5000");
//! ```

pub mod backend;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod stream;

pub use backend::BackendConfig;
pub use dashboard::DashboardConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use stream::StreamConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for the dashboard client.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimdashConfig {
    /// Request/response backend
    pub backend: BackendConfig,
    /// Push channel and reconnection policy
    pub stream: StreamConfig,
    /// Notification and operator defaults
    pub dashboard: DashboardConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl SimdashConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are ignored and the previous value is kept.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("SIMDASH_URL") {
            self.backend.url = url;
        }
        if let Ok(url) = std::env::var("SIMDASH_STREAM_URL") {
            self.stream.url = Some(url);
        }
        if let Ok(delay) = std::env::var("SIMDASH_RETRY_DELAY_MS") {
            if let Ok(d) = delay.parse() {
                self.stream.retry_delay_ms = d;
            }
        }
        if let Ok(attempts) = std::env::var("SIMDASH_MAX_ATTEMPTS") {
            if let Ok(a) = attempts.parse() {
                self.stream.max_attempts = a;
            }
        }

        if let Ok(level) = std::env::var("SIMDASH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("SIMDASH_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.backend.url.trim();
        if url.is_empty() {
            return Err(ConfigError::Validation {
                field: "backend.url".to_string(),
                message: "URL cannot be empty".to_string(),
            });
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation {
                field: "backend.url".to_string(),
                message: format!("expected an http:// or https:// URL, got '{}'", url),
            });
        }

        if let Some(stream_url) = &self.stream.url {
            if !(stream_url.starts_with("ws://") || stream_url.starts_with("wss://")) {
                return Err(ConfigError::Validation {
                    field: "stream.url".to_string(),
                    message: format!("expected a ws:// or wss:// URL, got '{}'", stream_url),
                });
            }
        }

        if self.stream.max_attempts == 0 {
            return Err(ConfigError::Validation {
                field: "stream.max_attempts".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.dashboard.notification_ttl_ms == 0 {
            return Err(ConfigError::Validation {
                field: "dashboard.notification_ttl_ms".to_string(),
                message: "must be non-zero".to_string(),
            });
        }

        Ok(())
    }

    /// WebSocket URL for the push channel
    pub fn stream_url(&self) -> String {
        self.stream.resolve_url(&self.backend.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_simdash_config_defaults() {
        let config = SimdashConfig::default();
        assert_eq!(config.backend.url, "http://127.0.0.1:5000");
        assert_eq!(config.stream.retry_delay_ms, 1000);
        assert_eq!(config.stream.max_attempts, 10);
        assert_eq!(config.dashboard.notification_ttl_ms, 5000);
    }

    #[test]
    fn test_config_parse_minimal_toml() {
        let toml = r#"
        [stream]
        max_attempts = 3
        "#;

        let config: SimdashConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.stream.max_attempts, 3);
        assert_eq!(config.stream.retry_delay_ms, 1000); // Default
        assert_eq!(config.backend.url, "http://127.0.0.1:5000"); // Default
    }

    #[test]
    fn test_config_parse_example_file() {
        let toml = include_str!("../../simdash.example.toml");
        let config: SimdashConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.stream_url(), "ws://127.0.0.1:5000/ws");
    }

    #[test]
    fn test_config_load_from_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[backend]\nurl = \"http://10.0.0.2:5000\"").unwrap();

        let config = SimdashConfig::load(Some(temp.path())).unwrap();
        assert_eq!(config.backend.url, "http://10.0.0.2:5000");
    }

    #[test]
    fn test_config_missing_file_error() {
        let result = SimdashConfig::load(Some(Path::new("/nonexistent/simdash.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_config_invalid_toml_error() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[backend\nurl = ").unwrap();

        let result = SimdashConfig::load(Some(temp.path()));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_load_none_returns_defaults() {
        let config = SimdashConfig::load(None).unwrap();
        assert_eq!(config.stream.max_attempts, 10);
    }

    // Env-var tests touch process-wide state, so they are folded into one test.
    #[test]
    fn test_config_env_overrides() {
        std::env::set_var("SIMDASH_URL", "http://env-host:5000");
        std::env::set_var("SIMDASH_MAX_ATTEMPTS", "4");
        std::env::set_var("SIMDASH_RETRY_DELAY_MS", "not-a-number");
        std::env::set_var("SIMDASH_LOG_FORMAT", "json");
        let config = SimdashConfig::default().with_env_overrides();
        std::env::remove_var("SIMDASH_URL");
        std::env::remove_var("SIMDASH_MAX_ATTEMPTS");
        std::env::remove_var("SIMDASH_RETRY_DELAY_MS");
        std::env::remove_var("SIMDASH_LOG_FORMAT");

        assert_eq!(config.backend.url, "http://env-host:5000");
        assert_eq!(config.stream.max_attempts, 4);
        // Invalid value keeps the default
        assert_eq!(config.stream.retry_delay_ms, 1000);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_config_validation_empty_url() {
        let mut config = SimdashConfig::default();
        config.backend.url = "  ".to_string();

        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::Validation { ref field, .. }) if field == "backend.url"
        ));
    }

    #[test]
    fn test_config_validation_bad_scheme() {
        let mut config = SimdashConfig::default();
        config.backend.url = "ftp://sim:21".to_string();
        assert!(config.validate().is_err());

        let mut config = SimdashConfig::default();
        config.stream.url = Some("http://sim:5000/ws".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "stream.url"
        ));
    }

    #[test]
    fn test_config_validation_zero_attempts() {
        let mut config = SimdashConfig::default();
        config.stream.max_attempts = 0;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "stream.max_attempts"
        ));
    }
}
