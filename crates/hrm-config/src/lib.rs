//! HRM Configuration System
//!
//! TOML-based configuration with environment variable overrides. The
//! resulting [`AppConfig`] is built once at startup and handed to the
//! components that need it; nothing below the binaries reads the
//! environment directly.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub directory: DirectoryConfig,
    pub session: SessionConfig,
    pub alerts: AlertsConfig,

    /// Use the in-memory directory instead of the remote API
    pub dev_mode: bool,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub host: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
        }
    }
}

/// Identity directory (Okta) API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Base URL of the tenant, e.g. `https://example.okta.com`
    pub domain: String,
    /// API token sent as `SSWS <token>`
    pub api_token: String,
    pub timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            api_token: String::new(),
            timeout_secs: 10,
        }
    }
}

/// Console session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// HMAC secret used to sign session tokens
    pub secret_key: String,
    pub cookie_name: String,
    pub secure: bool,
    pub same_site: String,
    pub expiry_secs: i64,
    pub issuer: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            cookie_name: "hrm_session".to_string(),
            secure: false,
            same_site: "Lax".to_string(),
            expiry_secs: 28800,
            issuer: "hrm-console".to_string(),
        }
    }
}

/// Alert forwarding configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    /// Sender address
    pub source: String,
    /// Single recipient address
    pub destination: String,
    pub smtp: SmtpConfig,
    pub queue: AlertQueueConfig,
}

/// SMTP relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Use STARTTLS; disable only for a local relay
    pub starttls: bool,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 587,
            username: String::new(),
            password: String::new(),
            starttls: true,
        }
    }
}

/// SQS queue subscribed to the alert topic
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertQueueConfig {
    pub queue_url: String,
    pub region: String,
    pub wait_time_seconds: i32,
    pub visibility_timeout: i32,
    pub max_messages: u32,
}

impl Default for AlertQueueConfig {
    fn default() -> Self {
        Self {
            queue_url: String::new(),
            region: "eu-central-1".to_string(),
            wait_time_seconds: 20,
            visibility_timeout: 60,
            max_messages: 10,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Check the settings the console server cannot run without.
    pub fn validate_console(&self) -> Result<(), ConfigError> {
        if !self.dev_mode {
            if self.directory.domain.is_empty() || self.directory.api_token.is_empty() {
                return Err(ConfigError::ValidationError(
                    "directory.domain and directory.api_token must be set (OKTA_DOMAIN, OKTA_API_TOKEN)".to_string(),
                ));
            }
            if !self.directory.domain.starts_with("http://") && !self.directory.domain.starts_with("https://") {
                return Err(ConfigError::ValidationError(format!(
                    "directory.domain must be an http(s) URL, got '{}'",
                    self.directory.domain
                )));
            }
        }
        if self.session.secret_key.is_empty() {
            return Err(ConfigError::ValidationError(
                "session.secret_key must be set (SECRET_KEY)".to_string(),
            ));
        }
        if self.directory.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "directory.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Check the settings the alert forwarder cannot run without.
    pub fn validate_alerts(&self) -> Result<(), ConfigError> {
        let alerts = &self.alerts;
        if alerts.source.is_empty() || alerts.destination.is_empty() {
            return Err(ConfigError::ValidationError(
                "alerts.source and alerts.destination must be set".to_string(),
            ));
        }
        if alerts.smtp.host.is_empty() {
            return Err(ConfigError::ValidationError(
                "alerts.smtp.host must be set".to_string(),
            ));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# HRM Configuration
# Environment variables override these settings

dev_mode = false

[http]
port = 5000
host = "0.0.0.0"

[directory]
domain = "https://example.okta.com"   # OKTA_DOMAIN
api_token = ""                        # OKTA_API_TOKEN
timeout_secs = 10

[session]
secret_key = ""                       # SECRET_KEY
cookie_name = "hrm_session"
secure = false
same_site = "Lax"
expiry_secs = 28800
issuer = "hrm-console"

[alerts]
source = "alerts@example.com"
destination = "oncall@example.com"

[alerts.smtp]
host = "email-smtp.eu-central-1.amazonaws.com"
port = 587
username = ""
password = ""
starttls = true

[alerts.queue]
queue_url = ""
region = "eu-central-1"
wait_time_seconds = 20
visibility_timeout = 60
max_messages = 10
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.http.port, 5000);
        assert_eq!(config.directory.timeout_secs, 10);
        assert_eq!(config.session.cookie_name, "hrm_session");
        assert_eq!(config.alerts.queue.region, "eu-central-1");
        assert!(!config.dev_mode);
    }

    #[test]
    fn test_parse_example_toml() {
        let config: AppConfig = toml::from_str(&AppConfig::example_toml()).unwrap();
        assert_eq!(config.directory.domain, "https://example.okta.com");
        assert_eq!(config.alerts.smtp.port, 587);
        assert_eq!(config.alerts.destination, "oncall@example.com");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("[http]\nport = 9000\n").unwrap();
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.session.expiry_secs, 28800);
    }

    #[test]
    fn test_validate_console_requires_directory_credentials() {
        let mut config = AppConfig::default();
        config.session.secret_key = "secret".to_string();
        assert!(config.validate_console().is_err());

        config.directory.domain = "https://example.okta.com".to_string();
        config.directory.api_token = "token".to_string();
        assert!(config.validate_console().is_ok());
    }

    #[test]
    fn test_validate_console_dev_mode_skips_directory() {
        let mut config = AppConfig::default();
        config.dev_mode = true;
        config.session.secret_key = "secret".to_string();
        assert!(config.validate_console().is_ok());
    }

    #[test]
    fn test_validate_console_requires_secret() {
        let mut config = AppConfig::default();
        config.dev_mode = true;
        let err = config.validate_console().unwrap_err();
        assert!(err.to_string().contains("secret_key"));
    }

    #[test]
    fn test_validate_console_rejects_bare_domain() {
        let mut config = AppConfig::default();
        config.session.secret_key = "secret".to_string();
        config.directory.domain = "example.okta.com".to_string();
        config.directory.api_token = "token".to_string();
        assert!(config.validate_console().is_err());
    }

    #[test]
    fn test_validate_alerts() {
        let mut config = AppConfig::default();
        assert!(config.validate_alerts().is_err());

        config.alerts.source = "a@example.com".to_string();
        config.alerts.destination = "b@example.com".to_string();
        assert!(config.validate_alerts().is_err());

        config.alerts.smtp.host = "smtp.example.com".to_string();
        assert!(config.validate_alerts().is_ok());
    }
}
