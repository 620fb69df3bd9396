//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "hrm.toml",
    "./config/config.toml",
    "./config/hrm.toml",
    "/etc/hrm/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        self.load_with(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load) but reads overrides through `lookup`.
    pub fn load_with<F>(&self, lookup: F) -> Result<AppConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file(&lookup) {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, &lookup);

        Ok(config)
    }

    fn find_config_file<F>(&self, lookup: &F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Some(path) = lookup("HRM_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Apply environment variable overrides
fn apply_overrides<F>(config: &mut AppConfig, lookup: &F)
where
    F: Fn(&str) -> Option<String>,
{
    // HTTP
    if let Some(port) = lookup("HRM_HTTP_PORT").and_then(|v| v.parse().ok()) {
        config.http.port = port;
    }
    if let Some(val) = lookup("HRM_HTTP_HOST") {
        config.http.host = val;
    }

    // Directory
    if let Some(val) = lookup("OKTA_DOMAIN") {
        config.directory.domain = val;
    }
    if let Some(val) = lookup("OKTA_API_TOKEN") {
        config.directory.api_token = val;
    }
    if let Some(secs) = lookup("HRM_DIRECTORY_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        config.directory.timeout_secs = secs;
    }

    // Session
    if let Some(val) = lookup("SECRET_KEY") {
        config.session.secret_key = val;
    }
    if let Some(val) = lookup("HRM_SESSION_COOKIE_NAME") {
        config.session.cookie_name = val;
    }
    if let Some(secure) = lookup("HRM_SESSION_SECURE").as_deref().and_then(parse_bool) {
        config.session.secure = secure;
    }

    // Alerts
    if let Some(val) = lookup("HRM_SMTP_HOST") {
        config.alerts.smtp.host = val;
    }
    if let Some(port) = lookup("HRM_SMTP_PORT").and_then(|v| v.parse().ok()) {
        config.alerts.smtp.port = port;
    }
    if let Some(val) = lookup("HRM_SMTP_USERNAME") {
        config.alerts.smtp.username = val;
    }
    if let Some(val) = lookup("HRM_SMTP_PASSWORD") {
        config.alerts.smtp.password = val;
    }
    if let Some(val) = lookup("HRM_ALERT_SOURCE") {
        config.alerts.source = val;
    }
    if let Some(val) = lookup("HRM_ALERT_DESTINATION") {
        config.alerts.destination = val;
    }
    if let Some(val) = lookup("HRM_ALERT_QUEUE_URL") {
        config.alerts.queue.queue_url = val;
    }
    if let Some(val) = lookup("HRM_ALERT_REGION") {
        config.alerts.queue.region = val;
    }

    // General
    if let Some(dev_mode) = lookup("HRM_DEV_MODE").as_deref().and_then(parse_bool) {
        config.dev_mode = dev_mode;
    }
}
