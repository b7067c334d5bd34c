//! Console settings

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConsoleError;
use crate::http::tasks::{DEFAULT_TASK_LIMIT, MAX_TASK_LIMIT};
use crate::logs::LogLevel;

pub const ENV_API_BASE: &str = "MAA_API_BASE";
pub const ENV_DEFAULT_USER_KEY: &str = "MAA_DEFAULT_USER_KEY";
pub const ENV_LOG_LEVEL: &str = "MAA_LOG_LEVEL";

/// Console settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,

    /// Backend configuration
    #[serde(default)]
    pub backend: BackendSettings,

    /// Polling interval in seconds
    #[serde(default = "default_polling_interval")]
    pub polling_interval_secs: u64,

    /// Tasks fetched per device refresh
    #[serde(default = "default_task_page_size")]
    pub task_page_size: u32,
}

fn default_polling_interval() -> u64 {
    30
}

fn default_task_page_size() -> u32 {
    DEFAULT_TASK_LIMIT
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_json: false,
            backend: BackendSettings::default(),
            polling_interval_secs: default_polling_interval(),
            task_page_size: default_task_page_size(),
        }
    }
}

impl Settings {
    /// Read settings from a JSON file
    pub async fn from_file(path: &Path) -> Result<Self, ConsoleError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let settings: Settings = serde_json::from_str(&raw)?;
        Ok(settings)
    }

    /// Apply `MAA_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConsoleError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConsoleError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(ENV_API_BASE).filter(|v| !v.is_empty()) {
            self.backend.base_url = base_url;
        }
        if let Some(user_key) = lookup(ENV_DEFAULT_USER_KEY).filter(|v| !v.is_empty()) {
            self.backend.user_key = user_key;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.is_empty()) {
            self.log_level = level.parse::<LogLevel>().map_err(ConsoleError::ConfigError)?;
        }
        Ok(())
    }

    /// Reject settings the backend or the client cannot work with
    pub fn validate(&self) -> Result<(), ConsoleError> {
        let base_url = self.backend.base_url.as_str();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConsoleError::ConfigError(format!(
                "backend URL must start with http:// or https://, got: {}",
                base_url
            )));
        }
        if self.backend.user_key.trim().is_empty() {
            return Err(ConsoleError::ConfigError("user key must not be empty".to_string()));
        }
        if !(1..=MAX_TASK_LIMIT).contains(&self.task_page_size) {
            return Err(ConsoleError::ConfigError(format!(
                "task page size must be between 1 and {}",
                MAX_TASK_LIMIT
            )));
        }
        if self.polling_interval_secs == 0 {
            return Err(ConsoleError::ConfigError(
                "polling interval must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}

/// Backend API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL for the backend API
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    /// User key scoping every device and task request
    #[serde(default = "default_user_key")]
    pub user_key: String,
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_user_key() -> String {
    "demo-user".to_string()
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            user_key: default_user_key(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"backend": {"base_url": "http://maa.local:9000/"}}"#).unwrap();

        assert_eq!(settings.backend.base_url, "http://maa.local:9000/");
        assert_eq!(settings.backend.user_key, "demo-user");
        assert_eq!(settings.task_page_size, 20);
        assert_eq!(settings.polling_interval_secs, 30);
        assert_eq!(settings.log_level, LogLevel::Info);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_API_BASE, "https://maa.example.com"),
            (ENV_DEFAULT_USER_KEY, "alice"),
            (ENV_LOG_LEVEL, "debug"),
        ]);
        let mut settings = Settings::default();
        settings
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(settings.backend.base_url, "https://maa.example.com");
        assert_eq!(settings.backend.user_key, "alice");
        assert_eq!(settings.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut settings = Settings::default();
        settings.apply_overrides(|_| Some(String::new())).unwrap();
        assert_eq!(settings.backend.user_key, "demo-user");
    }

    #[test]
    fn test_invalid_log_level_is_a_config_error() {
        let mut settings = Settings::default();
        let result = settings.apply_overrides(|key| (key == ENV_LOG_LEVEL).then(|| "loud".to_string()));
        assert!(matches!(result, Err(ConsoleError::ConfigError(_))));
    }

    #[test]
    fn test_validate() {
        assert!(Settings::default().validate().is_ok());

        let mut settings = Settings::default();
        settings.backend.base_url = "ftp://nope".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.task_page_size = 101;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.backend.user_key = "  ".to_string();
        assert!(settings.validate().is_err());
    }

    #[tokio::test]
    async fn test_missing_file_is_an_io_error() {
        let result = Settings::from_file(Path::new("/nonexistent/maa-console.json")).await;
        assert!(matches!(result, Err(ConsoleError::IoError(_))));
    }
}
