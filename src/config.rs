//! Configuration management for zenfocus

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for the AI assistant providers
///
/// API keys are never stored in the config file; only the names of the
/// environment variables that hold them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssistConfig {
    /// Environment variable holding the OpenAI key
    #[serde(default = "default_openai_key_env")]
    pub openai_key_env: String,

    /// OpenAI chat model
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Environment variable holding the Gemini key
    #[serde(default = "default_gemini_key_env")]
    pub gemini_key_env: String,

    /// Gemini model
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Per-request timeout in seconds (default: 15)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_openai_key_env() -> String {
    "API_KEY_OPENAI".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_gemini_key_env() -> String {
    "API_KEY".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            openai_key_env: default_openai_key_env(),
            openai_model: default_openai_model(),
            gemini_key_env: default_gemini_key_env(),
            gemini_model: default_gemini_model(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl AssistConfig {
    /// Read the OpenAI key from the environment, if set and non-empty
    pub fn openai_key(&self) -> Option<String> {
        read_key(&self.openai_key_env)
    }

    /// Read the Gemini key from the environment, if set and non-empty
    pub fn gemini_key(&self) -> Option<String> {
        read_key(&self.gemini_key_env)
    }
}

fn read_key(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Estimate used by `add` when none is given (default: 25)
    #[serde(default = "default_focus_minutes")]
    pub default_focus_minutes: u32,

    /// Minutes added or removed by one adjustment during a session (default: 5)
    #[serde(default = "default_adjust_step_minutes")]
    pub adjust_step_minutes: u32,

    /// Alert on timer expiry: "bell" (terminal bell) or "none"
    #[serde(default = "default_notification_method")]
    pub notification_method: String,

    /// Log file retention in days (default: 7)
    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: u64,

    /// AI assistant settings
    #[serde(default)]
    pub assist: AssistConfig,
}

fn default_focus_minutes() -> u32 {
    25 // Pomodoro-style default
}

fn default_adjust_step_minutes() -> u32 {
    5
}

fn default_notification_method() -> String {
    "bell".to_string()
}

fn default_log_retention_days() -> u64 {
    crate::logging::DEFAULT_RETENTION_DAYS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_focus_minutes: default_focus_minutes(),
            adjust_step_minutes: default_adjust_step_minutes(),
            notification_method: default_notification_method(),
            log_retention_days: default_log_retention_days(),
            assist: AssistConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path, or return default if not found
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Check if expiry should ring the terminal bell
    pub fn bell_enabled(&self) -> bool {
        self.notification_method == "bell"
    }
}

/// Get the base data directory (~/.zenfocus)
/// Falls back to ./.zenfocus if home directory cannot be determined
pub fn config_dir() -> PathBuf {
    try_config_dir().unwrap_or_else(|| {
        tracing::warn!("Could not determine home directory, using current directory for data");
        PathBuf::from(".zenfocus")
    })
}

/// Try to get the base data directory, returning None if home dir is unavailable
pub fn try_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".zenfocus"))
}

/// Get the path to the config file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the path to the logs directory
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}

/// Ensure all required directories exist
pub fn ensure_directories() -> Result<()> {
    std::fs::create_dir_all(config_dir()).context("Failed to create data directory")?;

    std::fs::create_dir_all(logs_dir()).context("Failed to create logs directory")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_focus_minutes, 25);
        assert_eq!(config.adjust_step_minutes, 5);
        assert!(config.bell_enabled());
        assert_eq!(config.assist.openai_key_env, "API_KEY_OPENAI");
        assert_eq!(config.assist.gemini_key_env, "API_KEY");
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.adjust_step_minutes = 10;
        config.assist.request_timeout_secs = 30;

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.adjust_step_minutes, 10);
        assert_eq!(parsed.assist, config.assist);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            notification_method = "none"

            [assist]
            openai_model = "gpt-4o"
            "#,
        )
        .unwrap();

        assert!(!parsed.bell_enabled());
        assert_eq!(parsed.default_focus_minutes, 25);
        assert_eq!(parsed.assist.openai_model, "gpt-4o");
        assert_eq!(parsed.assist.gemini_model, "gemini-2.5-flash");
    }

    #[test]
    fn test_load_from_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config.log_retention_days, 7);
    }

    #[test]
    fn test_load_from_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "default_focus_minutes = \"lots\"").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_missing_key_env_yields_none() {
        let assist = AssistConfig {
            openai_key_env: "ZENFOCUS_TEST_UNSET_KEY_VAR".to_string(),
            ..AssistConfig::default()
        };
        assert!(assist.openai_key().is_none());
    }

    #[test]
    fn test_config_dir_does_not_panic() {
        let dir = config_dir();
        assert!(dir.ends_with(".zenfocus"));
    }
}
