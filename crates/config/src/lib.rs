//! Configuration loading, validation, and management for RepoLens.
//!
//! Loads configuration from `~/.repolens/config.toml` with environment
//! variable overrides. Validates all settings at startup. The loaded
//! value is immutable and passed into each component at construction —
//! there is no ambient/global configuration state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.repolens/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the generative model backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model backend: "openai" or "anthropic"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Base URL override (proxies, self-hosted OpenAI-compatible servers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Model identifier sent to the backend
    #[serde(default = "default_model")]
    pub model: String,

    /// Pipeline limits
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Selector (file-ranking call) settings
    #[serde(default)]
    pub selector: SelectorConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("pipeline", &self.pipeline)
            .field("selector", &self.selector)
            .field("gateway", &self.gateway)
            .finish()
    }
}

/// Limits for the context-assembly pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Total token budget for tree listing + file contents combined
    #[serde(default = "default_token_budget")]
    pub token_budget: usize,

    /// Files larger than this many bytes are excluded outright
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
}

fn default_token_budget() -> usize {
    100_000
}
fn default_max_file_size() -> u64 {
    100_000
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            token_budget: default_token_budget(),
            max_file_size_bytes: default_max_file_size(),
        }
    }
}

/// Settings for the external file-ranking call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Maximum files the selector may rank
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Timeout for the ranking call; on expiry the heuristic fallback applies
    #[serde(default = "default_selector_timeout")]
    pub timeout_secs: u64,
}

fn default_max_files() -> usize {
    20
}
fn default_selector_timeout() -> u64 {
    60
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            timeout_secs: default_selector_timeout(),
        }
    }
}

/// HTTP gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.repolens/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `REPOLENS_API_KEY` (highest priority)
    /// - `OPENAI_API_KEY`
    /// - `ANTHROPIC_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.api_key.is_none() {
            config.api_key = std::env::var("REPOLENS_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok());
        }

        if let Ok(provider) = std::env::var("REPOLENS_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("REPOLENS_MODEL") {
            config.model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".repolens")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.token_budget == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.token_budget must be greater than 0".into(),
            ));
        }

        if self.selector.max_files == 0 {
            return Err(ConfigError::ValidationError(
                "selector.max_files must be greater than 0".into(),
            ));
        }

        if !matches!(self.provider.as_str(), "openai" | "anthropic") {
            return Err(ConfigError::ValidationError(format!(
                "provider must be 'openai' or 'anthropic', got '{}'",
                self.provider
            )));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: default_provider(),
            api_url: None,
            model: default_model(),
            pipeline: PipelineConfig::default(),
            selector: SelectorConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "openai");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.pipeline.token_budget, 100_000);
        assert_eq!(config.pipeline.max_file_size_bytes, 100_000);
        assert_eq!(config.selector.max_files, 20);
        assert_eq!(config.gateway.port, 8000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.provider, config.provider);
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(parsed.pipeline.token_budget, config.pipeline.token_budget);
    }

    #[test]
    fn zero_budget_rejected() {
        let config = AppConfig {
            pipeline: PipelineConfig {
                token_budget: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_provider_rejected() {
        let config = AppConfig {
            provider: "mistral".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.provider, "openai");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
provider = "anthropic"
model = "claude-sonnet-4-20250514"

[pipeline]
token_budget = 50000

[gateway]
port = 9000
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.provider, "anthropic");
        assert_eq!(config.pipeline.token_budget, 50_000);
        assert_eq!(config.gateway.port, 9000);
        // Unspecified sections keep their defaults
        assert_eq!(config.selector.max_files, 20);
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
