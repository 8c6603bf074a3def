//! Configuration loading, validation, and management for Marketeer.
//!
//! Loads configuration from `~/.marketeer/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use marketeer_core::{PlatformRuleTable, SamplingParams};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.marketeer/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model backend selection and sampling
    #[serde(default)]
    pub backend: BackendConfig,

    /// Per-turn generation settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Where platform rules come from
    #[serde(default)]
    pub platforms: PlatformsConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// "huggingface", "openai", "ollama" or "custom"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Base URL override (required for "custom")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// API key / access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Maximum new tokens per reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Use SSE streaming for completions
    #[serde(default)]
    pub stream: bool,

    /// Send the directive as a user message. Some chat templates reject a
    /// system role.
    #[serde(default = "default_true")]
    pub directive_as_user: bool,
}

fn default_provider() -> String {
    "huggingface".into()
}
fn default_model() -> String {
    "google/gemma-2-2b-it".into()
}
fn default_temperature() -> f32 {
    0.8
}
fn default_top_p() -> f32 {
    0.9
}
fn default_max_tokens() -> u32 {
    256
}
fn default_true() -> bool {
    true
}

impl BackendConfig {
    /// Sampling parameters for the backend.
    pub fn sampling(&self) -> SamplingParams {
        SamplingParams {
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_url: None,
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
            stream: false,
            directive_as_user: true,
        }
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("max_tokens", &self.max_tokens)
            .field("stream", &self.stream)
            .field("directive_as_user", &self.directive_as_user)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Upper bound for a single model call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    120
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformsConfig {
    /// TOML rule table; the built-in table is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.marketeer/config.toml).
    ///
    /// Also checks environment variables:
    /// - `MARKETEER_API_KEY`, then `HF_TOKEN`, then `OPENAI_API_KEY`
    /// - `MARKETEER_PROVIDER`
    /// - `MARKETEER_MODEL`, then `MODEL_ID`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with_env(&config_path)
    }

    /// Load from a specific path, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
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

    /// Apply environment overrides using the given lookup.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if self.backend.api_key.is_none() {
            self.backend.api_key = var("MARKETEER_API_KEY")
                .or_else(|| var("HF_TOKEN"))
                .or_else(|| var("OPENAI_API_KEY"));
        }

        if let Some(provider) = var("MARKETEER_PROVIDER") {
            self.backend.provider = provider;
        }

        if let Some(model) = var("MARKETEER_MODEL").or_else(|| var("MODEL_ID")) {
            self.backend.model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".marketeer")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.backend.temperature) {
            return Err(ConfigError::ValidationError(
                "backend.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.backend.top_p <= 0.0 || self.backend.top_p > 1.0 {
            return Err(ConfigError::ValidationError(
                "backend.top_p must be in (0.0, 1.0]".into(),
            ));
        }

        if self.backend.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "backend.max_tokens must be > 0".into(),
            ));
        }

        if self.generation.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "generation.timeout_secs must be > 0".into(),
            ));
        }

        if self.backend.provider == "custom" && self.backend.api_url.is_none() {
            return Err(ConfigError::ValidationError(
                "backend.api_url is required for the custom provider".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.backend.api_key.is_some()
    }

    /// Load the platform rule table named by `platforms.rules_file`, or the
    /// built-in table.
    pub fn platform_rules(&self) -> Result<PlatformRuleTable, ConfigError> {
        let Some(path) = &self.platforms.rules_file else {
            return Ok(PlatformRuleTable::builtin());
        };

        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        marketeer_core::load_platform_rules(&source).map_err(|e| ConfigError::RulesError {
            path: path.clone(),
            reason: e.to_string(),
        })
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
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

    #[error("Invalid platform rules in {path}: {reason}")]
    RulesError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for marketeer_core::Error {
    fn from(err: ConfigError) -> Self {
        marketeer_core::Error::config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.backend.provider, "huggingface");
        assert_eq!(config.backend.model, "google/gemma-2-2b-it");
        assert_eq!(config.generation.timeout(), Duration::from_secs(120));
        assert!(config.backend.directive_as_user);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.backend.provider, config.backend.provider);
        assert_eq!(parsed.generation.timeout_secs, config.generation.timeout_secs);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.backend.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.generation.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn custom_provider_needs_url() {
        let mut config = AppConfig::default();
        config.backend.provider = "custom".into();
        assert!(config.validate().is_err());
        config.backend.api_url = Some("http://localhost:8080/v1".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.backend.provider, "huggingface");
    }

    #[test]
    fn loads_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[backend]\nprovider = \"ollama\"\nmodel = \"llama3.2\"\n\n[generation]\ntimeout_secs = 30"
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.backend.provider, "ollama");
        assert_eq!(config.backend.model, "llama3.2");
        assert_eq!(config.backend.max_tokens, 256);
        assert_eq!(config.generation.timeout_secs, 30);
    }

    #[test]
    fn parse_error_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[backend\nprovider = ").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_key_priority() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("HF_TOKEN", "hf_abc"), ("OPENAI_API_KEY", "sk-x")]));
        assert_eq!(config.backend.api_key.as_deref(), Some("hf_abc"));

        let mut config = AppConfig::default();
        config.apply_env(env(&[("MARKETEER_API_KEY", "mk"), ("HF_TOKEN", "hf_abc")]));
        assert_eq!(config.backend.api_key.as_deref(), Some("mk"));
    }

    #[test]
    fn file_key_wins_over_env() {
        let mut config = AppConfig::default();
        config.backend.api_key = Some("from-file".into());
        config.apply_env(env(&[("HF_TOKEN", "hf_abc")]));
        assert_eq!(config.backend.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn env_overrides_model_and_provider() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[("MODEL_ID", "mistralai/Mistral-7B"), ("MARKETEER_PROVIDER", "openai")]));
        assert_eq!(config.backend.model, "mistralai/Mistral-7B");
        assert_eq!(config.backend.provider, "openai");
        assert!(!config.has_api_key());
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut config = AppConfig::default();
        config.backend.api_key = Some("hf_secret".into());
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("hf_secret"));
        assert!(dbg.contains("[REDACTED]"));
    }

    #[test]
    fn builtin_rules_when_no_file() {
        let table = AppConfig::default().platform_rules().unwrap();
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn rules_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[platforms]]\nid = \"threads\"\nmax_characters = 500").unwrap();

        let mut config = AppConfig::default();
        config.platforms.rules_file = Some(file.path().to_path_buf());
        let table = config.platform_rules().unwrap();
        assert_eq!(table.get("threads").unwrap().max_characters(), 500);
        assert!(table.get("twitter").is_err());
    }

    #[test]
    fn bad_rules_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[platforms]]\nid = \"threads\"\nmax_characters = 0").unwrap();

        let mut config = AppConfig::default();
        config.platforms.rules_file = Some(file.path().to_path_buf());
        let err = config.platform_rules().unwrap_err();
        assert!(matches!(err, ConfigError::RulesError { .. }));

        let core_err: marketeer_core::Error = err.into();
        assert!(matches!(core_err, marketeer_core::Error::Configuration { .. }));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("huggingface"));
        assert!(toml_str.contains("timeout_secs"));
    }
}
