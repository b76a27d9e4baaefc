use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::analysis::Timeframe;
use crate::constants::{app, capture, llm};
use crate::error::ConfigError;

/// Env var that overrides the config file location
pub const CONFIG_PATH_ENV: &str = "QUANTVISION_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Gemini,
    OpenAi,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini",
            LlmProvider::OpenAi => "openai",
        }
    }

    /// Env vars consulted, in order, when no key is set in the config file
    fn api_key_env_vars(&self) -> &'static [&'static str] {
        match self {
            LlmProvider::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            LlmProvider::OpenAi => &["OPENAI_API_KEY"],
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            api_key: None,
            base_url: None,
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// Keeps the key out of the startup log line.
impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl LlmConfig {
    /// Explicit config value first, then the provider's env vars
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Some(key.trim().to_string());
        }
        self.provider
            .api_key_env_vars()
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub default_timeframe: Timeframe,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_timeframe: Timeframe::default(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            server: ServerConfig::default(),
            llm: LlmConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `$QUANTVISION_CONFIG` or `config.yaml`; a missing file means defaults
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let path = Path::new(&path);
        if !path.exists() {
            info!("ℹ️ {} not found - using default configuration", path.display());
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        // Strip BOM if present
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let config: AppConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.app_name.trim().is_empty() {
            return Err(ConfigError::Invalid("app_name must not be empty".to_string()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.model must not be empty".to_string()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Invalid("llm.timeout_secs must be positive".to_string()));
        }
        if self.session.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "session.max_upload_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_app_name() -> String {
    app::DEFAULT_APP_NAME.to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_model() -> String {
    llm::DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    llm::DEFAULT_TIMEOUT_SECS
}

fn default_max_upload_bytes() -> usize {
    capture::DEFAULT_MAX_UPLOAD_BYTES
}
