use crate::core::LLMError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

include!(concat!(env!("OUT_DIR"), "/default_config.rs"));

/// Environment variable holding the provider API key.
pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    /// Model identifier sent with every request
    pub model: String,
    /// Base URL of the Messages API, without the `/messages` suffix
    pub base_url: String,
    /// Value of the `anthropic-version` header
    pub api_version: String,
    /// Fallback system prompt for the CLI
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("Invalid default config")
    }
}

impl Config {
    /// Loads `config.toml` from the working directory, falling back to the
    /// embedded defaults when the file is absent.
    pub fn load() -> Result<Self, LLMError> {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(config_path: &Path) -> Result<Self, LLMError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .map_err(|e| LLMError::ConfigError(format!("Failed to read config file: {e}")))?;

            toml::from_str(&contents)
                .map_err(|e| LLMError::ConfigError(format!("Failed to parse config file: {e}")))
        } else {
            Ok(Self::default())
        }
    }

    /// Points the client at a different API host, e.g. a proxy or a mock.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Full URL of the messages endpoint.
    pub fn messages_url(&self) -> String {
        format!("{}/messages", self.base_url.trim_end_matches('/'))
    }
}

/// Credentials for a single service instance.
///
/// Read once at construction time and never mutated afterwards.
#[derive(Clone)]
pub struct ServiceOptions {
    pub api_key: String,
}

impl ServiceOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Reads the API key from a `.env` file or the process environment.
    pub fn from_env() -> Result<Self, LLMError> {
        let _ = dotenv::dotenv();
        let api_key = dotenv::var(API_KEY_VAR)
            .or_else(|_| std::env::var(API_KEY_VAR))
            .map_err(|_| {
                LLMError::ConfigError(format!("{API_KEY_VAR} not set in .env or environment"))
            })?;

        if api_key.trim().is_empty() {
            return Err(LLMError::ConfigError(format!("{API_KEY_VAR} is empty")));
        }

        Ok(Self::new(api_key))
    }
}

impl std::fmt::Debug for ServiceOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceOptions")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
